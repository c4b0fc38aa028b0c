//! `popstrike-core` is the timing and hit-detection simulation of a two-lane rhythm game.
//!
//! Notes fall toward the hit line; each lane has a strike that, once triggered, extends and
//! retracts over a short pulse. A note overlapping the extended strike during the pulse is
//! popped. Everything is driven by [`Simulation::tick()`](simulation::Simulation::tick) with the
//! elapsed frame time, and results are reported as [`Event`](event::Event)s.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod combo;
pub mod config;
pub mod event;
pub mod flash;
pub mod geometry;
pub mod hit;
pub mod lane;
pub mod note;
pub mod simulation;
pub mod spawn;
pub mod speed;
pub mod strike;
