//! Note spawn timing.
use rand::Rng;

use crate::{lane::LaneId, speed::SpeedController};

/// Decides when and in which lane to spawn the next note.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnScheduler {
    timer: f32,
    base_interval: f32,
}

impl SpawnScheduler {
    /// Creates a new `SpawnScheduler` with the given interval at the speed multiplier of `1`.
    pub fn new(base_interval: f32) -> Self {
        Self {
            timer: 0.,
            base_interval,
        }
    }

    /// Returns the current interval between spawns.
    #[inline]
    pub fn interval(&self, speed: &SpeedController) -> f32 {
        self.base_interval * speed.spawn_interval_multiplier()
    }

    /// Returns the time accumulated toward the next spawn.
    #[inline]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advances the timer by `dt` seconds.
    ///
    /// Returns the lane to spawn a note in, if it's time to spawn one. At most one note is
    /// spawned per call: if `dt` spans several intervals, only one of them is consumed and the
    /// rest carries over to the following calls.
    pub fn advance<R: Rng>(
        &mut self,
        dt: f32,
        speed: &SpeedController,
        rng: &mut R,
    ) -> Option<LaneId> {
        self.timer += dt;

        let interval = self.interval(speed);
        if self.timer < interval {
            return None;
        }

        self.timer -= interval;
        LaneId::from_index(rng.random_range(0..LaneId::ALL.len()))
    }
}
