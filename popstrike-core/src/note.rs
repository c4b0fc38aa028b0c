//! Falling notes.
use crate::{
    geometry::{Disc, Vec2, closest_on_segment},
    lane::LaneId,
    speed::SpeedController,
};

/// Unique identifier of a note within one simulation.
///
/// Identifiers are assigned in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(pub u64);

/// A note falling toward the hit line.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    id: NoteId,
    lane: LaneId,
    position: Vec2,
    /// Position before the last [`advance()`](Self::advance).
    previous_position: Vec2,
    radius: f32,
    popped: bool,
}

impl Note {
    /// Creates a new, not yet popped, note.
    pub fn new(id: NoteId, lane: LaneId, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            lane,
            position,
            previous_position: position,
            radius,
            popped: false,
        }
    }

    /// Returns the note identifier.
    #[inline]
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the lane the note is falling in.
    #[inline]
    pub fn lane(&self) -> LaneId {
        self.lane
    }

    /// Returns the note center.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Returns the note center before the last [`advance()`](Self::advance).
    #[inline]
    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    /// Returns the note radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns the shape of the note.
    #[inline]
    pub fn disc(&self) -> Disc {
        Disc::new(self.position, self.radius)
    }

    /// Returns the position along the last step closest to `point`.
    ///
    /// Only the first `fraction` of the step, from `0` to `1`, is considered.
    pub fn closest_approach(&self, point: Vec2, fraction: f32) -> Vec2 {
        let fraction = fraction.clamp(0., 1.);
        let end = self.previous_position + (self.position - self.previous_position) * fraction;
        closest_on_segment(self.previous_position, end, point)
    }

    /// Returns `true` if the note has been popped.
    #[inline]
    pub fn is_popped(&self) -> bool {
        self.popped
    }

    /// Moves the note down by `dt` seconds worth of fall.
    pub fn advance(&mut self, dt: f32, base_fall_speed: f32, speed: &SpeedController) {
        self.previous_position = self.position;
        self.position.y -= base_fall_speed * speed.fall_speed_multiplier() * dt;
    }

    /// Returns `true` if the note has fallen past the despawn line.
    #[inline]
    pub fn is_despawned(&self, despawn_y: f32) -> bool {
        self.position.y < despawn_y
    }

    /// Pops the note.
    ///
    /// Returns `true` the first time it's called and `false` on every subsequent call, so a note
    /// is never counted as hit twice.
    pub fn try_pop(&mut self) -> bool {
        if self.popped {
            return false;
        }

        self.popped = true;
        true
    }
}
