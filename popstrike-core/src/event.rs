//! Events reported by the simulation.
use crate::{geometry::Vec2, lane::LaneId, note::NoteId};

/// Something that happened during a [`Simulation`](crate::simulation::Simulation) step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A note has spawned.
    NoteSpawned {
        /// Lane of the note.
        lane: LaneId,
        /// The new note.
        id: NoteId,
    },
    /// A note has been popped by a strike.
    NotePopped {
        /// The popped note.
        id: NoteId,
        /// Lane of the note.
        lane: LaneId,
        /// Where the note was when it got popped.
        position: Vec2,
    },
    /// A note has fallen past the despawn line without being popped.
    NoteMissed {
        /// The missed note.
        id: NoteId,
        /// Lane of the note.
        lane: LaneId,
    },
    /// A strike pulse has ended without popping a note.
    PulseMissed {
        /// Lane of the strike.
        lane: LaneId,
    },
    /// The combo has changed.
    ComboChanged {
        /// The new combo.
        value: u32,
    },
    /// A different speed tier has been selected.
    SpeedChanged {
        /// The selected tier.
        tier: u8,
        /// The resulting speed multiplier.
        multiplier: f32,
    },
}

impl Event {
    /// Returns `true` for the events that break the combo.
    #[inline]
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NoteMissed { .. } | Self::PulseMissed { .. })
    }
}
