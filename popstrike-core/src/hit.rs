//! Hit resolution: which note, if any, a strike pops.
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::{
    geometry::Disc,
    lane::LaneId,
    note::{Note, NoteId},
};

/// Pops at most one note of `lane` that overlapped `region` at any point of its last step.
///
/// Notes that came closer to the region center are tried first, and among equally close notes
/// the earlier spawned one wins. Returns the identifier of the popped note, or `None` if no note
/// of this lane overlapping the region could be popped.
pub fn resolve(region: Disc, lane: LaneId, notes: &mut [Note]) -> Option<NoteId> {
    resolve_within(region, lane, notes, 1.)
}

/// Like [`resolve()`], but only considers the first `fraction` of the notes' last step.
///
/// Used when the region only existed for part of the step.
pub fn resolve_within(
    region: Disc,
    lane: LaneId,
    notes: &mut [Note],
    fraction: f32,
) -> Option<NoteId> {
    let mut candidates: Vec<(f32, usize)> = notes
        .iter()
        .enumerate()
        .filter(|(_, note)| note.lane() == lane && !note.is_popped())
        .filter_map(|(index, note)| {
            let closest = note.closest_approach(region.center, fraction);
            region
                .overlaps(&Disc::new(closest, note.radius()))
                .then(|| (region.center.distance_squared(closest), index))
        })
        .collect();

    candidates.sort_unstable_by(|(a_distance, a_index), (b_distance, b_index)| {
        a_distance
            .partial_cmp(b_distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| notes[*a_index].id().cmp(&notes[*b_index].id()))
    });

    for (_, index) in candidates {
        let note = &mut notes[index];
        if note.try_pop() {
            return Some(note.id());
        }
    }

    None
}
