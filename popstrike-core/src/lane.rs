//! The two lanes of the playfield.
use crate::{
    config::Config,
    geometry::{Disc, Vec2},
};

/// Identifies one of the two lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum LaneId {
    /// The left lane, index `0`.
    Left,
    /// The right lane, index `1`.
    Right,
}

/// Immutable description of a lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    /// Which lane this is.
    pub id: LaneId,
    /// Key that triggers this lane's strike.
    pub key: char,
    /// Horizontal direction in which the strike extends, `-1` or `1`.
    pub direction: f32,
    /// Position of the strike when fully retracted.
    pub base_position: Vec2,
    /// How far the strike extends from the base position.
    pub extend_distance: f32,
    /// Radius of the hit window.
    pub hit_radius: f32,
    /// Horizontal position of the notes falling in this lane.
    pub note_x: f32,
}

impl LaneId {
    /// Both lanes, ordered by index.
    pub const ALL: [LaneId; 2] = [LaneId::Left, LaneId::Right];

    /// Returns the lane index.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            LaneId::Left => 0,
            LaneId::Right => 1,
        }
    }

    /// Returns the lane with the given index, if there is one.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the horizontal direction of this lane relative to the playfield center.
    #[inline]
    pub fn direction(self) -> f32 {
        match self {
            LaneId::Left => -1.,
            LaneId::Right => 1.,
        }
    }
}

impl Lane {
    /// Lays out a lane according to the config.
    pub fn new(id: LaneId, config: &Config) -> Self {
        let direction = id.direction();

        Self {
            id,
            key: config.lane_keys[id.index()],
            direction,
            base_position: Vec2::new(config.lane_offset_x * direction, config.arrow_y),
            extend_distance: config.extend_distance,
            hit_radius: config.hit_radius,
            note_x: (config.lane_offset_x + config.note_offset) * direction,
        }
    }

    /// Returns the position of the strike tip when fully extended.
    #[inline]
    pub fn tip_position(&self) -> Vec2 {
        self.base_position + Vec2::new(self.direction, 0.) * self.extend_distance
    }

    /// Returns the position of the strike tip at the given extension fraction.
    #[inline]
    pub fn strike_position(&self, extension: f32) -> Vec2 {
        self.base_position + Vec2::new(self.direction, 0.) * (self.extend_distance * extension)
    }

    /// Returns the hit window of this lane's strike.
    ///
    /// The hit window does not move with the animation: it is always centered on the fully
    /// extended tip.
    #[inline]
    pub fn hit_window(&self) -> Disc {
        Disc::new(self.tip_position(), self.hit_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn index_round_trip() {
        for lane in LaneId::ALL {
            assert_eq!(LaneId::from_index(lane.index()), Some(lane));
        }
        assert_eq!(LaneId::from_index(2), None);
    }

    #[test]
    fn default_layout() {
        let config = Config::default();
        let left = Lane::new(LaneId::Left, &config);
        let right = Lane::new(LaneId::Right, &config);

        assert_eq!(left.key, 'f');
        assert_eq!(right.key, 'j');
        assert_eq!(left.base_position, Vec2::new(-1., -3.8));
        assert_eq!(right.base_position, Vec2::new(1., -3.8));
        assert_eq!(left.tip_position(), Vec2::new(-2.2, -3.8));
        assert_eq!(right.tip_position(), Vec2::new(2.2, -3.8));
        assert_eq!(left.note_x, -2.9);
        assert_eq!(right.note_x, 2.9);
    }

    #[test]
    fn strike_position_interpolates_to_tip() {
        let lane = Lane::new(LaneId::Right, &Config::default());
        assert_eq!(lane.strike_position(0.), lane.base_position);
        assert_eq!(lane.strike_position(1.), lane.tip_position());
    }

    proptest! {
        #[test]
        fn strike_stays_on_its_side(lane in any::<LaneId>(), extension in 0f32..=1.) {
            let lane = Lane::new(lane, &Config::default());
            let position = lane.strike_position(extension);

            prop_assert_eq!(position.y, lane.base_position.y);
            // Between the base and the tip, away from the center.
            let offset = (position.x - lane.base_position.x) * lane.direction;
            prop_assert!(offset >= 0.);
            prop_assert!(offset <= lane.extend_distance + 1e-6);
            prop_assert!(lane.note_x * lane.direction > lane.tip_position().x * lane.direction);
        }
    }
}
