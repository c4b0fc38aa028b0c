//! Speed tiers and the multiplier they select.
use crate::geometry::lerp;

/// Lowest speed tier.
pub const MIN_TIER: u8 = 1;
/// Highest speed tier.
pub const MAX_TIER: u8 = 9;

/// Maps the selected speed tier to a multiplier.
///
/// Fall speed is scaled by the multiplier directly, while the spawn interval is scaled by its
/// reciprocal, so the distance between consecutive notes stays the same at every tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedController {
    min_multiplier: f32,
    max_multiplier: f32,
    tier: u8,
    multiplier: f32,
}

impl SpeedController {
    /// Creates a new `SpeedController` at the lowest tier.
    pub fn new(min_multiplier: f32, max_multiplier: f32) -> Self {
        Self {
            min_multiplier,
            max_multiplier,
            tier: MIN_TIER,
            multiplier: min_multiplier,
        }
    }

    /// Selects a speed tier.
    ///
    /// Tiers outside of `MIN_TIER..=MAX_TIER` are clamped into that range.
    pub fn set_tier(&mut self, tier: u8) {
        let tier = tier.clamp(MIN_TIER, MAX_TIER);
        let t = f32::from(tier - MIN_TIER) / f32::from(MAX_TIER - MIN_TIER);

        self.tier = tier;
        self.multiplier = lerp(self.min_multiplier, self.max_multiplier, t);
    }

    /// Returns the selected speed tier.
    #[inline]
    pub fn tier(&self) -> u8 {
        self.tier
    }

    /// Returns the multiplier applied to the note fall speed.
    #[inline]
    pub fn fall_speed_multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Returns the multiplier applied to the spawn interval.
    #[inline]
    pub fn spawn_interval_multiplier(&self) -> f32 {
        1. / self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn multiplier_at(tier: u8) -> f32 {
        let mut speed = SpeedController::new(1., 3.);
        speed.set_tier(tier);
        speed.fall_speed_multiplier()
    }

    #[test]
    fn starts_at_lowest_tier() {
        let speed = SpeedController::new(1., 3.);
        assert_eq!(speed.tier(), 1);
        assert_eq!(speed.fall_speed_multiplier(), 1.);
    }

    #[test]
    fn tier_endpoints() {
        assert_eq!(multiplier_at(1), 1.);
        assert_eq!(multiplier_at(5), 2.);
        assert_eq!(multiplier_at(9), 3.);
    }

    #[test]
    fn tier_nine_triples_speed() {
        let mut speed = SpeedController::new(1., 3.);
        speed.set_tier(9);
        assert_eq!(speed.fall_speed_multiplier(), 3.);
        assert!((0.35 * speed.spawn_interval_multiplier() - 0.35 / 3.).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_tiers_are_clamped() {
        let mut speed = SpeedController::new(1., 3.);
        speed.set_tier(0);
        assert_eq!(speed.tier(), 1);
        assert_eq!(speed.fall_speed_multiplier(), 1.);

        speed.set_tier(200);
        assert_eq!(speed.tier(), 9);
        assert_eq!(speed.fall_speed_multiplier(), 3.);
    }

    proptest! {
        #[test]
        fn multiplier_is_monotonic(a in MIN_TIER..=MAX_TIER, b in MIN_TIER..=MAX_TIER) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(multiplier_at(lo) <= multiplier_at(hi));
        }

        #[test]
        fn spawn_interval_is_reciprocal(tier in MIN_TIER..=MAX_TIER) {
            let mut speed = SpeedController::new(1., 3.);
            speed.set_tier(tier);
            let product = speed.fall_speed_multiplier() * speed.spawn_interval_multiplier();
            prop_assert!((product - 1.).abs() < 1e-6);
        }
    }
}
