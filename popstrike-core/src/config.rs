//! Tunable parameters of the simulation.
use core::fmt;

/// Parameters of the simulation.
///
/// Distances are in world units, durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Time between note spawns at the speed multiplier of `1`.
    pub spawn_interval: f32,
    /// Note fall speed at the speed multiplier of `1`.
    pub fall_speed: f32,
    /// Vertical position at which notes spawn.
    pub spawn_y: f32,
    /// Notes below this vertical position are despawned.
    pub despawn_y: f32,

    /// Horizontal distance from the playfield center to a lane's strike base.
    pub lane_offset_x: f32,
    /// Vertical position of the strikes.
    pub arrow_y: f32,
    /// Horizontal distance from a lane's strike base to its notes.
    pub note_offset: f32,
    /// Radius of a note.
    pub note_radius: f32,

    /// Radius of a strike's hit window.
    pub hit_radius: f32,
    /// How far a strike extends outwards from its base.
    pub extend_distance: f32,
    /// Duration of the extending half of a pulse.
    pub extend_duration: f32,
    /// Duration of the retracting half of a pulse.
    pub retract_duration: f32,

    /// Speed multiplier at the lowest speed tier.
    pub min_speed_multiplier: f32,
    /// Speed multiplier at the highest speed tier.
    pub max_speed_multiplier: f32,

    /// Duration of the miss flash.
    pub flash_duration: f32,
    /// Opacity of the miss flash right after a miss.
    pub flash_peak: f32,

    /// Strike keys of the left and the right lane.
    pub lane_keys: [char; 2],
}

/// An error returned from [`Config::validate()`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A field that must be positive is zero, negative or NaN.
    NonPositive {
        /// Name of the field.
        field: &'static str,
    },
    /// The speed multiplier range is empty or includes non-positive multipliers.
    InvalidSpeedRange {
        /// Speed multiplier at the lowest tier.
        min: f32,
        /// Speed multiplier at the highest tier.
        max: f32,
    },
    /// The despawn line is not below the spawn line.
    InvalidDespawnLine,
    /// Both lanes are bound to the same key.
    DuplicateLaneKeys,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn_interval: 0.35,
            fall_speed: 7.5,
            spawn_y: 5.5,
            despawn_y: -6.,
            lane_offset_x: 1.,
            arrow_y: -3.8,
            note_offset: 1.9,
            note_radius: 0.75,
            hit_radius: 0.75,
            extend_distance: 1.2,
            extend_duration: 0.03,
            retract_duration: 0.04,
            min_speed_multiplier: 1.,
            max_speed_multiplier: 3.,
            flash_duration: 0.15,
            flash_peak: 0.55,
            lane_keys: ['f', 'j'],
        }
    }
}

impl Config {
    /// Checks that the parameters describe a playable simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("spawn_interval", self.spawn_interval),
            ("fall_speed", self.fall_speed),
            ("note_radius", self.note_radius),
            ("hit_radius", self.hit_radius),
            ("extend_duration", self.extend_duration),
            ("retract_duration", self.retract_duration),
            ("flash_duration", self.flash_duration),
        ];
        for (field, value) in positive {
            // Written this way so NaN is rejected too.
            if !(value > 0.) {
                return Err(ConfigError::NonPositive { field });
            }
        }

        let (min, max) = (self.min_speed_multiplier, self.max_speed_multiplier);
        if !(min > 0. && min <= max) {
            return Err(ConfigError::InvalidSpeedRange { min, max });
        }

        if !(self.despawn_y < self.spawn_y) {
            return Err(ConfigError::InvalidDespawnLine);
        }

        if self.lane_keys[0] == self.lane_keys[1] {
            return Err(ConfigError::DuplicateLaneKeys);
        }

        Ok(())
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field } => write!(f, "{field} must be positive"),
            Self::InvalidSpeedRange { min, max } => write!(
                f,
                "invalid speed multiplier range {min}..={max}: \
                 multipliers must be positive and min must not exceed max"
            ),
            Self::InvalidDespawnLine => f.write_str("despawn_y must be below spawn_y"),
            Self::DuplicateLaneKeys => f.write_str("both lanes are bound to the same key"),
        }
    }
}

impl core::error::Error for ConfigError {}
