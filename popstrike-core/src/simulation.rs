//! The simulation as a whole.
use alloc::vec::{Drain, Vec};

use rand::Rng;
use tracing::{debug, trace};

use crate::{
    combo::ComboTracker,
    config::{Config, ConfigError},
    event::Event,
    flash::MissFlash,
    geometry::Vec2,
    lane::{Lane, LaneId},
    note::{Note, NoteId},
    spawn::SpawnScheduler,
    speed::SpeedController,
    strike::LaneStrike,
};

/// State of the game.
///
/// Owns everything that changes over time and advances it in a fixed order on every
/// [`tick()`](Self::tick): spawning, note movement, strikes and hit testing, then removal of
/// popped and despawned notes. Events produced along the way are queued until
/// [`drain_events()`](Self::drain_events) is called.
#[derive(Debug, Clone)]
pub struct Simulation<R> {
    config: Config,
    lanes: [Lane; 2],
    strikes: [LaneStrike; 2],
    /// Live notes, in spawn order.
    notes: Vec<Note>,
    scheduler: SpawnScheduler,
    speed: SpeedController,
    combo: ComboTracker,
    flash: MissFlash,
    rng: R,
    next_note_id: u64,
    /// Total simulated time.
    time: f32,
    events: Vec<Event>,
}

impl<R: Rng> Simulation<R> {
    /// Creates a new `Simulation`.
    ///
    /// `rng` decides the lanes of spawned notes; a seeded generator makes the whole simulation
    /// deterministic.
    pub fn new(config: Config, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            lanes: LaneId::ALL.map(|id| Lane::new(id, &config)),
            strikes: LaneId::ALL
                .map(|_| LaneStrike::new(config.extend_duration, config.retract_duration)),
            notes: Vec::new(),
            scheduler: SpawnScheduler::new(config.spawn_interval),
            speed: SpeedController::new(config.min_speed_multiplier, config.max_speed_multiplier),
            combo: ComboTracker::new(),
            flash: MissFlash::new(config.flash_duration, config.flash_peak),
            rng,
            next_note_id: 0,
            time: 0.,
            events: Vec::new(),
            config,
        })
    }

    /// Returns the config the simulation was created with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the lanes.
    #[inline]
    pub fn lanes(&self) -> &[Lane; 2] {
        &self.lanes
    }

    /// Returns the lane strikes, indexed like the lanes.
    #[inline]
    pub fn strikes(&self) -> &[LaneStrike; 2] {
        &self.strikes
    }

    /// Returns the strike of `lane`.
    #[inline]
    pub fn strike(&self, lane: LaneId) -> &LaneStrike {
        &self.strikes[lane.index()]
    }

    /// Returns the live notes, in spawn order.
    #[inline]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns the current combo.
    #[inline]
    pub fn combo(&self) -> u32 {
        self.combo.value()
    }

    /// Returns the speed controller.
    #[inline]
    pub fn speed(&self) -> &SpeedController {
        &self.speed
    }

    /// Returns the current opacity of the miss flash.
    #[inline]
    pub fn flash_alpha(&self) -> f32 {
        self.flash.alpha()
    }

    /// Returns the total simulated time.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Returns the lane bound to `key`, if any.
    pub fn lane_for_key(&self, key: char) -> Option<LaneId> {
        self.lanes.iter().find(|lane| lane.key == key).map(|lane| lane.id)
    }

    /// Handles a press of the strike key of `lane`.
    ///
    /// Returns `true` if a new pulse has started, and `false` if the press was ignored because
    /// the strike is still in the middle of a pulse.
    pub fn key_press(&mut self, lane: LaneId) -> bool {
        let started = self.strikes[lane.index()].on_key_pressed();
        if started {
            trace!(?lane, "pulse started");
        }
        started
    }

    /// Selects a speed tier from `1` to `9`.
    ///
    /// Tiers out of range are clamped.
    pub fn set_speed_tier(&mut self, tier: u8) {
        let old_tier = self.speed.tier();
        self.speed.set_tier(tier);

        if self.speed.tier() != old_tier {
            let multiplier = self.speed.fall_speed_multiplier();
            debug!(tier = self.speed.tier(), multiplier, "speed changed");
            self.events.push(Event::SpeedChanged {
                tier: self.speed.tier(),
                multiplier,
            });
        }
    }

    /// Spawns a note in `lane` at the spawn line.
    ///
    /// The scheduler calls this on its own; calling it directly adds an extra note.
    pub fn spawn_note(&mut self, lane: LaneId) -> NoteId {
        let position = Vec2::new(self.lanes[lane.index()].note_x, self.config.spawn_y);
        self.insert_note(lane, position)
    }

    /// Inserts a note of `lane` at an arbitrary position.
    pub fn insert_note(&mut self, lane: LaneId, position: Vec2) -> NoteId {
        let id = NoteId(self.next_note_id);
        self.next_note_id += 1;

        trace!(?lane, id = id.0, "note spawned");
        self.notes
            .push(Note::new(id, lane, position, self.config.note_radius));
        self.events.push(Event::NoteSpawned { lane, id });
        id
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Negative `dt` is treated as zero.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.);
        self.time += dt;

        self.flash.advance(dt);

        if let Some(lane) = self.scheduler.advance(dt, &self.speed, &mut self.rng) {
            self.spawn_note(lane);
        }

        for note in &mut self.notes {
            note.advance(dt, self.config.fall_speed, &self.speed);
        }

        for (lane, strike) in self.lanes.iter().zip(&mut self.strikes) {
            let step = strike.advance(dt, lane, &mut self.notes);

            if let Some(id) = step.popped {
                let position = self
                    .notes
                    .iter()
                    .find(|note| note.id() == id)
                    .map_or(lane.tip_position(), Note::position);
                debug!(lane = ?lane.id, id = id.0, "note popped");
                self.events.push(Event::NotePopped {
                    id,
                    lane: lane.id,
                    position,
                });

                let value = self.combo.on_pop();
                self.events.push(Event::ComboChanged { value });
            }

            if step.pulse_ended {
                debug!(lane = ?lane.id, "pulse missed");
                self.events.push(Event::PulseMissed { lane: lane.id });
                miss(&mut self.combo, &mut self.flash, &mut self.events);
            }
        }

        let despawn_y = self.config.despawn_y;
        let combo = &mut self.combo;
        let flash = &mut self.flash;
        let events = &mut self.events;
        self.notes.retain(|note| {
            if note.is_popped() {
                return false;
            }

            if note.is_despawned(despawn_y) {
                debug!(lane = ?note.lane(), id = note.id().0, "note missed");
                events.push(Event::NoteMissed {
                    id: note.id(),
                    lane: note.lane(),
                });
                miss(combo, flash, events);
                return false;
            }

            true
        });
    }

    /// Returns the events that happened since the last call.
    pub fn drain_events(&mut self) -> Drain<'_, Event> {
        self.events.drain(..)
    }
}

/// Resets the combo and flashes.
fn miss(combo: &mut ComboTracker, flash: &mut MissFlash, events: &mut Vec<Event>) {
    let old = combo.value();
    let value = combo.on_miss();
    if value != old {
        events.push(Event::ComboChanged { value });
    }
    flash.trigger();
}
