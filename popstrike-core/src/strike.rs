//! The per-lane strike state machine.
//!
//! A key press starts a pulse: the strike extends outwards over the extend duration, then
//! retracts over the retract duration. The hit window is active for the whole pulse, and the
//! first note found overlapping it is popped. A pulse that ends without popping anything is a
//! miss.
use crate::{
    geometry::{Disc, smoothstep},
    hit,
    lane::Lane,
    note::{Note, NoteId},
};

/// Phase timers within this much of their duration count as elapsed.
///
/// Summing `f32` frame times drifts, which would otherwise end phases a frame late.
const TIME_EPSILON: f32 = 1e-5;

/// Phase of a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not striking, waiting for a key press.
    Idle,
    /// Moving outwards.
    Extending,
    /// Moving back.
    Retracting,
}

/// State of one lane's strike.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneStrike {
    phase: Phase,
    /// Time spent in the current phase.
    elapsed: f32,
    extend_duration: f32,
    retract_duration: f32,
    /// Whether the current pulse has already popped a note.
    hit_registered: bool,
}

/// Outcome of [`LaneStrike::advance()`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeStep {
    /// The phase at the end of the step differs from the phase at its start.
    pub phase_changed: bool,
    /// The pulse ended during this step without popping a note.
    pub pulse_ended: bool,
    /// The note popped during this step.
    pub popped: Option<NoteId>,
    /// The hit window that was tested during this step.
    pub hit_window: Option<Disc>,
}

impl LaneStrike {
    /// Creates a new idle `LaneStrike`.
    pub fn new(extend_duration: f32, retract_duration: f32) -> Self {
        Self {
            phase: Phase::Idle,
            elapsed: 0.,
            extend_duration,
            retract_duration,
            hit_registered: false,
        }
    }

    /// Returns the current phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` if the hit window is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Returns `true` if the current pulse has popped a note.
    #[inline]
    pub fn hit_registered(&self) -> bool {
        self.hit_registered
    }

    /// Returns how far the strike is extended, from `0` (retracted) to `1` (fully extended).
    ///
    /// The value is eased, so the strike accelerates out of and decelerates into both ends.
    pub fn extension(&self) -> f32 {
        match self.phase {
            Phase::Idle => 0.,
            Phase::Extending => smoothstep(self.elapsed / self.extend_duration),
            Phase::Retracting => 1. - smoothstep(self.elapsed / self.retract_duration),
        }
    }

    /// Handles a press of the lane key.
    ///
    /// Starts a new pulse if the strike is idle. Presses during a pulse are ignored.
    ///
    /// Returns `true` if a pulse was started.
    pub fn on_key_pressed(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }

        self.phase = Phase::Extending;
        self.elapsed = 0.;
        self.hit_registered = false;
        true
    }

    /// Advances the strike by `dt` seconds.
    ///
    /// While the hit window is active and the pulse hasn't popped anything yet, tries to pop a
    /// note of `lane` from `notes`. Notes are tested along the path they moved during the part of
    /// the step in which the window was active, so fast notes can't skip over it. A large `dt`
    /// can carry the strike through both phases in one call; the hit window is still tested
    /// once in that case.
    pub fn advance(&mut self, dt: f32, lane: &Lane, notes: &mut [Note]) -> StrikeStep {
        let mut step = StrikeStep {
            phase_changed: false,
            pulse_ended: false,
            popped: None,
            hit_window: None,
        };

        if self.phase == Phase::Idle {
            return step;
        }

        let start_phase = self.phase;

        // Part of the step during which the window was active.
        let remaining = match self.phase {
            Phase::Idle => 0.,
            Phase::Extending => self.extend_duration - self.elapsed + self.retract_duration,
            Phase::Retracting => self.retract_duration - self.elapsed,
        };
        let active_fraction = if dt > remaining {
            remaining / dt
        } else {
            1.
        };

        self.elapsed += dt;

        if self.phase == Phase::Extending && self.elapsed >= self.extend_duration - TIME_EPSILON {
            self.elapsed = (self.elapsed - self.extend_duration).max(0.);
            self.phase = Phase::Retracting;
        }

        let mut finished = false;
        if self.phase == Phase::Retracting && self.elapsed >= self.retract_duration - TIME_EPSILON {
            finished = true;
        }

        // The window was active for this step, whatever the phase is at its end.
        let window = lane.hit_window();
        step.hit_window = Some(window);
        if !self.hit_registered {
            step.popped = hit::resolve_within(window, lane.id, notes, active_fraction);
            self.hit_registered = step.popped.is_some();
        }

        if finished {
            self.phase = Phase::Idle;
            self.elapsed = 0.;
            step.pulse_ended = !self.hit_registered;
        }

        step.phase_changed = self.phase != start_phase;
        step
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::{
        config::Config,
        geometry::Vec2,
        lane::LaneId,
        note::NoteId,
        speed::SpeedController,
    };
    use proptest::prelude::*;

    fn strike() -> LaneStrike {
        LaneStrike::new(0.03, 0.04)
    }

    fn lane() -> Lane {
        Lane::new(LaneId::Left, &Config::default())
    }

    fn note_at_tip(id: u64) -> Note {
        let lane = lane();
        Note::new(
            NoteId(id),
            LaneId::Left,
            Vec2::new(lane.note_x, lane.tip_position().y),
            0.75,
        )
    }

    #[test]
    fn idle_strike_does_nothing() {
        let mut strike = strike();
        let mut notes = vec![note_at_tip(0)];

        let step = strike.advance(1., &lane(), &mut notes);
        assert_eq!(strike.phase(), Phase::Idle);
        assert!(!step.phase_changed);
        assert!(!step.pulse_ended);
        assert_eq!(step.popped, None);
        assert_eq!(step.hit_window, None);
        assert!(!notes[0].is_popped());
    }

    #[test]
    fn pulse_without_notes_misses() {
        let mut strike = strike();
        assert!(strike.on_key_pressed());
        assert_eq!(strike.phase(), Phase::Extending);
        assert!(strike.is_active());

        let step = strike.advance(0.03, &lane(), &mut []);
        assert_eq!(strike.phase(), Phase::Retracting);
        assert!(step.phase_changed);
        assert!(!step.pulse_ended);
        assert!(strike.is_active());

        let step = strike.advance(0.04, &lane(), &mut []);
        assert_eq!(strike.phase(), Phase::Idle);
        assert!(step.phase_changed);
        assert!(step.pulse_ended);
        assert!(!strike.is_active());
    }

    #[test]
    fn press_during_pulse_is_ignored() {
        let mut strike = strike();
        let mut notes = vec![note_at_tip(0)];
        assert!(strike.on_key_pressed());
        strike.advance(0.01, &lane(), &mut notes);
        assert!(strike.hit_registered());

        let before = strike.clone();
        assert!(!strike.on_key_pressed());
        assert_eq!(strike, before);

        strike.advance(0.025, &lane(), &mut notes);
        assert_eq!(strike.phase(), Phase::Retracting);
        assert!(!strike.on_key_pressed());
        assert!(strike.hit_registered());
    }

    #[test]
    fn pops_note_at_tip_once() {
        let mut strike = strike();
        let mut notes = vec![note_at_tip(0), note_at_tip(1)];
        strike.on_key_pressed();

        let step = strike.advance(0.01, &lane(), &mut notes);
        assert_eq!(step.popped, Some(NoteId(0)));

        let mut popped = 1;
        let mut missed = false;
        while strike.is_active() {
            let step = strike.advance(0.01, &lane(), &mut notes);
            popped += usize::from(step.popped.is_some());
            missed |= step.pulse_ended;
        }

        assert_eq!(popped, 1);
        assert!(!missed);
        assert!(!notes[1].is_popped());
    }

    #[test]
    fn whole_pulse_in_one_step_still_hits() {
        let mut strike = strike();
        let mut notes = vec![note_at_tip(0)];
        strike.on_key_pressed();

        let step = strike.advance(1., &lane(), &mut notes);
        assert_eq!(step.popped, Some(NoteId(0)));
        assert!(!step.pulse_ended);
        assert_eq!(strike.phase(), Phase::Idle);
    }

    #[test]
    fn whole_pulse_in_one_step_misses() {
        let mut strike = strike();
        strike.on_key_pressed();

        let step = strike.advance(1., &lane(), &mut []);
        assert!(step.pulse_ended);
        assert!(step.phase_changed);
        assert_eq!(strike.phase(), Phase::Idle);
    }

    #[test]
    fn pulse_ends_on_time_with_small_steps() {
        for (dt, ticks) in [(0.005, 14), (0.001, 70), (0.01, 7)] {
            let mut strike = strike();
            strike.on_key_pressed();

            let mut count = 0;
            while strike.is_active() {
                strike.advance(dt, &lane(), &mut []);
                count += 1;
            }
            assert_eq!(count, ticks, "dt = {dt}");
        }
    }

    #[test]
    fn fast_note_passing_the_tip_is_popped() {
        let lane = lane();
        let tip = lane.tip_position();
        let speed = SpeedController::new(1., 3.);
        // Starts above the window and ends below it within one step.
        let mut notes = vec![Note::new(
            NoteId(0),
            LaneId::Left,
            Vec2::new(lane.note_x, tip.y + 2.),
            0.75,
        )];
        notes[0].advance(0.01, 400., &speed);
        assert!(!lane.hit_window().overlaps(&notes[0].disc()));

        let mut strike = strike();
        strike.on_key_pressed();
        let step = strike.advance(0.01, &lane, &mut notes);
        assert_eq!(step.popped, Some(NoteId(0)));
    }

    #[test]
    fn note_arriving_after_pulse_end_is_not_popped() {
        let lane = lane();
        let tip = lane.tip_position();
        let speed = SpeedController::new(1., 3.);
        // Reaches the window late in a 0.1 s step, after the 0.07 s pulse has ended.
        let start = tip.y + 2.2;
        let mut notes = vec![Note::new(
            NoteId(0),
            LaneId::Left,
            Vec2::new(lane.note_x, start),
            0.75,
        )];
        notes[0].advance(0.1, 10., &speed);
        assert!(hit::resolve(lane.hit_window(), LaneId::Left, &mut notes.clone()).is_some());

        let mut strike = strike();
        strike.on_key_pressed();
        let step = strike.advance(0.1, &lane, &mut notes);
        assert_eq!(step.popped, None);
        assert!(step.pulse_ended);
    }

    #[test]
    fn extension_eases_out_and_back() {
        let mut strike = strike();
        assert_eq!(strike.extension(), 0.);

        strike.on_key_pressed();
        assert_eq!(strike.extension(), 0.);

        strike.advance(0.03, &lane(), &mut []);
        assert_eq!(strike.phase(), Phase::Retracting);
        assert_eq!(strike.extension(), 1.);

        strike.advance(0.02, &lane(), &mut []);
        let halfway = strike.extension();
        assert!(halfway > 0.4 && halfway < 0.6);
    }

    proptest! {
        #[test]
        fn window_active_iff_not_idle(
            steps in proptest::collection::vec((any::<bool>(), 0f32..0.05), 0..100)
        ) {
            let mut strike = strike();
            let mut pulses = 0;
            let mut misses = 0;
            for (press, dt) in steps {
                if press && strike.on_key_pressed() {
                    pulses += 1;
                }
                let step = strike.advance(dt, &lane(), &mut []);
                prop_assert_eq!(step.hit_window.is_some(), step.phase_changed || strike.is_active());
                prop_assert_eq!(strike.is_active(), strike.phase() != Phase::Idle);
                misses += usize::from(step.pulse_ended);
            }

            // Every pulse either ended with a miss or is still running.
            prop_assert_eq!(pulses, misses + usize::from(strike.is_active()));
        }
    }
}
