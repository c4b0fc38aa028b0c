use std::time::{Duration, Instant};

use circular_queue::CircularQueue;

/// Longest frame time passed on to the simulation.
///
/// Stalls (e.g. a suspended terminal) would otherwise dump all notes past the despawn line at
/// once.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

pub struct FrameClock {
    last_frame: Option<Instant>,
    frame_times: CircularQueue<Duration>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame: None,
            frame_times: CircularQueue::with_capacity(10),
        }
    }

    /// Marks the start of a new frame and returns the time since the previous one.
    pub fn frame(&mut self) -> Duration {
        self.frame_at(Instant::now())
    }

    fn frame_at(&mut self, now: Instant) -> Duration {
        let mut passed = Duration::ZERO;
        if let Some(last) = self.last_frame {
            passed = now.saturating_duration_since(last);
            self.frame_times.push(passed);
        }
        self.last_frame = Some(now);
        passed.min(MAX_FRAME_TIME)
    }

    pub fn fps(&self) -> Option<f32> {
        let mut iter = self.frame_times.iter();
        let mut fps = 1. / iter.next()?.as_secs_f32();
        for frame_time in iter {
            fps = 0.8 * fps + 0.2 / frame_time.as_secs_f32();
        }
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_zero_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame_at(Instant::now()), Duration::ZERO);
        assert_eq!(clock.fps(), None);
    }

    #[test]
    fn delta_between_frames() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.frame_at(start);
        let dt = clock.frame_at(start + Duration::from_millis(20));
        assert_eq!(dt, Duration::from_millis(20));

        let fps = clock.fps().unwrap();
        assert!((fps - 50.).abs() < 0.01);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.frame_at(start);
        let dt = clock.frame_at(start + Duration::from_secs(5));
        assert_eq!(dt, MAX_FRAME_TIME);
    }
}
