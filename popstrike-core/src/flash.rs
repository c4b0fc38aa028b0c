//! The flash shown after a miss.
use crate::geometry::lerp;

/// Fading flash triggered by misses.
///
/// A new miss restarts the fade from the peak opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissFlash {
    /// Time since the last trigger, `None` once the fade has finished.
    elapsed: Option<f32>,
    duration: f32,
    peak: f32,
}

impl MissFlash {
    /// Creates a new, inactive, `MissFlash`.
    pub fn new(duration: f32, peak: f32) -> Self {
        Self {
            elapsed: None,
            duration,
            peak,
        }
    }

    /// Restarts the flash.
    pub fn trigger(&mut self) {
        self.elapsed = Some(0.);
    }

    /// Advances the fade by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if let Some(elapsed) = &mut self.elapsed {
            *elapsed += dt;
            if *elapsed >= self.duration {
                self.elapsed = None;
            }
        }
    }

    /// Returns `true` while the flash is visible.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Returns the current flash opacity.
    pub fn alpha(&self) -> f32 {
        match self.elapsed {
            Some(elapsed) => lerp(self.peak, 0., (elapsed / self.duration).clamp(0., 1.)),
            None => 0.,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_out() {
        let mut flash = MissFlash::new(0.5, 0.5);
        assert!(!flash.is_active());
        assert_eq!(flash.alpha(), 0.);

        flash.trigger();
        assert_eq!(flash.alpha(), 0.5);

        flash.advance(0.25);
        assert_eq!(flash.alpha(), 0.25);

        flash.advance(0.25);
        assert!(!flash.is_active());
        assert_eq!(flash.alpha(), 0.);
    }

    #[test]
    fn retrigger_restarts() {
        let mut flash = MissFlash::new(0.5, 0.5);
        flash.trigger();
        flash.advance(0.25);
        flash.trigger();
        assert_eq!(flash.alpha(), 0.5);
    }
}
