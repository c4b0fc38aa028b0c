//! Combo counting.

/// Counts consecutive pops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComboTracker {
    combo: u32,
}

impl ComboTracker {
    /// Creates a new `ComboTracker` with zero combo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current combo.
    #[inline]
    pub fn value(&self) -> u32 {
        self.combo
    }

    /// Registers a pop. Returns the new combo.
    pub fn on_pop(&mut self) -> u32 {
        self.combo = self.combo.saturating_add(1);
        self.combo
    }

    /// Registers a miss. Returns the new combo, which is always zero.
    pub fn on_miss(&mut self) -> u32 {
        self.combo = 0;
        self.combo
    }
}
