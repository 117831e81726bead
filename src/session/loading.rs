//! Minimum display time for the loading indicator.

use std::time::Duration;

/// Keeps the loading indicator up for at least `min_display`.
///
/// The hold is measured from when the search began, so a slow network eats
/// into it and a response slower than `min_display` is committed at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingPolicy {
    min_display: Duration,
}

impl LoadingPolicy {
    /// Policy with the given minimum display time
    pub fn new(min_display: Duration) -> Self {
        Self { min_display }
    }

    /// Policy that commits as soon as the response arrives
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Minimum display time
    pub fn min_display(&self) -> Duration {
        self.min_display
    }

    /// How much longer to hold after `elapsed` has already passed
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.min_display.saturating_sub(elapsed)
    }
}
