//! Change Detector
//!
//! Gates scheduled notifications on the diff actually moving.

use rust_decimal::Decimal;

/// Remembers the last diff and whether the latest one differed from it
#[derive(Clone, Debug, Default)]
pub struct ChangeDetector {
    previous_diff: Option<Decimal>,
    changed: bool,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new diff and report whether it moved.
    ///
    /// The first observation only sets the baseline.
    pub fn observe(&mut self, diff: Decimal) -> bool {
        self.changed = self.previous_diff.is_some_and(|previous| previous != diff);
        if self.changed || self.previous_diff.is_none() {
            self.previous_diff = Some(diff);
        }
        self.changed
    }

    pub const fn changed(&self) -> bool {
        self.changed
    }

    pub const fn previous_diff(&self) -> Option<Decimal> {
        self.previous_diff
    }
}
