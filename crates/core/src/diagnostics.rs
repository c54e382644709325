//! Normalization diagnostics.

use serde::{Deserialize, Serialize};

/// Counts of cells that were silently coerced to a safe default during
/// normalization.
///
/// The pipeline never rejects a row for a bad cell (amount cells fall back
/// to 0.0, date cells to "no date"); these counters keep that leniency
/// visible to operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Amount cells that were missing or unparsable and defaulted to 0.0.
    pub coerced_amounts: usize,
    /// Non-empty date cells that failed to parse and were dropped.
    pub coerced_dates: usize,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.coerced_amounts == 0 && self.coerced_dates == 0
    }
}
