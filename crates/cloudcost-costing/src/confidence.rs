//! A confidence score in `[0.0, 1.0]` attached to every cost unit and
//! propagated upward by taking the minimum across children, the same
//! "confidence never goes up the tree" rule `PredictionEngine`-style
//! reference material applies to a heuristic estimate's confidence.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    pub const CERTAIN: Confidence = Confidence(1.0);
    pub const NONE: Confidence = Confidence(0.0);

    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn min(self, other: Confidence) -> Confidence {
        Confidence(self.0.min(other.0))
    }

    /// Confidence degrades multiplicatively when combining independent
    /// estimates (e.g. a usage estimate times a rate lookup), rather
    /// than just taking the minimum, since compounding two imperfect
    /// estimates is strictly worse than either alone.
    pub fn combine(self, other: Confidence) -> Confidence {
        Confidence(self.0 * other.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::CERTAIN
    }
}
