//! The evaluation mode that governs how the pipeline reacts to
//! unknowns and missing data, threaded from [`EstimatorConfig`] down
//! through expansion, provider resolution, and costing.

use serde::{Deserialize, Serialize};

/// How aggressively the pipeline tolerates incomplete information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Any unknown that would block a structural decision (cardinality,
    /// provider resolution) is a hard error.
    Strict,
    /// Unknowns degrade confidence and are recorded, but never block;
    /// unknown cardinality falls back to a single symbolic instance.
    #[default]
    Permissive,
    /// Like permissive, but unknown cardinality is optimistically
    /// assumed to be 1 rather than symbolic, for rough what-if sizing.
    Estimate,
}

impl EvaluationMode {
    pub fn is_strict(self) -> bool {
        matches!(self, EvaluationMode::Strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_permissive() {
        assert_eq!(EvaluationMode::default(), EvaluationMode::Permissive);
    }
}
