//! Error kinds shared across the estimation core.
//!
//! Every crate in the workspace re-exports [`Error`] and wraps its own
//! narrower failures into it via `#[from]`, the way
//! `blueprint-store-local-database::Error` wraps `std::io::Error`.

use std::fmt;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// One of the phases declared in the orchestrator's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Phase {
    Uninitialized,
    Parsed,
    GraphBuilt,
    ProvidersFrozen,
    Expanded,
    Costed,
    PolicyEvaluated,
    Complete,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Uninitialized,
        Phase::Parsed,
        Phase::GraphBuilt,
        Phase::ProvidersFrozen,
        Phase::Expanded,
        Phase::Costed,
        Phase::PolicyEvaluated,
        Phase::Complete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Parsed => "parsed",
            Phase::GraphBuilt => "graph_built",
            Phase::ProvidersFrozen => "providers_frozen",
            Phase::Expanded => "expanded",
            Phase::Costed => "costed",
            Phase::PolicyEvaluated => "policy_evaluated",
            Phase::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised anywhere in the estimation core.
///
/// Data-dependent issues (unknowns, missing rates in non-strict modes)
/// never surface here — they reduce confidence and produce degraded
/// cost units instead. Only structural violations raise.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("operation requires phase {required} but run is at phase {current}")]
    PhaseOrder { required: Phase, current: Phase },

    #[error("phase {0} already completed for this run")]
    PhaseAlreadyCompleted(Phase),

    #[error("address '{0}' is not a valid canonical or Terraform-style address")]
    InvalidAddress(String),

    #[error("no provider configuration resolves '{provider_type}' (alias '{alias}')")]
    ProviderNotFound { provider_type: String, alias: String },

    #[error("provider finalizer is already finalized, cannot register '{0}'")]
    FinalizerClosed(String),

    #[error("instance '{0}' has no bound provider context")]
    UnboundInstance(String),

    #[error("no pricing snapshot available for request {0}")]
    NoSnapshot(String),

    #[error("snapshot '{id}' failed content-hash verification: expected {expected}, got {actual}")]
    SnapshotInvalid {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("snapshot '{id}' expired at {effective_at} (max age {max_age_secs}s)")]
    SnapshotExpired {
        id: String,
        effective_at: String,
        max_age_secs: u64,
    },

    #[error("snapshot '{0}' already exists and cannot be overwritten")]
    ImmutabilityViolation(String),

    #[error("no rate entry matches key '{0}'")]
    RateNotFound(String),

    #[error("blocked estimation in strict mode: {0}")]
    BlockedEstimation(String),

    #[error("dependency cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    #[error("requested concrete value of an unknown (reason: {0})")]
    UnknownValue(String),

    #[error("canonical address registry already contains '{0}'")]
    DuplicateAddress(String),

    #[error("operation was cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
