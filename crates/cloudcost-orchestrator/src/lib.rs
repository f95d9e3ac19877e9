//! The phased orchestrator: the workspace's single public entry
//! point. Drives one estimation run through parsing, dependency graph
//! construction, provider freezing, instance expansion, costing, and
//! policy evaluation, in that order, exactly once per phase.

pub mod cancel;
pub mod config;
pub mod definition;
pub mod error;
pub mod run;

pub use cancel::CancellationToken;
pub use config::EstimatorConfig;
pub use definition::ResourceDefinition;
pub use error::{Error, Result};
pub use run::{EstimationResult, EstimationRun};

pub use cloudcost_core::{EvalContext, EvaluationMode, Phase, Unknown, UnknownSet};
pub use cloudcost_costing::{CloudCostMapper, CostAggregate, MapperRegistry};
pub use cloudcost_expand::Cardinality;
pub use cloudcost_pricing::{PricingSnapshot, SnapshotRequest, SnapshotResolver, SnapshotStore};
pub use cloudcost_providers::{ProviderConfig, ProviderRequirement};
pub use cloudcost_policy::{EngineMode, PolicyEngine};
