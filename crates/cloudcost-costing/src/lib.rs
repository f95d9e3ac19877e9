//! Cost units, cost nodes, aggregates, lineage, and the cloud-mapper
//! registration contract that prices a bound instance against a
//! pricing snapshot.

pub mod aggregate;
pub mod aggregation;
pub mod confidence;
pub mod error;
pub mod lineage;
pub mod mapper;
pub mod node;
pub mod unit;

pub use aggregate::{CostAggregate, SummaryRow};
pub use aggregation::{cost_instances, CostingInput};
pub use confidence::Confidence;
pub use error::{Error, Result};
pub use lineage::{Derivation, FormulaDerivation, RateDerivation, UsageDerivation, UsageSource};
pub use mapper::{CloudCostMapper, MapperRegistry};
pub use node::CostNode;
pub use unit::CostUnit;
