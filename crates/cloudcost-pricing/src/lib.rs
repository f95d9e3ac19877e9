//! The immutable, content-hashed pricing snapshot store, rate-key
//! construction, and the enforced snapshot resolver.

pub mod error;
pub mod rate;
pub mod resolver;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
pub use rate::{RateEntry, RateKeyBuilder, DEFAULT_ALIAS};
pub use resolver::{SnapshotRequest, SnapshotResolver};
pub use snapshot::PricingSnapshot;
pub use store::SnapshotStore;
