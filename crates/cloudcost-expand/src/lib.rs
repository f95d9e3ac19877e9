//! Instance expansion (`count`/`for_each`/dynamic blocks) and the
//! canonical address registry that rejects duplicate instances.

pub mod error;
pub mod expand;
pub mod registry;

pub use error::{Error, Result};
pub use expand::{expand, expand_dynamic_block, Cardinality, DynamicBlock, ExpandedDynamicContent, ExpandedInstance};
pub use registry::AddressRegistry;
