//! Provider resolution, the provider finalizer state machine, frozen
//! provider contexts, and the per-instance binding registry.

pub mod binding;
pub mod error;
pub mod finalizer;
pub mod provider;
pub mod resolve;

pub use binding::BindingRegistry;
pub use error::{Error, Result};
pub use finalizer::{FrozenProviderSet, ProviderFinalizer};
pub use provider::{FrozenProviderContext, ProviderConfig, DEFAULT_ALIAS};
pub use resolve::{resolve, ProviderPassthrough, ProviderRequirement};
