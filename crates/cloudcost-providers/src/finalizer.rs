//! The provider finalizer: a one-way `open -> finalized` state
//! machine. While open, provider blocks may be registered freely;
//! finalization freezes every registered config and makes further
//! registration an error, mirroring the orchestrator's own
//! monotonic phase machine (`cloudcost_core::Phase`) at a smaller
//! scale.

use crate::error::{Error, Result};
use crate::provider::{FrozenProviderContext, ProviderConfig, DEFAULT_ALIAS};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinalizerState {
    Open,
    Finalized,
}

/// Accumulates `provider` blocks for one estimation run and freezes
/// them exactly once.
pub struct ProviderFinalizer {
    state: Mutex<FinalizerState>,
    pending: Mutex<HashMap<(String, String), ProviderConfig>>,
}

impl Default for ProviderFinalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFinalizer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FinalizerState::Open),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, config: ProviderConfig) -> Result<()> {
        if *self.state.lock() == FinalizerState::Finalized {
            return Err(Error::finalizer_closed(config.provider_type.clone()));
        }
        let key = (config.provider_type.clone(), config.alias.clone());
        self.pending.lock().insert(key, config);
        Ok(())
    }

    /// Freezes every registered provider config. Idempotent after the
    /// first call: subsequent calls return the same frozen set without
    /// re-registering anything.
    pub fn finalize(&self) -> FrozenProviderSet {
        let mut state = self.state.lock();
        *state = FinalizerState::Finalized;
        let pending = self.pending.lock();
        let frozen = pending
            .iter()
            .map(|(key, config)| (key.clone(), FrozenProviderContext::freeze(config.clone())))
            .collect();
        FrozenProviderSet { frozen }
    }

    pub fn is_finalized(&self) -> bool {
        *self.state.lock() == FinalizerState::Finalized
    }
}

/// The frozen result of finalization: an immutable lookup table from
/// `(provider_type, alias)` to its frozen context.
#[derive(Debug, Clone, Default)]
pub struct FrozenProviderSet {
    frozen: HashMap<(String, String), FrozenProviderContext>,
}

impl FrozenProviderSet {
    pub fn resolve(&self, provider_type: &str, alias: Option<&str>) -> Result<&FrozenProviderContext> {
        let alias = alias.unwrap_or(DEFAULT_ALIAS);
        self.frozen
            .get(&(provider_type.to_string(), alias.to_string()))
            .ok_or_else(|| Error::not_found(provider_type, alias))
    }

    pub fn len(&self) -> usize {
        self.frozen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frozen.is_empty()
    }
}
