//! The binding registry: maps each instance's canonical address to
//! the frozen provider context it resolved against, so later phases
//! (costing, policy) can look up "which provider priced this
//! instance" without re-walking the module tree.

use crate::error::{Error, Result};
use crate::provider::FrozenProviderContext;
use cloudcost_core::InstanceAddress;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct BindingRegistry {
    bindings: Mutex<HashMap<String, Arc<FrozenProviderContext>>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, address: &InstanceAddress, provider: Arc<FrozenProviderContext>) {
        self.bindings.lock().insert(address.canonical(), provider);
    }

    pub fn lookup(&self, address: &InstanceAddress) -> Result<Arc<FrozenProviderContext>> {
        self.bindings
            .lock()
            .get(&address.canonical())
            .cloned()
            .ok_or_else(|| Error::unbound_instance(address.canonical()))
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.lock().is_empty()
    }
}
