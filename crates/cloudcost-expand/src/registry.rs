//! The canonical address registry: one `parking_lot::Mutex`-guarded
//! set per run, rejecting duplicate instance addresses the same way
//! `blueprint-store-local-database::LocalDatabase` guards its single
//! backing map with one mutex rather than sharding it.

use crate::error::{Error, Result};
use cloudcost_core::InstanceAddress;
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct AddressRegistry {
    seen: Mutex<HashSet<String>>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instance address, failing if it was already
    /// registered in this run.
    pub fn register(&self, address: &InstanceAddress) -> Result<()> {
        let canonical = address.canonical();
        let mut seen = self.seen.lock();
        if !seen.insert(canonical.clone()) {
            return Err(Error::duplicate_address(canonical));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    pub fn contains(&self, address: &InstanceAddress) -> bool {
        self.seen.lock().contains(&address.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcost_core::{DefinitionAddress, ExpansionKey};

    fn addr(key: ExpansionKey) -> InstanceAddress {
        InstanceAddress::new(DefinitionAddress::new(vec![], "aws_instance", "web"), key)
    }

    #[test]
    fn registers_distinct_addresses() {
        let registry = AddressRegistry::new();
        registry.register(&addr(ExpansionKey::Count(0))).unwrap();
        registry.register(&addr(ExpansionKey::Count(1))).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_duplicate_address() {
        let registry = AddressRegistry::new();
        registry.register(&addr(ExpansionKey::None)).unwrap();
        let err = registry.register(&addr(ExpansionKey::None)).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(cloudcost_core::Error::DuplicateAddress(_))
        ));
    }
}
