//! The enforced resolver: the only sanctioned way to get a
//! [`PricingSnapshot`] out of a [`SnapshotStore`] for use in costing.
//! Every path verifies the content hash and, when a max age is
//! configured, rejects a snapshot older than it.

use crate::error::{Error, Result};
use crate::snapshot::PricingSnapshot;
use crate::store::SnapshotStore;
use chrono::Utc;

/// A pin to a specific snapshot, or a request for whatever is latest
/// for a provider/region.
pub enum SnapshotRequest {
    Id(String),
    Latest { provider: String, region: String },
}

pub struct SnapshotResolver<'a> {
    store: &'a SnapshotStore,
    max_age_secs: Option<u64>,
}

impl<'a> SnapshotResolver<'a> {
    pub fn new(store: &'a SnapshotStore) -> Self {
        Self {
            store,
            max_age_secs: None,
        }
    }

    pub fn with_max_age_secs(mut self, max_age_secs: u64) -> Self {
        self.max_age_secs = Some(max_age_secs);
        self
    }

    pub fn resolve(&self, request: &SnapshotRequest) -> Result<PricingSnapshot> {
        let snapshot = match request {
            SnapshotRequest::Id(id) => self.store.get(id)?,
            SnapshotRequest::Latest { provider, region } => self.store.get_latest(provider, region)?,
        };

        if !snapshot.verify() {
            return Err(Error::invalid(snapshot.id(), snapshot.content_hash(), "recomputed mismatch"));
        }

        if let Some(max_age) = self.max_age_secs {
            let age = snapshot.age_seconds(Utc::now()) as u64;
            if age > max_age {
                return Err(Error::expired(
                    snapshot.id(),
                    snapshot.effective_at().to_rfc3339(),
                    max_age,
                ));
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::RateEntry;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn store_with_snapshot(effective_at: chrono::DateTime<Utc>) -> (tempfile::TempDir, PricingSnapshot) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let mut rates = BTreeMap::new();
        rates.insert("k".to_string(), RateEntry::new(dec!(1.0), "hour"));
        let snapshot = PricingSnapshot::new("aws", "us-east-1", effective_at, rates);
        store.put(&snapshot).unwrap();
        (dir, snapshot)
    }

    #[test]
    fn resolves_by_explicit_id() {
        let (dir, snapshot) = store_with_snapshot(Utc::now());
        let store = SnapshotStore::open(dir.path()).unwrap();
        let resolver = SnapshotResolver::new(&store);
        let resolved = resolver.resolve(&SnapshotRequest::Id(snapshot.id().to_string())).unwrap();
        assert_eq!(resolved.id(), snapshot.id());
    }

    #[test]
    fn resolves_latest_by_provider_and_region() {
        let (dir, snapshot) = store_with_snapshot(Utc::now());
        let store = SnapshotStore::open(dir.path()).unwrap();
        let resolver = SnapshotResolver::new(&store);
        let resolved = resolver
            .resolve(&SnapshotRequest::Latest {
                provider: "aws".to_string(),
                region: "us-east-1".to_string(),
            })
            .unwrap();
        assert_eq!(resolved.id(), snapshot.id());
    }

    #[test]
    fn rejects_expired_snapshot() {
        let (dir, snapshot) = store_with_snapshot(Utc::now() - Duration::seconds(1000));
        let store = SnapshotStore::open(dir.path()).unwrap();
        let resolver = SnapshotResolver::new(&store).with_max_age_secs(100);
        let err = resolver
            .resolve(&SnapshotRequest::Id(snapshot.id().to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Core(cloudcost_core::Error::SnapshotExpired { .. })
        ));
    }

    #[test]
    fn rejects_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let resolver = SnapshotResolver::new(&store);
        assert!(resolver.resolve(&SnapshotRequest::Id("nonexistent".into())).is_err());
    }
}
