//! The pricing snapshot: an immutable, content-hashed bundle of rates
//! for one provider/region, valid as of a point in time.

use crate::rate::RateEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable bundle of rates. Once constructed its `content_hash`
/// is fixed; nothing in this crate ever mutates a snapshot's fields
/// after [`PricingSnapshot::new`] runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSnapshot {
    id: String,
    provider: String,
    region: String,
    effective_at: DateTime<Utc>,
    rates: BTreeMap<String, RateEntry>,
    content_hash: String,
}

impl PricingSnapshot {
    /// Builds a snapshot and computes its content hash over
    /// `provider || region || effective_at || sorted rates`, the same
    /// field order for every construction so identical inputs always
    /// hash identically.
    pub fn new(
        provider: impl Into<String>,
        region: impl Into<String>,
        effective_at: DateTime<Utc>,
        rates: BTreeMap<String, RateEntry>,
    ) -> Self {
        let provider = provider.into();
        let region = region.into();
        let content_hash = compute_content_hash(&provider, &region, effective_at, &rates);
        let id = content_hash.clone();
        Self {
            id,
            provider,
            region,
            effective_at,
            rates,
            content_hash,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn effective_at(&self) -> DateTime<Utc> {
        self.effective_at
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn rate(&self, key: &str) -> Option<&RateEntry> {
        self.rates.get(key)
    }

    pub fn rate_count(&self) -> usize {
        self.rates.len()
    }

    /// Recomputes the content hash from this snapshot's own fields and
    /// compares it to the stored one, detecting any corruption between
    /// write and read.
    pub fn verify(&self) -> bool {
        compute_content_hash(&self.provider, &self.region, self.effective_at, &self.rates) == self.content_hash
    }

    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.effective_at).num_seconds().max(0)
    }
}

fn compute_content_hash(
    provider: &str,
    region: &str,
    effective_at: DateTime<Utc>,
    rates: &BTreeMap<String, RateEntry>,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(provider.as_bytes());
    hasher.update(b"\0");
    hasher.update(region.as_bytes());
    hasher.update(b"\0");
    hasher.update(effective_at.to_rfc3339().as_bytes());
    for (key, entry) in rates {
        hasher.update(b"\0");
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(entry.unit_rate.to_string().as_bytes());
        hasher.update(entry.unit.as_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rates() -> BTreeMap<String, RateEntry> {
        let mut m = BTreeMap::new();
        m.insert("aws/us-east-1/aws_instance/m5.large/alias=_default_".to_string(), RateEntry::new(dec!(0.096), "hour"));
        m
    }

    #[test]
    fn identical_inputs_hash_identically() {
        let at = Utc::now();
        let a = PricingSnapshot::new("aws", "us-east-1", at, rates());
        let b = PricingSnapshot::new("aws", "us-east-1", at, rates());
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn verify_detects_tampering() {
        let at = Utc::now();
        let mut snapshot = PricingSnapshot::new("aws", "us-east-1", at, rates());
        assert!(snapshot.verify());
        snapshot.content_hash = "tampered".to_string();
        assert!(!snapshot.verify());
    }

    #[test]
    fn age_seconds_is_never_negative() {
        let at = Utc::now();
        let snapshot = PricingSnapshot::new("aws", "us-east-1", at, rates());
        assert!(snapshot.age_seconds(at - chrono::Duration::seconds(10)) >= 0);
    }
}
