//! Rate keys: the canonical string form used to look up a price
//! within a snapshot, and one priced entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The sentinel used for the alias segment of a rate key when a
/// resource has no provider alias (mirrors
/// `cloudcost_providers::DEFAULT_ALIAS`, duplicated here so this
/// crate doesn't need a dependency on `cloudcost-providers`).
pub const DEFAULT_ALIAS: &str = "_default_";

/// A priced entry: a unit rate plus the granularity it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub unit_rate: Decimal,
    pub unit: String,
    pub billing_detail: Option<String>,
}

impl RateEntry {
    pub fn new(unit_rate: Decimal, unit: impl Into<String>) -> Self {
        Self {
            unit_rate,
            unit: unit.into(),
            billing_detail: None,
        }
    }

    pub fn with_billing_detail(mut self, detail: impl Into<String>) -> Self {
        self.billing_detail = Some(detail.into());
        self
    }
}

/// Builds the canonical rate-key string:
/// `<provider>/<region>/<resource_type>/<sku>[/alias=<alias>]`.
/// The alias segment is always present, defaulting to
/// [`DEFAULT_ALIAS`], so two otherwise-identical keys under different
/// provider aliases never collide.
#[derive(Debug, Clone)]
pub struct RateKeyBuilder {
    provider: String,
    region: String,
    resource_type: String,
    sku: String,
    alias: String,
}

impl RateKeyBuilder {
    pub fn new(
        provider: impl Into<String>,
        region: impl Into<String>,
        resource_type: impl Into<String>,
        sku: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            region: region.into(),
            resource_type: resource_type.into(),
            sku: sku.into(),
            alias: DEFAULT_ALIAS.to_string(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn build(&self) -> String {
        format!(
            "{}/{}/{}/{}/alias={}",
            self.provider, self.region, self.resource_type, self.sku, self.alias
        )
    }
}
