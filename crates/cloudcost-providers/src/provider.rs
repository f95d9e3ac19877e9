//! Provider configuration and the frozen, content-hashed context every
//! resource instance binds to.

use cloudcost_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The default alias used when a `provider` block declares none.
pub const DEFAULT_ALIAS: &str = "_default_";

/// A `provider "aws" { alias = "east" ... }` block as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: String,
    pub alias: String,
    pub region: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

impl ProviderConfig {
    pub fn new(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            alias: DEFAULT_ALIAS.to_string(),
            region: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// A provider configuration that has been frozen: no further mutation
/// is possible and its identity is a content hash over its fields, the
/// way `blueprint-pricing-engine::pricing::PricingSnapshot` is
/// identified by a hash over provider/region/rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrozenProviderContext {
    config: ProviderConfig,
    content_hash: String,
}

impl FrozenProviderContext {
    pub fn freeze(config: ProviderConfig) -> Self {
        let content_hash = compute_content_hash(&config);
        Self { config, content_hash }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn provider_type(&self) -> &str {
        &self.config.provider_type
    }

    pub fn alias(&self) -> &str {
        &self.config.alias
    }
}

fn compute_content_hash(config: &ProviderConfig) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(config.provider_type.as_bytes());
    hasher.update(b"\0");
    hasher.update(config.alias.as_bytes());
    hasher.update(b"\0");
    hasher.update(config.region.as_deref().unwrap_or("").as_bytes());
    hasher.update(b"\0");
    for (key, value) in &config.attributes {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.to_string().as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize().as_bytes())
}
