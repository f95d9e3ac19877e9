//! Resolution of a resource's declared provider requirement down
//! through nested modules' `providers = { ... }` passthrough maps to
//! the root-level frozen provider set.

use crate::error::Result;
use crate::finalizer::FrozenProviderSet;
use crate::provider::FrozenProviderContext;
use std::collections::BTreeMap;

/// What a resource block (or a module call) declares it needs.
#[derive(Debug, Clone)]
pub struct ProviderRequirement {
    pub provider_type: String,
    pub alias: Option<String>,
}

impl ProviderRequirement {
    pub fn new(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A single module call's `providers = { local_alias = parent_alias }`
/// mapping, keyed by this module's local alias name.
#[derive(Debug, Clone, Default)]
pub struct ProviderPassthrough {
    aliases: BTreeMap<String, String>,
}

impl ProviderPassthrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_alias(mut self, local_alias: impl Into<String>, parent_alias: impl Into<String>) -> Self {
        self.aliases.insert(local_alias.into(), parent_alias.into());
        self
    }

    /// Translates a local alias name one level up, falling back to the
    /// alias unchanged when there's no explicit mapping (the common
    /// case: a module simply inherits the caller's default provider).
    fn translate(&self, alias: &str) -> String {
        self.aliases
            .get(alias)
            .cloned()
            .unwrap_or_else(|| alias.to_string())
    }
}

/// Walks a requirement up through each enclosing module's passthrough
/// map (innermost first) and resolves the translated alias against
/// the root's frozen provider set.
pub fn resolve<'a>(
    requirement: &ProviderRequirement,
    module_passthroughs: &[ProviderPassthrough],
    frozen: &'a FrozenProviderSet,
) -> Result<&'a FrozenProviderContext> {
    let mut alias = requirement
        .alias
        .clone()
        .unwrap_or_else(|| crate::provider::DEFAULT_ALIAS.to_string());

    for passthrough in module_passthroughs {
        alias = passthrough.translate(&alias);
    }

    frozen.resolve(&requirement.provider_type, Some(&alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalizer::ProviderFinalizer;
    use crate::provider::ProviderConfig;

    #[test]
    fn resolves_default_alias_with_no_passthrough() {
        let finalizer = ProviderFinalizer::new();
        finalizer.register(ProviderConfig::new("aws")).unwrap();
        let frozen = finalizer.finalize();

        let req = ProviderRequirement::new("aws");
        let resolved = resolve(&req, &[], &frozen).unwrap();
        assert_eq!(resolved.alias(), crate::provider::DEFAULT_ALIAS);
    }

    #[test]
    fn translates_alias_through_module_passthrough() {
        let finalizer = ProviderFinalizer::new();
        finalizer
            .register(ProviderConfig::new("aws").with_alias("prod_east").with_region("us-east-1"))
            .unwrap();
        let frozen = finalizer.finalize();

        let req = ProviderRequirement::new("aws").with_alias("east");
        let passthrough = ProviderPassthrough::new().map_alias("east", "prod_east");

        let resolved = resolve(&req, &[passthrough], &frozen).unwrap();
        assert_eq!(resolved.config().region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn chains_translation_across_nested_modules() {
        let finalizer = ProviderFinalizer::new();
        finalizer
            .register(ProviderConfig::new("aws").with_alias("root_alias"))
            .unwrap();
        let frozen = finalizer.finalize();

        let req = ProviderRequirement::new("aws").with_alias("leaf_alias");
        let leaf_to_mid = ProviderPassthrough::new().map_alias("leaf_alias", "mid_alias");
        let mid_to_root = ProviderPassthrough::new().map_alias("mid_alias", "root_alias");

        let resolved = resolve(&req, &[leaf_to_mid, mid_to_root], &frozen).unwrap();
        assert_eq!(resolved.alias(), "root_alias");
    }

    #[test]
    fn missing_provider_errors() {
        let finalizer = ProviderFinalizer::new();
        let frozen = finalizer.finalize();
        let req = ProviderRequirement::new("gcp");
        assert!(resolve(&req, &[], &frozen).is_err());
    }
}
