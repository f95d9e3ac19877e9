//! The input shape the orchestrator consumes: a resource definition
//! already parsed and evaluated up to its cardinality expression and
//! provider requirement. Turning HCL text into these is explicitly
//! out of scope; callers supply them however their own front end
//! produces them.

use cloudcost_core::{DefinitionAddress, EvalContext};
use cloudcost_expand::Cardinality;
use cloudcost_providers::ProviderRequirement;

/// One `resource` block, pre-parsed and pre-evaluated.
pub struct ResourceDefinition {
    pub address: DefinitionAddress,
    pub resource_type: String,
    /// Canonical addresses of other definitions this one statically
    /// depends on, from `depends_on` or the resource's own resolved
    /// references.
    pub depends_on: Vec<String>,
    pub cardinality: Cardinality,
    pub provider_requirement: Option<ProviderRequirement>,
    pub base_context: EvalContext,
}

impl ResourceDefinition {
    pub fn new(address: DefinitionAddress, resource_type: impl Into<String>, base_context: EvalContext) -> Self {
        Self {
            address,
            resource_type: resource_type.into(),
            depends_on: Vec::new(),
            cardinality: Cardinality::Single,
            provider_requirement: None,
            base_context,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn with_provider(mut self, requirement: ProviderRequirement) -> Self {
        self.provider_requirement = Some(requirement);
        self
    }

    pub fn depends_on(mut self, address: impl Into<String>) -> Self {
        self.depends_on.push(address.into());
        self
    }
}
