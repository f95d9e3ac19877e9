//! The phased estimation run: the workspace's single public entry
//! point, enforcing the monotonic `Phase` order from
//! `cloudcost_core::error::Phase` and running each downstream crate's
//! piece of the pipeline in turn.

use crate::cancel::CancellationToken;
use crate::config::EstimatorConfig;
use crate::definition::ResourceDefinition;
use crate::error::{Error, Result};
use cloudcost_core::{Phase, UnknownSet};
use cloudcost_costing::{cost_instances, CostAggregate, CostingInput, MapperRegistry};
use cloudcost_expand::{expand, AddressRegistry};
use cloudcost_graph::DependencyGraph;
use cloudcost_pricing::{PricingSnapshot, SnapshotRequest, SnapshotResolver};
use cloudcost_providers::{resolve as resolve_provider, BindingRegistry, FrozenProviderSet, ProviderConfig, ProviderFinalizer};
use cloudcost_policy::{EngineReport, PolicyEngine};
use std::sync::Arc;
use tracing::{debug, info};

/// Pulls the `Unknown` out of a cardinality expression, if any, so it
/// can be recorded before expansion falls back to a symbolic or
/// assumed-single instance.
fn cardinality_unknown(cardinality: &cloudcost_expand::Cardinality) -> Option<&cloudcost_core::Unknown> {
    match cardinality {
        cloudcost_expand::Cardinality::Single => None,
        cloudcost_expand::Cardinality::Count(evaluated) | cloudcost_expand::Cardinality::ForEach(evaluated) => {
            evaluated.as_unknown()
        }
    }
}

/// One expanded, bound instance ready to be priced.
struct BoundInstance {
    address: cloudcost_core::InstanceAddress,
    resource_type: String,
    context: cloudcost_core::EvalContext,
    region: String,
    provider_type: String,
}

pub struct EstimationRun {
    phase: Phase,
    config: EstimatorConfig,
    cancellation: CancellationToken,

    definitions: Vec<ResourceDefinition>,
    providers: Vec<ProviderConfig>,
    graph: DependencyGraph,
    topo_order: Vec<String>,
    finalizer: ProviderFinalizer,
    frozen_providers: Option<FrozenProviderSet>,
    address_registry: AddressRegistry,
    bindings: BindingRegistry,
    bound_instances: Vec<BoundInstance>,
    unknowns: UnknownSet,
    aggregate: Option<CostAggregate>,
    policy_report: Option<EngineReport>,
}

impl EstimationRun {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            phase: Phase::Uninitialized,
            config,
            cancellation: CancellationToken::new(),
            definitions: Vec::new(),
            providers: Vec::new(),
            graph: DependencyGraph::new(),
            topo_order: Vec::new(),
            finalizer: ProviderFinalizer::new(),
            frozen_providers: None,
            address_registry: AddressRegistry::new(),
            bindings: BindingRegistry::new(),
            bound_instances: Vec::new(),
            unknowns: UnknownSet::new(),
            aggregate: None,
            policy_report: None,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Unknowns recorded so far (populated incrementally from
    /// [`Self::expand_instances`] onward).
    pub fn unknowns(&self) -> &UnknownSet {
        &self.unknowns
    }

    fn require_phase(&self, required: Phase) -> Result<()> {
        if self.phase != required {
            return Err(cloudcost_core::Error::PhaseOrder {
                required,
                current: self.phase,
            }
            .into());
        }
        Ok(())
    }

    fn advance_to(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "advancing phase");
        self.phase = phase;
    }

    /// Loads resource definitions and provider blocks. The only
    /// operation valid at [`Phase::Uninitialized`].
    pub fn parse(&mut self, definitions: Vec<ResourceDefinition>, providers: Vec<ProviderConfig>) -> Result<()> {
        self.require_phase(Phase::Uninitialized)?;
        self.cancellation.check()?;

        for provider in &providers {
            self.finalizer.register(provider.clone())?;
        }
        self.providers = providers;
        self.definitions = definitions;

        info!(definitions = self.definitions.len(), providers = self.providers.len(), "parsed run inputs");
        self.advance_to(Phase::Parsed);
        Ok(())
    }

    /// Builds the static dependency graph over definitions and
    /// computes a deterministic topological order, failing on a
    /// cycle.
    pub fn build_graph(&mut self) -> Result<()> {
        self.require_phase(Phase::Parsed)?;
        self.cancellation.check()?;

        for definition in &self.definitions {
            self.graph.add_node(definition.address.canonical());
            for dependency in &definition.depends_on {
                self.graph.add_edge(definition.address.canonical(), dependency.clone());
            }
        }

        self.topo_order = self.graph.topological_order()?;
        info!(nodes = self.graph.node_count(), edges = self.graph.edge_count(), "built dependency graph");
        self.advance_to(Phase::GraphBuilt);
        Ok(())
    }

    /// Freezes every registered provider. One-way: once called, no
    /// further provider registration is possible.
    pub fn freeze_providers(&mut self) -> Result<()> {
        self.require_phase(Phase::GraphBuilt)?;
        self.cancellation.check()?;

        self.frozen_providers = Some(self.finalizer.finalize());
        info!("froze provider configuration");
        self.advance_to(Phase::ProvidersFrozen);
        Ok(())
    }

    /// Expands every definition into its instances, registers each
    /// instance's canonical address, and binds it to its resolved
    /// provider.
    pub fn expand_instances(&mut self) -> Result<()> {
        self.require_phase(Phase::ProvidersFrozen)?;
        self.cancellation.check()?;

        let frozen = self
            .frozen_providers
            .as_ref()
            .expect("providers frozen before this phase can run");

        let by_address: std::collections::HashMap<String, usize> = self
            .definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.address.canonical(), i))
            .collect();

        for address in &self.topo_order {
            let Some(&idx) = by_address.get(address) else {
                continue;
            };
            let definition = &self.definitions[idx];

            if let Some(unknown) = cardinality_unknown(&definition.cardinality) {
                self.unknowns.record(definition.address.canonical(), unknown.clone());
            }

            let expanded = expand(
                &definition.address,
                definition.cardinality.clone(),
                &definition.base_context,
                self.config.evaluation_mode,
            )?;

            for instance in expanded {
                self.address_registry.register(&instance.address)?;

                let (provider_type, region) = if let Some(requirement) = &definition.provider_requirement {
                    let resolved = resolve_provider(requirement, &[], frozen)?;
                    let provider_type = resolved.provider_type().to_string();
                    let region = resolved
                        .config()
                        .region
                        .clone()
                        .unwrap_or_else(|| self.config.default_region.clone());
                    self.bindings.bind(
                        &instance.address,
                        Arc::new(resolved.clone()),
                    );
                    (provider_type, region)
                } else {
                    (definition.resource_type.clone(), self.config.default_region.clone())
                };

                self.bound_instances.push(BoundInstance {
                    address: instance.address,
                    resource_type: definition.resource_type.clone(),
                    context: instance.context,
                    region,
                    provider_type,
                });
            }
        }

        info!(instances = self.bound_instances.len(), "expanded instances");
        self.advance_to(Phase::Expanded);
        Ok(())
    }

    /// Resolves a pricing snapshot per bound instance and prices every
    /// instance via its registered cloud-mapper.
    pub fn cost(
        &mut self,
        mappers: &MapperRegistry,
        resolver: &SnapshotResolver<'_>,
    ) -> Result<()> {
        self.require_phase(Phase::Expanded)?;
        self.cancellation.check()?;

        let mut snapshots: Vec<PricingSnapshot> = Vec::with_capacity(self.bound_instances.len());
        for instance in &self.bound_instances {
            let request = SnapshotRequest::Latest {
                provider: instance.provider_type.clone(),
                region: instance.region.clone(),
            };
            snapshots.push(resolver.resolve(&request)?);
        }

        let inputs: Vec<CostingInput<'_>> = self
            .bound_instances
            .iter()
            .zip(snapshots.iter())
            .map(|(instance, snapshot)| CostingInput {
                address: instance.address.clone(),
                resource_type: instance.resource_type.clone(),
                context: instance.context.clone(),
                snapshot,
            })
            .collect();

        let aggregate = cost_instances(inputs, mappers)?;
        info!(nodes = aggregate.nodes.len(), total = %aggregate.project_total, "costed run");
        self.aggregate = Some(aggregate);
        self.advance_to(Phase::Costed);
        Ok(())
    }

    /// Runs every registered deep-context policy over the resulting
    /// aggregate.
    pub fn evaluate_policy(&mut self, engine: &PolicyEngine) -> Result<()> {
        self.require_phase(Phase::Costed)?;
        self.cancellation.check()?;

        let aggregate = self.aggregate.as_ref().expect("costed before this phase can run");
        let report = engine.evaluate(aggregate);
        self.policy_report = Some(report);
        self.advance_to(Phase::PolicyEvaluated);
        Ok(())
    }

    /// Completes the run, returning the final aggregate, policy
    /// report, and accumulated unknowns.
    pub fn finish(mut self) -> Result<EstimationResult> {
        self.require_phase(Phase::PolicyEvaluated)?;
        self.advance_to(Phase::Complete);

        Ok(EstimationResult {
            aggregate: self.aggregate.take().expect("costed before completion"),
            policy_report: self.policy_report.take().expect("policy evaluated before completion"),
            unknowns: self.unknowns,
        })
    }
}

pub struct EstimationResult {
    pub aggregate: CostAggregate,
    pub policy_report: EngineReport,
    pub unknowns: UnknownSet,
}
