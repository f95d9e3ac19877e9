//! The policy engine: runs every registered deep-context and
//! diff-aware policy and reduces their results according to the
//! configured enforcement mode.

use crate::diff::DiffPolicy;
use crate::error::{Error, Result};
use crate::policies::Policy;
use crate::result::PolicyResult;
use cloudcost_costing::CostAggregate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How the engine reacts to a policy violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Violations are recorded but never block or even warn loudly.
    Informational,
    /// Violations are logged as warnings.
    #[default]
    Warning,
    /// A violation from any policy fails the run.
    Blocking,
    /// Like blocking, but warnings are also treated as violations.
    Strict,
}

#[derive(Debug, Clone)]
pub struct EngineReport {
    pub results: Vec<PolicyResult>,
    pub blocked: bool,
}

pub struct PolicyEngine {
    mode: EngineMode,
    policies: Vec<Box<dyn Policy>>,
    diff_policies: Vec<Box<dyn DiffPolicy>>,
}

impl PolicyEngine {
    pub fn new(mode: EngineMode) -> Self {
        Self {
            mode,
            policies: Vec::new(),
            diff_policies: Vec::new(),
        }
    }

    pub fn register(&mut self, policy: Box<dyn Policy>) {
        self.policies.push(policy);
    }

    pub fn register_diff(&mut self, policy: Box<dyn DiffPolicy>) {
        self.diff_policies.push(policy);
    }

    pub fn evaluate(&self, aggregate: &CostAggregate) -> EngineReport {
        let results: Vec<PolicyResult> = self.policies.iter().map(|p| p.evaluate(aggregate)).collect();
        self.reduce(results)
    }

    pub fn evaluate_diff(&self, baseline: &CostAggregate, proposed: &CostAggregate) -> EngineReport {
        let results: Vec<PolicyResult> = self
            .diff_policies
            .iter()
            .map(|p| p.evaluate_diff(baseline, proposed))
            .collect();
        self.reduce(results)
    }

    fn reduce(&self, results: Vec<PolicyResult>) -> EngineReport {
        for result in &results {
            if !result.passed {
                warn!(policy = %result.policy_name, violations = ?result.violations, "policy violation");
            } else if !result.warnings.is_empty() {
                warn!(policy = %result.policy_name, warnings = ?result.warnings, "policy warning");
            }
        }

        let has_violation = results.iter().any(|r| !r.passed);
        let has_warning = results.iter().any(|r| !r.warnings.is_empty());

        let blocked = match self.mode {
            EngineMode::Informational => false,
            EngineMode::Warning => false,
            EngineMode::Blocking => has_violation,
            EngineMode::Strict => has_violation || has_warning,
        };

        EngineReport { results, blocked }
    }

    /// Converts a blocked report into an [`Error::Blocked`] for the
    /// orchestrator to propagate, naming the first violation.
    pub fn into_result(mode: EngineMode, report: EngineReport) -> Result<EngineReport> {
        if report.blocked {
            let offender = report
                .results
                .iter()
                .find(|r| !r.passed || (mode == EngineMode::Strict && !r.warnings.is_empty()));
            if let Some(offender) = offender {
                let violation = offender
                    .violations
                    .first()
                    .cloned()
                    .or_else(|| offender.warnings.first().cloned())
                    .unwrap_or_default();
                return Err(Error::Blocked {
                    policy: offender.policy_name.clone(),
                    violation,
                });
            }
        }
        Ok(report)
    }
}
