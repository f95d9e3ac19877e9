//! The outcome of evaluating one policy.

use cloudcost_core::Money;

#[derive(Debug, Clone)]
pub struct PolicyResult {
    pub policy_name: String,
    pub passed: bool,
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
    pub cost_impact: Option<Money>,
    pub recommendation: Option<String>,
}

impl PolicyResult {
    pub fn pass(policy_name: impl Into<String>) -> Self {
        Self {
            policy_name: policy_name.into(),
            passed: true,
            violations: Vec::new(),
            warnings: Vec::new(),
            cost_impact: None,
            recommendation: None,
        }
    }

    pub fn fail(policy_name: impl Into<String>, violation: impl Into<String>) -> Self {
        Self {
            policy_name: policy_name.into(),
            passed: false,
            violations: vec![violation.into()],
            warnings: Vec::new(),
            cost_impact: None,
            recommendation: None,
        }
    }

    pub fn with_cost_impact(mut self, impact: Money) -> Self {
        self.cost_impact = Some(impact);
        self
    }

    pub fn with_recommendation(mut self, text: impl Into<String>) -> Self {
        self.recommendation = Some(text.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}
