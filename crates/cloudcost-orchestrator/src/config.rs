//! Run configuration, loaded from TOML the way
//! `blueprint-pricing-engine::config::OperatorConfig` is: a
//! hand-written `Default` with sensible values, overridden by
//! `toml::from_str` when a config file is supplied.

use crate::error::Result;
use cloudcost_core::EvaluationMode;
use cloudcost_policy::EngineMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub evaluation_mode: EvaluationMode,
    pub policy_mode: EngineMode,
    /// Maximum age, in seconds, a pricing snapshot may have before
    /// `None` disables the check.
    pub snapshot_max_age_secs: Option<u64>,
    pub default_region: String,
    pub monthly_budget_usd: Option<String>,
    pub min_confidence: Option<f64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            evaluation_mode: EvaluationMode::Permissive,
            policy_mode: EngineMode::Warning,
            snapshot_max_age_secs: Some(30 * 24 * 60 * 60),
            default_region: "us-east-1".to_string(),
            monthly_budget_usd: None,
            min_confidence: None,
        }
    }
}

impl EstimatorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_permissive_with_a_month_of_snapshot_age() {
        let config = EstimatorConfig::default();
        assert_eq!(config.evaluation_mode, EvaluationMode::Permissive);
        assert_eq!(config.snapshot_max_age_secs, Some(30 * 24 * 60 * 60));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = EstimatorConfig::from_toml_str(
            r#"
            evaluation_mode = "strict"
            default_region = "eu-west-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.evaluation_mode, EvaluationMode::Strict);
        assert_eq!(config.default_region, "eu-west-1");
        assert_eq!(config.policy_mode, EngineMode::Warning);
    }
}
