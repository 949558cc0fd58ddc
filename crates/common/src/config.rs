use anyhow::Result;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub general: General,
    pub input: Input,
    pub output: Output,
    pub features: Features,
    pub scoring: Scoring,
    #[serde(default)]
    pub observability: Observability,
}

#[derive(Debug, Deserialize)]
pub struct General {
    pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Input {
    pub path: String,
    #[serde(default = "default_id_column")]
    pub column: String,
}

#[derive(Debug, Deserialize)]
pub struct Output {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSourceKind {
    Simulated,
    Table,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Features {
    pub source: FeatureSourceKind,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Feature table, required when `source = "table"`.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scoring {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    pub history_weight: f64,
    pub repayment_weight: f64,
    pub liquidation_weight: f64,
    pub capital_weight: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Observability {
    /// Prometheus text exposition written after a successful run.
    pub metrics_textfile: Option<String>,
}

fn default_id_column() -> String {
    "wallet_id".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_epsilon() -> f64 {
    1e-6
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("input.column must not be empty")]
    EmptyColumn,
    #[error("scoring.epsilon must be finite and > 0, got {0}")]
    Epsilon(f64),
    #[error("features.path is required when features.source = \"table\"")]
    MissingFeatureTable,
}

impl Config {
    pub fn load() -> Result<Self> {
        let content = std::fs::read_to_string("config/default.toml")?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that don't depend on the scorer's weight policy.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.input.column.trim().is_empty() {
            return Err(ConfigError::EmptyColumn);
        }
        let eps = self.scoring.epsilon;
        if !eps.is_finite() || eps <= 0.0 {
            return Err(ConfigError::Epsilon(eps));
        }
        if self.features.source == FeatureSourceKind::Table && self.features.path.is_none() {
            return Err(ConfigError::MissingFeatureTable);
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[general]
log_level = "info"

[input]
path = "data/wallet_ids.csv"

[output]
path = "data/wallet_risk.csv"

[features]
source = "simulated"

[scoring]
history_weight = 0.15
repayment_weight = 0.35
liquidation_weight = 0.40
capital_weight = 0.10
"#;

    #[test]
    fn test_load_default_config() {
        let config = Config::from_toml_str(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config.input.column, "wallet_id");
        assert_eq!(config.features.source, FeatureSourceKind::Simulated);
        assert_eq!(config.features.seed, 42);
        assert!((config.scoring.liquidation_weight - 0.40).abs() < 1e-12);
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config = Config::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.input.column, "wallet_id");
        assert_eq!(config.features.seed, 42);
        assert!((config.scoring.epsilon - 1e-6).abs() < 1e-18);
        assert!(config.features.path.is_none());
        assert!(config.observability.metrics_textfile.is_none());
    }

    #[test]
    fn test_table_source_requires_path() {
        let toml = MINIMAL.replace(r#"source = "simulated""#, r#"source = "table""#);
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingFeatureTable)
        );
    }

    #[test]
    fn test_rejects_non_positive_epsilon() {
        let toml = MINIMAL.replace("[scoring]\n", "[scoring]\nepsilon = 0.0\n");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::Epsilon(0.0))
        );
    }

    #[test]
    fn test_rejects_blank_id_column() {
        let toml = MINIMAL.replace(
            "path = \"data/wallet_ids.csv\"\n",
            "path = \"data/wallet_ids.csv\"\ncolumn = \"  \"\n",
        );
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::EmptyColumn)
        );
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let toml = MINIMAL.replace(r#"source = "simulated""#, r#"source = "http""#);
        assert!(Config::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_from_str() {
        let config: Config = MINIMAL.parse().unwrap();
        assert_eq!(config.output.path, "data/wallet_risk.csv");
    }
}
