//! Configuration loading and validation for Palisade.
//!
//! Loads a TOML file; every field has a default so an empty file (or a
//! missing one, via `AppConfig::default()`) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default answer language ("en" or "es").
    #[serde(default = "default_language")]
    pub language: String,

    /// Resolution mode: "local", "hybrid", or "external".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Path to the corpus pack JSON.
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,

    #[serde(default)]
    pub shield: ShieldConfig,

    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub local: LocalConfig,
}

fn default_language() -> String {
    "en".into()
}

fn default_mode() -> String {
    "hybrid".into()
}

fn default_corpus_path() -> String {
    "packs/site-pack.json".into()
}

/// Content-safety scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConfig {
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    #[serde(default = "default_risk_threshold")]
    pub risk_threshold: u32,
}

fn default_max_len() -> usize {
    2000
}

fn default_risk_threshold() -> u32 {
    12
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
            risk_threshold: default_risk_threshold(),
        }
    }
}

/// Session budget thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_soft_cap")]
    pub soft: u64,

    #[serde(default = "default_hard_cap")]
    pub hard: u64,
}

fn default_soft_cap() -> u64 {
    75_000
}

fn default_hard_cap() -> u64 {
    100_000
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            soft: default_soft_cap(),
            hard: default_hard_cap(),
        }
    }
}

/// Extractive-tier quality gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_bm25_min")]
    pub bm25_min: f64,

    #[serde(default = "default_coverage_needed")]
    pub coverage_needed: usize,
}

fn default_bm25_min() -> f64 {
    0.6
}

fn default_coverage_needed() -> usize {
    2
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            bm25_min: default_bm25_min(),
            coverage_needed: default_coverage_needed(),
        }
    }
}

/// Remote inference service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Chat endpoint URL; empty disables the remote tier.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    300
}

/// Local accelerator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Model identifier handed to the accelerator's load call.
    #[serde(default = "default_model_identifier")]
    pub model_identifier: String,
}

fn default_model_identifier() -> String {
    "Llama-3.1-8B-Instruct-q4f16_1".into()
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            model_identifier: default_model_identifier(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        // an empty TOML document is all defaults
        toml::from_str("").expect("defaults are valid")
    }
}

impl AppConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), mode = %config.mode, "config loaded");
        Ok(config)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.mode.as_str(), "local" | "hybrid" | "external") {
            return Err(ConfigError::Invalid(format!(
                "mode must be local, hybrid, or external (got {:?})",
                self.mode
            )));
        }
        if self.budget.hard == 0 {
            return Err(ConfigError::Invalid("budget.hard must be positive".into()));
        }
        if self.budget.soft > self.budget.hard {
            return Err(ConfigError::Invalid(
                "budget.soft must not exceed budget.hard".into(),
            ));
        }
        if self.retrieval.bm25_min < 0.0 {
            return Err(ConfigError::Invalid(
                "retrieval.bm25_min must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
