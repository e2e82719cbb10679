//! Ledger configuration.
//!
//! Every field has a default; the environment overrides individual fields.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use realprint_core::DomainError;
use realprint_orders::ConsumptionPolicy;

pub const DATA_DIR_VAR: &str = "REALPRINT_DATA_DIR";
pub const CONSUMPTION_VAR: &str = "REALPRINT_CONSUMPTION";
pub const INTEGRITY_VAR: &str = "REALPRINT_INTEGRITY";
pub const SEED_VAR: &str = "REALPRINT_SEED";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// What happens when an inventory item or final product that is still
/// referenced gets deleted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityMode {
    /// Delete anyway; lookups of the dangling id degrade to "not found".
    #[default]
    Lenient,
    /// Refuse the delete with a conflict.
    Strict,
}

impl FromStr for IntegrityMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(IntegrityMode::Lenient),
            "strict" => Ok(IntegrityMode::Strict),
            other => Err(DomainError::validation(format!("unknown integrity mode: {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory for the file-backed store; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub consumption: ConsumptionPolicy,
    pub integrity: IntegrityMode,
    /// Fall back to the seed dataset for collections missing from the store.
    pub seed: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            consumption: ConsumptionPolicy::Legacy,
            integrity: IntegrityMode::Lenient,
            seed: true,
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (the process environment in
    /// production, a map in tests). Unset or empty variables keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(DATA_DIR_VAR) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = get(CONSUMPTION_VAR) {
            config.consumption = value.parse().map_err(|_| ConfigError::InvalidValue {
                var: CONSUMPTION_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = get(INTEGRITY_VAR) {
            config.integrity = value.parse().map_err(|_| ConfigError::InvalidValue {
                var: INTEGRITY_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = get(SEED_VAR) {
            config.seed = parse_flag(&value).ok_or(ConfigError::InvalidValue {
                var: SEED_VAR,
                value: value.clone(),
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
