//! Configuration loading from environment variables.

use std::collections::HashMap;

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::{ImportError, ImportResult};

/// Environment prefix for overrides (`PFPDF_MODULE_ID`, `PFPDF_TITLE`)
pub const ENV_PREFIX: &str = "PFPDF";

/// Values that take precedence over command-line options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvOverrides {
    #[serde(default)]
    pub module_id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
}

/// Load overrides from the process environment
pub fn load_env_overrides() -> ImportResult<EnvOverrides> {
    load_from(Environment::with_prefix(ENV_PREFIX))
}

/// Load overrides from an explicit variable map instead of the process environment
pub fn load_env_overrides_from(vars: HashMap<String, String>) -> ImportResult<EnvOverrides> {
    load_from(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
}

fn load_from(environment: Environment) -> ImportResult<EnvOverrides> {
    Config::builder()
        .add_source(environment)
        .build()
        .map_err(|e| ImportError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ImportError::Config {
            message: format!("Failed to deserialize environment overrides: {}", e),
        })
}
