//! VM configuration, layered from defaults, `.config.env` and the environment.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::error::Result;

const CARGO_MANIFEST_DIR: &str = env!("CARGO_MANIFEST_DIR");
const CONFIG_ENV_PREFIX: &str = "FIB";

pub trait Config: DeserializeOwned {
    const PREFIX: &'static str;

    fn from_env() -> Result<Self> {
        let prefix = format!("{}_{}", CONFIG_ENV_PREFIX, Self::PREFIX);
        match dotenvy::from_path(config_env_path()) {
            Err(err) if err.not_found() => debug!("no .config.env found"),
            result => result?,
        }

        Ok(config::Config::builder()
            .add_source(
                config::Environment::with_prefix(&prefix)
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?)
    }
}

#[doc(hidden)]
pub fn config_env_path() -> PathBuf {
    Path::new(CARGO_MANIFEST_DIR).join(".config.env")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VmConfig {
    /// Maximum number of instructions executed before giving up.
    #[serde(rename = "maxsteps", default = "default_max_steps")]
    pub max_steps: u64,

    /// Initial stack pointer.
    #[serde(rename = "stacktop", default = "default_stack_top")]
    pub stack_top: u32,
}

fn default_max_steps() -> u64 {
    10_000_000
}

fn default_stack_top() -> u32 {
    0x8040_0000
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            stack_top: default_stack_top(),
        }
    }
}

impl Config for VmConfig {
    const PREFIX: &'static str = "VM";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_config() {
        std::env::set_var("FIB_VM_MAXSTEPS", "1234");

        let config = <VmConfig as Config>::from_env().unwrap();
        assert_eq!(config.max_steps, 1234);
        assert_eq!(config.stack_top, VmConfig::default().stack_top);
    }
}
