//! Layered configuration loading.
//!
//! Settings resolve in three layers: the serde defaults from
//! [`AppConfig`], then a TOML file, then `ARB_`-prefixed environment
//! variables (nested keys separated by `__`, e.g.
//! `ARB_MATCHING__SIMILARITY_THRESHOLD=0.9`). Later layers win, so a
//! deployment can pin one threshold in the environment without restating
//! the rest of the file.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::config::AppConfig;

/// Environment variable prefix for overrides.
const ENV_PREFIX: &str = "ARB_";

/// Default configuration file location, relative to the working directory.
const DEFAULT_PATH: &str = "config/arb.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default file location plus environment
    /// overrides. A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error when the file or an override cannot be parsed into
    /// [`AppConfig`].
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_PATH)
    }

    /// Loads configuration from an explicit TOML file path plus environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the file or an override cannot be parsed into
    /// [`AppConfig`].
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}
