//! Process configuration.
//!
//! Loaded from `plexboxd.toml` (optional) and `PLEXBOXD_*` environment
//! variables. User-facing settings such as the server list live in the
//! key-value store instead; see [`crate::store::Settings`].

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE: &str = "plexboxd.toml";
pub const ENV_PREFIX: &str = "PLEXBOXD_";

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("plexboxd.json")
}

fn default_slow_request_threshold_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Level for this crate's targets when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Location of the JSON key-value store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Request-service calls slower than this are logged as warnings.
    #[serde(default = "default_slow_request_threshold_ms")]
    pub slow_request_threshold_ms: u64,
}

impl Config {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_threshold_ms)
    }
}
