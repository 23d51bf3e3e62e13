//! Runtime configuration.
//!
//! Every setting has a default and can be overridden through the environment:
//!
//! | Variable                 | Default         |
//! |--------------------------|-----------------|
//! | `SKYGLOW_LOCATION_SCOPE` | `*locations*`   |
//! | `SKYGLOW_SAMPLE_SCOPE`   | `*samples*`     |
//! | `SKYGLOW_DB`             | `skyglow.bin`   |
//! | `SKYGLOW_LOG`            | `info`          |

use crate::store::Scope;
use std::path::PathBuf;

/// Default partition key for locations.
pub const DEFAULT_LOCATION_SCOPE: &str = "*locations*";
/// Default partition key for samples.
pub const DEFAULT_SAMPLE_SCOPE: &str = "*samples*";
/// Default snapshot file used by the command line tool.
pub const DEFAULT_SNAPSHOT_PATH: &str = "skyglow.bin";
/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Partition key for the location collection
    pub location_scope: String,
    /// Partition key for the sample collection
    pub sample_scope: String,
    /// Where [`SkyDatabase::open`](crate::SkyDatabase::open) and
    /// [`SkyDatabase::save`](crate::SkyDatabase::save) read and write
    pub snapshot_path: PathBuf,
    /// Filter passed to `env_logger` by the binary
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location_scope: DEFAULT_LOCATION_SCOPE.to_string(),
            sample_scope: DEFAULT_SAMPLE_SCOPE.to_string(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `SKYGLOW_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let set = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(scope) = set("SKYGLOW_LOCATION_SCOPE") {
            config.location_scope = scope;
        }
        if let Some(scope) = set("SKYGLOW_SAMPLE_SCOPE") {
            config.sample_scope = scope;
        }
        if let Some(path) = set("SKYGLOW_DB") {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(filter) = set("SKYGLOW_LOG") {
            config.log_filter = filter;
        }
        config
    }

    /// Scope of the location collection.
    pub fn location_scope(&self) -> Scope {
        Scope::new(self.location_scope.as_str())
    }

    /// Scope of the sample collection.
    pub fn sample_scope(&self) -> Scope {
        Scope::new(self.sample_scope.as_str())
    }
}
