//! Settings for the `reposcrape` binary.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "REPOSCRAPE";

/// Environment variable naming the settings file when no argument is given.
pub const CONFIG_ENV: &str = "REPOSCRAPE_CONFIG";

/// What to scrape and where to put it.
///
/// ```yaml
/// destination: /var/lib/reposcrape
/// repositories:
///   - repo_type: git
///     url: https://example.com/cookbooks.git
///     tag: main
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Destination root shared by every backend.
    pub destination: PathBuf,

    /// Raw repository descriptors, normalized one by one when scraped.
    #[serde(default)]
    pub repositories: Vec<Value>,
}

impl Settings {
    /// Loads settings from `path` (if any) overlaid with `REPOSCRAPE_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Self::environment())
    }

    /// Loads settings with an explicit environment source.
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.add_source(env).build()?.try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX).separator("__")
    }
}
