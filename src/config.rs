//! Application configuration management.
//!
//! Settings are layered with figment, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config FILE`, or `dupescan.toml` in the platform config
//!    directory when present)
//! 3. `DUPESCAN_*` environment variables (e.g. `DUPESCAN_ALGORITHM=sha256`)
//! 4. Command-line flags, applied by [`Config::apply_scan_args`]

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{OutputFormat, ScanArgs};
use crate::scanner::FingerprintAlgorithm;
use crate::session::UnreadablePolicy;

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "dupescan.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// A layer contained invalid values
    #[error("Invalid configuration")]
    Invalid(#[from] figment::Error),
}

/// Scan settings that can come from file, environment or CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for transient index stores
    pub store_dir: Option<PathBuf>,
    /// Fingerprint algorithm
    pub algorithm: FingerprintAlgorithm,
    /// Handling of unreadable files
    pub on_unreadable: UnreadablePolicy,
    /// Traverse symbolic links to directories
    pub follow_symlinks: bool,
    /// Report format
    pub output: OutputFormat,
}

impl Config {
    /// Load defaults, the configuration file and environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if `explicit` names a missing file or if any layer holds a
    /// value of the wrong type.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }
        let config: Config = Self::figment(explicit).extract()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// The layered figment without CLI overrides.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        let file = explicit
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default configuration file location, if the platform has one.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Default store directory: the platform cache directory, or the system
    /// temp directory when none is available.
    #[must_use]
    pub fn default_store_dir() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Override settings with flags given on the command line.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) {
        if let Some(dir) = &args.store_dir {
            self.store_dir = Some(dir.clone());
        }
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(policy) = args.on_unreadable {
            self.on_unreadable = policy;
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        }
        if let Some(output) = args.output {
            self.output = output;
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "dupescan", "dupescan")
}
