//! Keel Configuration System
//!
//! Loads everything needed to resolve a Keel target from disk:
//! - Project configuration (keel.toml)
//! - Module and target rule files (`*.module.toml`, `*.target.toml`)
//! - Environment overrides (KEEL_*)
//!
//! # Configuration Hierarchy
//!
//! Values are merged in the following order (later overrides earlier):
//! 1. Rule file declarations
//! 2. Project config (./keel.toml)
//! 3. Environment variables (KEEL_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use keel_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let project = loader.load_from_directory(Path::new(".")).unwrap();
//! let resolved = project.resolve("Game", "linux", None).unwrap();
//! ```

pub mod loader;
pub mod project;
pub mod rules;

use keel_build::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No keel.toml found in {0} or any parent directory")]
    NotFound(PathBuf),

    #[error("Failed to read {file}: {error}")]
    Io {
        file: PathBuf,
        error: std::io::Error,
    },

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParse {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Unknown target '{0}'")]
    UnknownTarget(String),

    #[error("Unknown platform '{0}'")]
    UnknownPlatform(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ConfigError {
    pub(crate) fn io(file: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            file: file.into(),
            error,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Read and parse one TOML file
pub(crate) fn read_toml<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        file: path.to_path_buf(),
        error: e,
    })
}

// Re-export main types
pub use loader::{ConfigLoader, EnvOverrides, Project};
pub use project::{DirectoriesConfig, PlatformConfig, ProjectConfig, ProjectSection};
pub use rules::{ModuleRule, RuleSet, TargetRule};
