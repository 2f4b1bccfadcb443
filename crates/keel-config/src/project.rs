//! Project Configuration (keel.toml)
//!
//! Handles project-level configuration stored in `keel.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use keel_build::{CodeGeneratorDescriptor, GenericPlatform, ResourceCompilerDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Project configuration from keel.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project metadata
    pub project: ProjectSection,

    /// Source and output directories
    #[serde(default)]
    pub directories: DirectoriesConfig,

    /// Platforms targets can be resolved for
    #[serde(default, rename = "platform")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<PlatformConfig>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: String,

    /// Project version (semver)
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// Targets to generate; every discovered target when empty
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// Platform monikers to generate for; every declared platform when empty
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
}

/// Directories, relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DirectoriesConfig {
    /// Directory searched for rule files (default: "Source")
    #[serde(default = "DirectoriesConfig::default_source")]
    pub source: PathBuf,

    /// Root of generated, intermediate and binary files (default: "Output")
    #[serde(default = "DirectoriesConfig::default_output")]
    pub output: PathBuf,
}

impl DirectoriesConfig {
    fn default_source() -> PathBuf {
        PathBuf::from("Source")
    }

    fn default_output() -> PathBuf {
        PathBuf::from("Output")
    }
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            source: Self::default_source(),
            output: Self::default_output(),
        }
    }
}

/// Tools of one platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PlatformConfig {
    pub moniker: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub linker: Option<String>,

    /// Tool linking static libraries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archiver: Option<String>,

    /// Assembler; modules enabling assembly get none without it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembler: Option<String>,

    #[serde(default, rename = "code-generator")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code_generators: Vec<CodeGeneratorDescriptor>,

    #[serde(default, rename = "resource-compiler")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_compilers: Vec<ResourceCompilerDescriptor>,
}

impl PlatformConfig {
    /// Build the platform capabilities described by this entry
    pub fn to_platform(&self) -> GenericPlatform {
        let mut platform = GenericPlatform::new(&self.moniker);

        if let Some(compiler) = &self.compiler {
            platform = platform.with_compiler(compiler);
        }
        if let Some(linker) = &self.linker {
            platform = platform.with_linker(linker);
        }
        if let Some(archiver) = &self.archiver {
            platform = platform.with_archiver(archiver);
        }
        if let Some(assembler) = &self.assembler {
            platform = platform.with_assembler(assembler);
        }

        let platform = self
            .code_generators
            .iter()
            .cloned()
            .fold(platform, GenericPlatform::with_code_generator);

        self.resource_compilers
            .iter()
            .cloned()
            .fold(platform, GenericPlatform::with_resource_compiler)
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let config: Self = crate::read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.project.name.is_empty() {
            return Err(ConfigError::Validation(
                "project.name cannot be empty".to_string(),
            ));
        }

        if !is_valid_version(&self.project.version) {
            return Err(ConfigError::Validation(format!(
                "invalid project version '{}'",
                self.project.version
            )));
        }

        let mut monikers = HashSet::new();
        for platform in &self.platforms {
            if platform.moniker.is_empty() {
                return Err(ConfigError::Validation(
                    "platform moniker cannot be empty".to_string(),
                ));
            }
            if !monikers.insert(platform.moniker.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "platform '{}' is declared more than once",
                    platform.moniker
                )));
            }
        }

        for moniker in &self.project.platforms {
            if !monikers.contains(moniker.as_str()) {
                return Err(ConfigError::UnknownPlatform(moniker.clone()));
            }
        }

        Ok(())
    }

    /// Platform entry with the given moniker
    pub fn platform(&self, moniker: &str) -> Option<&PlatformConfig> {
        self.platforms.iter().find(|p| p.moniker == moniker)
    }

    /// Monikers to generate for, in declaration order
    pub fn platform_monikers(&self) -> Vec<&str> {
        if self.project.platforms.is_empty() {
            self.platforms.iter().map(|p| p.moniker.as_str()).collect()
        } else {
            self.project.platforms.iter().map(String::as_str).collect()
        }
    }
}

/// Basic semver validation (simplified)
fn is_valid_version(version: &str) -> bool {
    let main_version = version.split(['-', '+']).next().unwrap_or("");

    let parts: Vec<&str> = main_version.split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }

    parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_build::PlatformCapabilities;

    #[test]
    fn test_parse_minimal_project_config() {
        let toml = r#"
[project]
name = "Sandbox"
version = "0.1.0"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.directories, DirectoriesConfig::default());
        assert!(config.platforms.is_empty());
    }

    #[test]
    fn test_parse_full_project_config() {
        let toml = r#"
[project]
name = "Sandbox"
version = "1.2.0"
company = "Keel Games"
copyright = "Copyright Keel Games"
targets = ["Game", "Editor"]
platforms = ["linux"]

[directories]
source = "Code"
output = "Build"

[[platform]]
moniker = "linux"
compiler = "clang"
linker = "lld"
archiver = "llvm-ar"
assembler = "nasm"

[[platform.code-generator]]
id = "reflection"
output-directory = "Reflection"
requires-include = true
requires-compilation = true

[[platform.resource-compiler]]
id = "shaders"
source-directory = "Shaders"

[[platform]]
moniker = "windows"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.project.company.as_deref(), Some("Keel Games"));
        assert_eq!(config.directories.source, PathBuf::from("Code"));
        assert_eq!(config.platform_monikers(), vec!["linux"]);

        let linux = config.platform("linux").unwrap();
        assert_eq!(linux.code_generators.len(), 1);
        assert!(linux.code_generators[0].requires_include);
        assert_eq!(linux.resource_compilers[0].source_directory, "Shaders");
        assert_eq!(linux.to_platform().moniker(), "linux");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let toml = r#"
[project]
name = "Sandbox"
version = "0.1.0"
edition = "2026"
"#;

        assert!(toml::from_str::<ProjectConfig>(toml).is_err());
    }

    #[test]
    fn test_listed_platform_must_be_declared() {
        let toml = r#"
[project]
name = "Sandbox"
version = "0.1.0"
platforms = ["ps5"]
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownPlatform(moniker)) if moniker == "ps5"
        ));
    }

    #[test]
    fn test_duplicate_platforms_rejected() {
        let toml = r#"
[project]
name = "Sandbox"
version = "0.1.0"

[[platform]]
moniker = "linux"

[[platform]]
moniker = "linux"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0.0"));
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("1.0.0-alpha"));
        assert!(!is_valid_version(""));
        assert!(!is_valid_version("1"));
        assert!(!is_valid_version("invalid"));
    }
}
