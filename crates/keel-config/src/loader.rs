//! Configuration Loader
//!
//! Finds `keel.toml`, discovers rule files and applies environment overrides.

use crate::project::{PlatformConfig, ProjectConfig};
use crate::rules::RuleSet;
use crate::{ConfigError, ConfigResult};
use keel_build::{
    resolve_configurations, ConfigurationResolution, GenericPlatform, ModuleDeclaration,
    ResolvedTarget, TargetConfiguration, TargetDeclaration, TargetLinkKind,
};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the project file
pub const PROJECT_FILE: &str = "keel.toml";

/// Configuration loader
///
/// Values are merged with the following precedence:
/// 1. Rule files - lowest priority
/// 2. Project config (./keel.toml) - overrides rule files
/// 3. Environment variables (KEEL_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Ignore KEEL_* variables
    ignore_env: bool,
}

/// Values read from KEEL_* environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// KEEL_CONFIGURATION
    pub configuration: Option<TargetConfiguration>,
    /// KEEL_LINK_KIND
    pub link_kind: Option<TargetLinkKind>,
    /// KEEL_OUTPUT_DIR
    pub output_directory: Option<PathBuf>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        let configuration = env::var("KEEL_CONFIGURATION")
            .ok()
            .map(|value| value.parse::<TargetConfiguration>())
            .transpose()?;

        let link_kind = env::var("KEEL_LINK_KIND")
            .ok()
            .map(|value| value.parse::<TargetLinkKind>())
            .transpose()?;

        let output_directory = env::var_os("KEEL_OUTPUT_DIR").map(PathBuf::from);

        Ok(Self {
            configuration,
            link_kind,
            output_directory,
        })
    }
}

/// A loaded project: configuration, rules and overrides
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing keel.toml
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub rules: RuleSet,
    pub overrides: EnvOverrides,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip environment overrides
    pub fn without_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Load the project containing `start_dir`
    ///
    /// Walks up the directory tree to find keel.toml.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Project> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_FILE);
            if config_path.is_file() {
                return self.load_from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(ConfigError::NotFound(start_dir.to_path_buf())),
            }
        }
    }

    /// Load the project described by a specific keel.toml
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Project> {
        let config = ProjectConfig::load_from_file(config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let rules = RuleSet::discover(&root.join(&config.directories.source))?;

        let overrides = if self.ignore_env {
            EnvOverrides::default()
        } else {
            EnvOverrides::from_env()?
        };

        let project = Project {
            root,
            config,
            rules,
            overrides,
        };
        project.check_platform_filters();

        debug!(
            name = %project.config.project.name,
            root = %project.root.display(),
            "loaded project"
        );

        Ok(project)
    }
}

impl Project {
    /// Names of the targets to generate
    pub fn target_names(&self) -> Vec<&str> {
        if self.config.project.targets.is_empty() {
            self.rules.target_names()
        } else {
            self.config.project.targets.iter().map(String::as_str).collect()
        }
    }

    /// Monikers of the platforms to generate for
    pub fn platform_monikers(&self) -> Vec<&str> {
        self.config.platform_monikers()
    }

    pub fn default_target(&self) -> ConfigResult<&str> {
        self.target_names()
            .first()
            .copied()
            .ok_or_else(|| ConfigError::Validation("project declares no targets".to_string()))
    }

    pub fn default_platform(&self) -> ConfigResult<&str> {
        self.platform_monikers()
            .first()
            .copied()
            .ok_or_else(|| ConfigError::Validation("project declares no platforms".to_string()))
    }

    /// Output root with KEEL_OUTPUT_DIR applied, anchored at the project root
    pub fn output_directory(&self) -> PathBuf {
        let output = self
            .overrides
            .output_directory
            .as_ref()
            .unwrap_or(&self.config.directories.output);
        self.root.join(output)
    }

    /// Target declaration with project and environment settings applied
    pub fn target(&self, name: &str) -> ConfigResult<TargetDeclaration> {
        let mut target = self
            .rules
            .target(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))?;

        target.output_directory = self.output_directory();
        if let Some(configuration) = self.overrides.configuration {
            target.configuration = configuration;
        }
        if let Some(link_kind) = self.overrides.link_kind {
            target.link_kind = link_kind;
        }

        Ok(target)
    }

    pub fn platform_config(&self, moniker: &str) -> ConfigResult<&PlatformConfig> {
        self.config
            .platform(moniker)
            .ok_or_else(|| ConfigError::UnknownPlatform(moniker.to_string()))
    }

    pub fn platform(&self, moniker: &str) -> ConfigResult<GenericPlatform> {
        self.platform_config(moniker).map(PlatformConfig::to_platform)
    }

    /// Module declarations built for `moniker`
    pub fn modules(&self, moniker: &str) -> ConfigResult<Vec<ModuleDeclaration>> {
        self.platform_config(moniker)?;
        Ok(self.rules.modules_for(moniker))
    }

    /// Resolve one target on one platform
    ///
    /// `configuration` overrides the one from the target and the environment.
    pub fn resolve(
        &self,
        target: &str,
        moniker: &str,
        configuration: Option<TargetConfiguration>,
    ) -> ConfigResult<ResolvedTarget> {
        let mut declaration = self.target(target)?;
        if let Some(configuration) = configuration {
            declaration.configuration = configuration;
        }

        let platform = self.platform(moniker)?;
        let modules = self.modules(moniker)?;

        Ok(ResolvedTarget::resolve(&platform, &declaration, &modules)?)
    }

    /// Resolve one target on one platform for several configurations in parallel
    pub fn resolve_all(
        &self,
        target: &str,
        moniker: &str,
        configurations: &[TargetConfiguration],
    ) -> ConfigResult<Vec<ConfigurationResolution>> {
        let declaration = self.target(target)?;
        let platform = self.platform(moniker)?;
        let modules = self.modules(moniker)?;

        Ok(resolve_configurations(
            &platform,
            &declaration,
            &modules,
            configurations,
        ))
    }

    fn check_platform_filters(&self) {
        for rule in &self.rules.modules {
            for moniker in &rule.platforms {
                if self.config.platform(moniker).is_none() {
                    warn!(
                        module = %rule.module.name,
                        platform = %moniker,
                        file = %rule.path.display(),
                        "module names an undeclared platform"
                    );
                }
            }
        }
    }
}
