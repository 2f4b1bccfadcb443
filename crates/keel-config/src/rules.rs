//! Module and target rule files
//!
//! Every `*.module.toml` under the source directory declares one module in a
//! `[module]` table, optionally limited to some platforms:
//!
//! ```toml
//! platforms = ["linux", "windows"]
//!
//! [module]
//! name = "Core"
//! kind = "runtime-library"
//! dependencies = { public = ["Math"] }
//! ```
//!
//! Every `*.target.toml` declares one target in a `[target]` table.

use crate::{ConfigError, ConfigResult};
use keel_build::{ModuleDeclaration, TargetDeclaration};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const MODULE_SUFFIX: &str = ".module.toml";
const TARGET_SUFFIX: &str = ".target.toml";

/// Include directories picked up from a module's sources when present
const PUBLIC_INCLUDE_DIRECTORY: &str = "Public";
const PRIVATE_INCLUDE_DIRECTORY: &str = "Private";

/// Contents of a `*.module.toml` file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleRule {
    /// Platforms the module supports; all of them when empty
    #[serde(default)]
    pub platforms: Vec<String>,

    pub module: ModuleDeclaration,

    /// File the rule was read from
    #[serde(skip)]
    pub path: PathBuf,
}

impl ModuleRule {
    /// Whether the module is built for `moniker`
    pub fn supports(&self, moniker: &str) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|p| p == moniker)
    }

    fn load(path: &Path) -> ConfigResult<Self> {
        let mut rule: Self = crate::read_toml(path)?;
        rule.path = path.to_path_buf();

        let directory = path.parent().unwrap_or(Path::new("."));
        let sources = match rule.module.source_directory.take() {
            Some(relative) => directory.join(relative),
            None => directory.to_path_buf(),
        };

        let include_paths = &mut rule.module.include_paths;
        let public = sources.join(PUBLIC_INCLUDE_DIRECTORY);
        if public.is_dir() {
            push_unique(&mut include_paths.public, public.display().to_string());
        }
        let private = sources.join(PRIVATE_INCLUDE_DIRECTORY);
        if private.is_dir() {
            push_unique(&mut include_paths.private, private.display().to_string());
        }

        rule.module.source_directory = Some(sources);
        Ok(rule)
    }
}

/// Contents of a `*.target.toml` file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TargetRule {
    pub target: TargetDeclaration,

    #[serde(skip)]
    pub path: PathBuf,
}

impl TargetRule {
    fn load(path: &Path) -> ConfigResult<Self> {
        let mut rule: Self = crate::read_toml(path)?;
        rule.path = path.to_path_buf();
        Ok(rule)
    }
}

/// Every rule file found under a source directory
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub modules: Vec<ModuleRule>,
    pub targets: Vec<TargetRule>,
}

impl RuleSet {
    /// Load every rule file under `source_dir`, in file name order
    pub fn discover(source_dir: &Path) -> ConfigResult<Self> {
        if !source_dir.is_dir() {
            return Err(ConfigError::Validation(format!(
                "source directory {} does not exist",
                source_dir.display()
            )));
        }

        let mut rules = Self::default();

        for entry in WalkDir::new(source_dir)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(%error, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if file_name.ends_with(MODULE_SUFFIX) {
                rules.modules.push(ModuleRule::load(entry.path())?);
            } else if file_name.ends_with(TARGET_SUFFIX) {
                rules.targets.push(TargetRule::load(entry.path())?);
            }
        }

        rules.validate()?;

        debug!(
            modules = rules.modules.len(),
            targets = rules.targets.len(),
            source = %source_dir.display(),
            "discovered rule files"
        );

        Ok(rules)
    }

    fn validate(&self) -> ConfigResult<()> {
        let mut names = HashSet::new();
        for rule in &self.targets {
            if !names.insert(rule.target.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "target '{}' is declared more than once ({})",
                    rule.target.name,
                    rule.path.display()
                )));
            }
        }
        Ok(())
    }

    /// Declarations of the modules supporting `moniker`
    pub fn modules_for(&self, moniker: &str) -> Vec<ModuleDeclaration> {
        self.modules
            .iter()
            .filter(|rule| rule.supports(moniker))
            .map(|rule| rule.module.clone())
            .collect()
    }

    pub fn target(&self, name: &str) -> Option<&TargetDeclaration> {
        self.targets
            .iter()
            .map(|rule| &rule.target)
            .find(|target| target.name == name)
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|rule| rule.target.name.as_str()).collect()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}
