/// Target declarations and their output directories
use crate::configuration::TargetConfiguration;
use crate::error::{ResolveError, ResolveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Kind of build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Game,
    Editor,
    Client,
    Server,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Game => write!(f, "game"),
            Self::Editor => write!(f, "editor"),
            Self::Client => write!(f, "client"),
            Self::Server => write!(f, "server"),
        }
    }
}

/// How the modules of a target are linked together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLinkKind {
    /// Every library is its own dynamic library
    #[default]
    Modular,
    /// Libraries are linked statically into the applications
    Monolithic,
}

impl FromStr for TargetLinkKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> ResolveResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "modular" => Ok(Self::Modular),
            "monolithic" => Ok(Self::Monolithic),
            _ => Err(ResolveError::unsupported("link kind", s)),
        }
    }
}

impl std::fmt::Display for TargetLinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Modular => write!(f, "modular"),
            Self::Monolithic => write!(f, "monolithic"),
        }
    }
}

/// Target-wide feature defaults
///
/// Modules may override most of these, see [`crate::ModuleFeatures`].
/// Instruction set and incremental linking choices belong to the target only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TargetFeatures {
    pub unity: bool,
    /// Only honoured for monolithic targets
    pub static_runtime: bool,
    pub debug_info: bool,
    pub rtti: bool,
    pub exceptions: bool,
    pub edit_and_continue: bool,
    pub incremental_linking: bool,
    pub link_time_code_generation: bool,
    pub avx: bool,
    pub avx2: bool,
    pub neon: bool,
    pub symbols_collection: bool,
    pub address_sanitizer: bool,
    pub thread_sanitizer: bool,
    pub memory_sanitizer: bool,
    pub undefined_behavior_sanitizer: bool,
    pub data_flow_sanitizer: bool,
    pub leak_sanitizer: bool,
}

impl Default for TargetFeatures {
    fn default() -> Self {
        Self {
            unity: true,
            static_runtime: false,
            debug_info: true,
            rtti: true,
            exceptions: true,
            edit_and_continue: false,
            incremental_linking: false,
            link_time_code_generation: true,
            avx: true,
            avx2: false,
            neon: true,
            symbols_collection: true,
            address_sanitizer: true,
            thread_sanitizer: true,
            memory_sanitizer: true,
            undefined_behavior_sanitizer: true,
            data_flow_sanitizer: true,
            leak_sanitizer: true,
        }
    }
}

/// Author-supplied description of a build target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct TargetDeclaration {
    pub name: String,
    #[serde(default)]
    pub kind: TargetKind,
    #[serde(default)]
    pub link_kind: TargetLinkKind,
    #[serde(default)]
    pub configuration: TargetConfiguration,
    /// Module launched by the target, if any
    #[serde(default)]
    pub startup_module: Option<String>,
    /// Modules built regardless of reachability
    #[serde(default)]
    pub required_modules: Vec<String>,
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub include_paths: Vec<String>,
    #[serde(default)]
    pub library_paths: Vec<String>,
    #[serde(default)]
    pub features: TargetFeatures,
    /// Root of generated, intermediate and binary outputs
    #[serde(default = "TargetDeclaration::default_output_directory")]
    pub output_directory: PathBuf,
}

impl TargetDeclaration {
    /// Create a new modular target in the default configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::default(),
            link_kind: TargetLinkKind::default(),
            configuration: TargetConfiguration::default(),
            startup_module: None,
            required_modules: Vec::new(),
            defines: Vec::new(),
            include_paths: Vec::new(),
            library_paths: Vec::new(),
            features: TargetFeatures::default(),
            output_directory: Self::default_output_directory(),
        }
    }

    fn default_output_directory() -> PathBuf {
        PathBuf::from("Output")
    }

    pub fn with_startup_module(mut self, module: impl Into<String>) -> Self {
        self.startup_module = Some(module.into());
        self
    }

    pub fn with_required_modules(mut self, modules: &[&str]) -> Self {
        self.required_modules
            .extend(modules.iter().map(|m| m.to_string()));
        self
    }

    pub fn with_link_kind(mut self, link_kind: TargetLinkKind) -> Self {
        self.link_kind = link_kind;
        self
    }

    pub fn with_configuration(mut self, configuration: TargetConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_defines(mut self, defines: &[&str]) -> Self {
        self.defines.extend(defines.iter().map(|d| d.to_string()));
        self
    }

    pub fn with_features(mut self, features: TargetFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = directory.into();
        self
    }

    /// Output directories for one platform in this target's configuration
    pub fn directories(&self, moniker: &str) -> TargetDirectories {
        TargetDirectories::new(&self.output_directory, &self.name, moniker, self.configuration)
    }
}

/// Per (target, platform, configuration) output directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDirectories {
    pub generated: PathBuf,
    pub intermediate: PathBuf,
    pub binaries: PathBuf,
}

impl TargetDirectories {
    /// Lay out `<output>/<Generated|Intermediate|Binaries>/<target>-<moniker>/<configuration>`
    pub fn new(
        output: &Path,
        target: &str,
        moniker: &str,
        configuration: TargetConfiguration,
    ) -> Self {
        let leaf = |root: &str| {
            output
                .join(root)
                .join(format!("{}-{}", target, moniker))
                .join(configuration.name())
        };

        Self {
            generated: leaf("Generated"),
            intermediate: leaf("Intermediate"),
            binaries: leaf("Binaries"),
        }
    }

    /// Generated files directory of one module
    pub fn module_generated(&self, module: &str) -> PathBuf {
        self.intermediate.join(module).join("Generated")
    }
}
