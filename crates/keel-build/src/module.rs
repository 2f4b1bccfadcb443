//! Module declarations
//!
//! A [`ModuleDeclaration`] is the author-supplied description of one
//! compilation unit. It is plain data: the graph resolver reads it once and
//! never mutates it.

use crate::error::{ResolveError, ResolveResult};
use crate::reference::Scoped;
use crate::target::TargetLinkKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Kind of module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    GameApplication,
    GameLibrary,
    EditorApplication,
    EditorLibrary,
    TestApplication,
    BenchmarkApplication,
    ConsoleApplication,
    RuntimeLibrary,
    ThirdPartyLibrary,
}

impl ModuleKind {
    /// Game code, built without optimizations in `GameDebug`
    pub fn is_game(&self) -> bool {
        matches!(self, Self::GameApplication | Self::GameLibrary)
    }

    /// Engine and editor code, built without optimizations in `EngineDebug`
    pub fn is_engine(&self) -> bool {
        matches!(
            self,
            Self::RuntimeLibrary | Self::EditorLibrary | Self::EditorApplication
        )
    }

    pub fn is_third_party(&self) -> bool {
        matches!(self, Self::ThirdPartyLibrary)
    }

    /// Link kind used when the declaration does not override it
    pub fn default_link_kind(&self, target: TargetLinkKind) -> ModuleLinkKind {
        match self {
            Self::GameApplication | Self::EditorApplication => ModuleLinkKind::Application,
            Self::TestApplication | Self::BenchmarkApplication | Self::ConsoleApplication => {
                ModuleLinkKind::ConsoleApplication
            }
            Self::GameLibrary
            | Self::EditorLibrary
            | Self::RuntimeLibrary
            | Self::ThirdPartyLibrary => match target {
                TargetLinkKind::Modular => ModuleLinkKind::DynamicLibrary,
                TargetLinkKind::Monolithic => ModuleLinkKind::StaticLibrary,
            },
        }
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GameApplication => write!(f, "game-application"),
            Self::GameLibrary => write!(f, "game-library"),
            Self::EditorApplication => write!(f, "editor-application"),
            Self::EditorLibrary => write!(f, "editor-library"),
            Self::TestApplication => write!(f, "test-application"),
            Self::BenchmarkApplication => write!(f, "benchmark-application"),
            Self::ConsoleApplication => write!(f, "console-application"),
            Self::RuntimeLibrary => write!(f, "runtime-library"),
            Self::ThirdPartyLibrary => write!(f, "third-party-library"),
        }
    }
}

/// How a module is linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleLinkKind {
    /// Windowed executable
    Application,
    /// Console executable
    ConsoleApplication,
    StaticLibrary,
    DynamicLibrary,
    /// Prebuilt library, nothing is compiled
    ImportedLibrary,
}

impl ModuleLinkKind {
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application | Self::ConsoleApplication)
    }

    /// Whether consumers must link everything this module links
    ///
    /// Neither static nor imported libraries produce a loadable artifact that
    /// carries its own link dependencies.
    pub fn forwards_link_dependencies(&self) -> bool {
        matches!(self, Self::StaticLibrary | Self::ImportedLibrary)
    }
}

impl std::fmt::Display for ModuleLinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Application => write!(f, "application"),
            Self::ConsoleApplication => write!(f, "console-application"),
            Self::StaticLibrary => write!(f, "static-library"),
            Self::DynamicLibrary => write!(f, "dynamic-library"),
            Self::ImportedLibrary => write!(f, "imported-library"),
        }
    }
}

/// Source language of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleLanguage {
    #[default]
    Default,
    C,
    Cxx,
}

impl ModuleLanguage {
    /// Concrete language; `Default` means C++
    pub fn resolve(self) -> ModuleLanguage {
        match self {
            Self::Default => Self::Cxx,
            other => other,
        }
    }
}

impl FromStr for ModuleLanguage {
    type Err = ResolveError;

    fn from_str(s: &str) -> ResolveResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "c" => Ok(Self::C),
            "cxx" | "c++" | "cpp" => Ok(Self::Cxx),
            _ => Err(ResolveError::unsupported("language", s)),
        }
    }
}

impl std::fmt::Display for ModuleLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::C => write!(f, "c"),
            Self::Cxx => write!(f, "c++"),
        }
    }
}

/// Per-module feature overrides; `None` falls back to the target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ModuleFeatures {
    pub unity: Option<bool>,
    pub debug_info: Option<bool>,
    pub rtti: Option<bool>,
    pub exceptions: Option<bool>,
    pub address_sanitizer: Option<bool>,
    pub thread_sanitizer: Option<bool>,
    pub memory_sanitizer: Option<bool>,
    pub undefined_behavior_sanitizer: Option<bool>,
    pub data_flow_sanitizer: Option<bool>,
    pub leak_sanitizer: Option<bool>,
    pub edit_and_continue: Option<bool>,
    pub symbols_collection: Option<bool>,
}

/// A test executable invocation declared by an application module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct TestRun {
    pub name: String,
    #[serde(default = "TestRun::default_timeout", with = "timeout_secs")]
    pub timeout: Duration,
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl TestRun {
    /// Create a test run with the default five minute timeout
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout: Self::default_timeout(),
            working_directory: None,
            arguments: Vec::new(),
        }
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(5 * 60)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }
}

mod timeout_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Author-supplied description of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ModuleDeclaration {
    /// Module name, unique within a registry
    pub name: String,
    pub kind: ModuleKind,
    /// Explicit link kind; derived from `kind` and the target when absent
    #[serde(default)]
    pub link_kind: Option<ModuleLinkKind>,
    #[serde(default)]
    pub language: ModuleLanguage,
    #[serde(default)]
    pub dependencies: Scoped,
    /// Modules loaded at runtime, never linked
    #[serde(default)]
    pub runtime_dependencies: Vec<String>,
    #[serde(default)]
    pub defines: Scoped,
    #[serde(default)]
    pub include_paths: Scoped,
    #[serde(default)]
    pub library_paths: Scoped,
    #[serde(default)]
    pub libraries: Scoped,
    #[serde(default)]
    pub features: ModuleFeatures,
    #[serde(default)]
    pub enable_assembly: bool,
    /// Overrides the `<NAME>_EXPORTS` define
    #[serde(default)]
    pub export_define: Option<String>,
    /// Directory holding the module sources
    #[serde(default)]
    pub source_directory: Option<PathBuf>,
    /// Sources live outside the project tree
    #[serde(default)]
    pub external_source: bool,
    #[serde(default)]
    pub test_runs: Vec<TestRun>,
}

impl ModuleDeclaration {
    /// Create a new module declaration
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            link_kind: None,
            language: ModuleLanguage::Default,
            dependencies: Scoped::new(),
            runtime_dependencies: Vec::new(),
            defines: Scoped::new(),
            include_paths: Scoped::new(),
            library_paths: Scoped::new(),
            libraries: Scoped::new(),
            features: ModuleFeatures::default(),
            enable_assembly: false,
            export_define: None,
            source_directory: None,
            external_source: false,
            test_runs: Vec::new(),
        }
    }

    pub fn with_public_dependencies(mut self, names: &[&str]) -> Self {
        self.dependencies.public.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_private_dependencies(mut self, names: &[&str]) -> Self {
        self.dependencies.private.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_interface_dependencies(mut self, names: &[&str]) -> Self {
        self.dependencies.interface.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_runtime_dependencies(mut self, names: &[&str]) -> Self {
        self.runtime_dependencies.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Set public, private and interface defines at once
    pub fn with_defines(mut self, public: &[&str], private: &[&str], interface: &[&str]) -> Self {
        self.defines.public.extend(public.iter().map(|d| d.to_string()));
        self.defines.private.extend(private.iter().map(|d| d.to_string()));
        self.defines.interface.extend(interface.iter().map(|d| d.to_string()));
        self
    }

    pub fn with_libraries(mut self, libraries: Scoped) -> Self {
        self.libraries = libraries;
        self
    }

    pub fn with_library_paths(mut self, paths: Scoped) -> Self {
        self.library_paths = paths;
        self
    }

    pub fn with_include_paths(mut self, paths: Scoped) -> Self {
        self.include_paths = paths;
        self
    }

    pub fn with_link_kind(mut self, link_kind: ModuleLinkKind) -> Self {
        self.link_kind = Some(link_kind);
        self
    }

    pub fn with_language(mut self, language: ModuleLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn with_features(mut self, features: ModuleFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_source_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.source_directory = Some(directory.into());
        self
    }

    pub fn with_test_run(mut self, run: TestRun) -> Self {
        self.test_runs.push(run);
        self
    }

    /// Effective link kind within a target of the given link kind
    pub fn link_kind_for(&self, target: TargetLinkKind) -> ModuleLinkKind {
        self.link_kind
            .unwrap_or_else(|| self.kind.default_link_kind(target))
    }

    /// Name of the symbol export define, `<NAME>_EXPORTS` by default
    pub fn export_define(&self) -> String {
        self.export_define
            .clone()
            .unwrap_or_else(|| format!("{}_EXPORTS", self.name.to_uppercase()))
    }

    /// Validate the declaration on its own, without any graph context
    pub fn validate(&self) -> ResolveResult<()> {
        if self.name.is_empty() {
            return Err(ResolveError::invalid_module(
                &self.name,
                "module name cannot be empty",
            ));
        }

        for (kind, name) in self.dependencies.iter() {
            if name.is_empty() {
                return Err(ResolveError::invalid_module(
                    &self.name,
                    format!("empty {} dependency name", kind),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_link_kinds() {
        use ModuleKind::*;

        assert_eq!(
            GameApplication.default_link_kind(TargetLinkKind::Modular),
            ModuleLinkKind::Application
        );
        assert_eq!(
            TestApplication.default_link_kind(TargetLinkKind::Monolithic),
            ModuleLinkKind::ConsoleApplication
        );
        assert_eq!(
            RuntimeLibrary.default_link_kind(TargetLinkKind::Modular),
            ModuleLinkKind::DynamicLibrary
        );
        assert_eq!(
            ThirdPartyLibrary.default_link_kind(TargetLinkKind::Monolithic),
            ModuleLinkKind::StaticLibrary
        );
    }

    #[test]
    fn test_link_kind_override() {
        let module = ModuleDeclaration::new("zlib", ModuleKind::ThirdPartyLibrary)
            .with_link_kind(ModuleLinkKind::ImportedLibrary);
        assert_eq!(
            module.link_kind_for(TargetLinkKind::Modular),
            ModuleLinkKind::ImportedLibrary
        );
        assert!(module
            .link_kind_for(TargetLinkKind::Monolithic)
            .forwards_link_dependencies());
    }

    #[test]
    fn test_export_define() {
        let module = ModuleDeclaration::new("Core", ModuleKind::RuntimeLibrary);
        assert_eq!(module.export_define(), "CORE_EXPORTS");

        let mut custom = module.clone();
        custom.export_define = Some("CORE_API_EXPORTS".to_string());
        assert_eq!(custom.export_define(), "CORE_API_EXPORTS");
    }

    #[test]
    fn test_language() {
        assert_eq!(ModuleLanguage::Default.resolve(), ModuleLanguage::Cxx);
        assert_eq!(ModuleLanguage::C.resolve(), ModuleLanguage::C);
        assert_eq!("C++".parse::<ModuleLanguage>().unwrap(), ModuleLanguage::Cxx);
        assert!("rust".parse::<ModuleLanguage>().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_dependency() {
        let mut module = ModuleDeclaration::new("app", ModuleKind::ConsoleApplication);
        assert!(module.validate().is_ok());

        module.dependencies.private.push(String::new());
        assert!(matches!(
            module.validate(),
            Err(ResolveError::InvalidModule { .. })
        ));
    }

    #[test]
    fn test_test_run_defaults() {
        let run = TestRun::new("unit");
        assert_eq!(run.timeout, Duration::from_secs(300));
        assert!(run.arguments.is_empty());
    }
}
