/// Resolution error types
use crate::reference::ReferenceKind;
use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Which declaration list a missing dependency name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencySource {
    /// Public, private or interface dependency list
    Reference(ReferenceKind),
    /// Runtime dependency list
    Runtime,
}

impl std::fmt::Display for DependencySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference(kind) => write!(f, "{}", kind),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Role of a seed module of the transitive closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedRole {
    Startup,
    Required,
}

impl std::fmt::Display for SeedRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Required => write!(f, "required"),
        }
    }
}

/// Every variant aborts the resolution of one (target, platform, configuration)
/// triple. No partial graph is ever returned alongside an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Module '{module}' is declared more than once")]
    DuplicateModuleName { module: String },

    #[error("Module '{module}' has {kind} dependency on '{dependency}', but it is not found")]
    DependencyNotFound {
        module: String,
        dependency: String,
        kind: DependencySource,
    },

    #[error("Module '{module}' already has a reference to '{target}'")]
    DuplicateReference { module: String, target: String },

    #[error("Circular dependency detected: {}", .trace.join(" -> "))]
    CircularDependency { trace: Vec<String> },

    #[error("The {role} module '{module}' is not defined")]
    UnresolvedSeed { module: String, role: SeedRole },

    #[error("Unsupported {what}: '{value}'")]
    UnsupportedConfiguration { what: &'static str, value: String },

    #[error("Invalid module '{module}': {reason}")]
    InvalidModule { module: String, reason: String },
}

impl ResolveError {
    /// Create a dependency not found error
    pub fn dependency_not_found(
        module: impl Into<String>,
        dependency: impl Into<String>,
        kind: DependencySource,
    ) -> Self {
        Self::DependencyNotFound {
            module: module.into(),
            dependency: dependency.into(),
            kind,
        }
    }

    /// Create a duplicate reference error
    pub fn duplicate_reference(module: impl Into<String>, target: impl Into<String>) -> Self {
        Self::DuplicateReference {
            module: module.into(),
            target: target.into(),
        }
    }

    /// Create an unsupported configuration error
    pub fn unsupported(what: &'static str, value: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            what,
            value: value.into(),
        }
    }

    /// Create an invalid module error
    pub fn invalid_module(module: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidModule {
            module: module.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error reports a dependency cycle
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// Module names forming the reported cycle, first and last being equal
    pub fn cycle_trace(&self) -> Option<&[String]> {
        match self {
            Self::CircularDependency { trace } => Some(trace),
            _ => None,
        }
    }
}
