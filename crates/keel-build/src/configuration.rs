//! Build configurations and the optimization levels they imply
//!
//! A configuration is chosen per resolution. Together with the module kind it
//! decides the optimization level of every module, and it gates sanitizers:
//! the debug-like configurations build against the debug runtime, where no
//! sanitizer is allowed regardless of module or target preferences.

use crate::error::{ResolveError, ResolveResult};
use crate::module::ModuleKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Target configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetConfiguration {
    /// Game and engine modules without optimizations
    Debug,
    /// Game modules without optimizations, engine modules optimized for debugging
    GameDebug,
    /// Engine modules without optimizations, game modules optimized for debugging
    EngineDebug,
    /// Everything optimized in a debuggable way
    Development,
    /// Optimized, with profiling support
    Testing,
    /// Fully optimized
    Shipping,
}

impl TargetConfiguration {
    /// All configurations, in the order they are usually resolved
    pub const ALL: [TargetConfiguration; 6] = [
        Self::Debug,
        Self::GameDebug,
        Self::EngineDebug,
        Self::Development,
        Self::Testing,
        Self::Shipping,
    ];

    /// Get configuration name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::GameDebug => "GameDebug",
            Self::EngineDebug => "EngineDebug",
            Self::Development => "Development",
            Self::Testing => "Testing",
            Self::Shipping => "Shipping",
        }
    }

    /// Whether modules are built against the debug runtime
    pub fn is_debug(&self) -> bool {
        matches!(self, Self::Debug | Self::GameDebug | Self::EngineDebug)
    }

    /// Sanitizers are only allowed outside the debug-like configurations
    pub fn allows_sanitizers(&self) -> bool {
        !self.is_debug()
    }

    /// Optimization level of a module of the given kind
    pub fn optimization_level(&self, kind: ModuleKind) -> OptimizationLevel {
        match self {
            Self::Debug => OptimizationLevel::Debug,
            Self::GameDebug => {
                if kind.is_game() {
                    OptimizationLevel::Debug
                } else {
                    OptimizationLevel::Development
                }
            }
            Self::EngineDebug => {
                if kind.is_engine() {
                    OptimizationLevel::Debug
                } else {
                    OptimizationLevel::Development
                }
            }
            Self::Development => OptimizationLevel::Development,
            Self::Testing => OptimizationLevel::Optimized,
            Self::Shipping => OptimizationLevel::Full,
        }
    }
}

#[allow(clippy::derivable_impls)]
impl Default for TargetConfiguration {
    fn default() -> Self {
        Self::Development
    }
}

impl FromStr for TargetConfiguration {
    type Err = ResolveError;

    fn from_str(s: &str) -> ResolveResult<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ResolveError::unsupported("configuration", s))
    }
}

impl std::fmt::Display for TargetConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Optimization level of a resolved module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// No optimizations
    Debug,
    /// Some optimizations, still debuggable
    Development,
    /// Release optimizations
    Optimized,
    /// Everything available
    Full,
}

impl OptimizationLevel {
    /// Whether release-grade optimizations are enabled
    pub fn is_optimized(&self) -> bool {
        matches!(self, Self::Optimized | Self::Full)
    }
}

impl std::fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Development => write!(f, "development"),
            Self::Optimized => write!(f, "optimized"),
            Self::Full => write!(f, "full"),
        }
    }
}
