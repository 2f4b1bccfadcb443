//! Keel build graph resolution
//!
//! Turns declarative module and target descriptions into resolved module
//! graphs ready for build-file generators:
//! - Reference kinds and public/private/interface property lists
//! - Module and target declarations
//! - Platform capability seam for per-module tools
//! - Graph resolution: cycle detection, topological order, transitive closure
//! - Property propagation along references
//! - Strongly connected components and build levels
//! - Graphviz and JSON exporters
//! - Parallel resolution of several configurations

pub mod build_order;
pub mod configuration;
pub mod error;
pub mod export;
pub mod matrix;
pub mod module;
pub mod platform;
mod propagation;
pub mod reference;
pub mod resolved_module;
pub mod resolved_target;
pub mod target;
mod transitive;

// Re-export main types
pub use build_order::DependencyGraph;
pub use configuration::{OptimizationLevel, TargetConfiguration};
pub use error::{DependencySource, ResolveError, ResolveResult, SeedRole};
pub use export::{GraphvizDotExporter, JsonExporter, TargetExporter};
pub use matrix::{resolve_configurations, ConfigurationResolution};
pub use module::{
    ModuleDeclaration, ModuleFeatures, ModuleKind, ModuleLanguage, ModuleLinkKind, TestRun,
};
pub use platform::{
    CodeGenerator, CodeGeneratorDescriptor, CodeGeneratorHandle, GenericPlatform,
    PlatformCapabilities, ResourceCompilerDescriptor, Tool, ToolHandle,
};
pub use reference::{ReferenceKind, Scoped};
pub use resolved_module::{ModuleId, ModuleSettings, Properties, ResolvedFeatures, ResolvedModule};
pub use resolved_target::{Edge, ResolvedTarget};
pub use target::{
    TargetDeclaration, TargetDirectories, TargetFeatures, TargetKind, TargetLinkKind,
};
