//! Platform capability seam
//!
//! The resolver asks a [`PlatformCapabilities`] implementation for the tools
//! of every module exactly once, while the module is created, and stores the
//! returned handles without looking inside them. Toolchain rules (command
//! lines, SDK lookup) live behind these handles, outside this crate.
//!
//! [`GenericPlatform`] is a data-driven implementation whose tools are plain
//! descriptors. It is what the `keel` front-end builds from `[[platform]]`
//! tables.

use crate::module::ModuleLinkKind;
use crate::resolved_module::ModuleSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Opaque tool created by a platform for one module
pub trait Tool: fmt::Debug + Send + Sync {
    /// Tool identifier, e.g. `clang` or `link`
    fn id(&self) -> &str;

    /// Whether the tool applies to the module it was created for
    fn is_supported(&self) -> bool {
        true
    }
}

/// Tool producing sources consumed by the module build
pub trait CodeGenerator: Tool {
    fn descriptor(&self) -> &CodeGeneratorDescriptor;
}

pub type ToolHandle = Arc<dyn Tool>;
pub type CodeGeneratorHandle = Arc<dyn CodeGenerator>;

/// Factory for the tools of every resolved module of one platform
pub trait PlatformCapabilities: Send + Sync {
    /// Short platform name used in output directory names, e.g. `linux-x64`
    fn moniker(&self) -> &str;

    fn create_compiler(&self, module: &ModuleSettings) -> ToolHandle;

    fn create_linker(&self, module: &ModuleSettings) -> ToolHandle;

    /// Not every platform can assemble sources
    fn create_assembler(&self, _module: &ModuleSettings) -> Option<ToolHandle> {
        None
    }

    fn create_code_generators(&self, module: &ModuleSettings) -> Vec<CodeGeneratorHandle>;

    fn create_resource_compilers(&self, module: &ModuleSettings) -> Vec<ToolHandle>;
}

/// Static description of a code generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct CodeGeneratorDescriptor {
    pub id: String,
    /// Directory under the module's generated files directory receiving output
    #[serde(default)]
    pub output_directory: String,
    /// Generated files are compiled into the module
    #[serde(default)]
    pub requires_compilation: bool,
    /// Generated files are included by module sources
    #[serde(default)]
    pub requires_include: bool,
    /// Directory under the module sources holding generator inputs
    #[serde(default)]
    pub source_directory: Option<String>,
}

impl CodeGeneratorDescriptor {
    /// Create a new code generator descriptor
    pub fn new(id: impl Into<String>, output_directory: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            output_directory: output_directory.into(),
            requires_compilation: false,
            requires_include: false,
            source_directory: None,
        }
    }

    pub fn with_include(mut self) -> Self {
        self.requires_include = true;
        self
    }

    pub fn with_compilation(mut self) -> Self {
        self.requires_compilation = true;
        self
    }

    pub fn with_source_directory(mut self, directory: impl Into<String>) -> Self {
        self.source_directory = Some(directory.into());
        self
    }
}

/// Static description of a resource compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ResourceCompilerDescriptor {
    pub id: String,
    pub source_directory: String,
}

/// Tool handle backed by a plain identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTool {
    id: String,
    supported: bool,
}

impl NamedTool {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supported: true,
        }
    }

    pub fn unsupported(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supported: false,
        }
    }
}

impl Tool for NamedTool {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_supported(&self) -> bool {
        self.supported
    }
}

/// Code generator handle backed by its descriptor
#[derive(Debug, Clone)]
pub struct DescribedGenerator {
    descriptor: CodeGeneratorDescriptor,
    supported: bool,
}

impl Tool for DescribedGenerator {
    fn id(&self) -> &str {
        &self.descriptor.id
    }

    fn is_supported(&self) -> bool {
        self.supported
    }
}

impl CodeGenerator for DescribedGenerator {
    fn descriptor(&self) -> &CodeGeneratorDescriptor {
        &self.descriptor
    }
}

/// Platform whose tools are built from descriptors
///
/// A code generator or resource compiler naming a source directory is
/// supported only for modules whose sources contain that directory.
#[derive(Debug, Clone)]
pub struct GenericPlatform {
    moniker: String,
    compiler: String,
    linker: String,
    archiver: String,
    assembler: Option<String>,
    code_generators: Vec<CodeGeneratorDescriptor>,
    resource_compilers: Vec<ResourceCompilerDescriptor>,
}

impl GenericPlatform {
    /// Create a platform with `cc`, `ld` and `ar` tools
    pub fn new(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            compiler: "cc".to_string(),
            linker: "ld".to_string(),
            archiver: "ar".to_string(),
            assembler: None,
            code_generators: Vec::new(),
            resource_compilers: Vec::new(),
        }
    }

    pub fn with_compiler(mut self, id: impl Into<String>) -> Self {
        self.compiler = id.into();
        self
    }

    pub fn with_linker(mut self, id: impl Into<String>) -> Self {
        self.linker = id.into();
        self
    }

    pub fn with_archiver(mut self, id: impl Into<String>) -> Self {
        self.archiver = id.into();
        self
    }

    pub fn with_assembler(mut self, id: impl Into<String>) -> Self {
        self.assembler = Some(id.into());
        self
    }

    pub fn with_code_generator(mut self, descriptor: CodeGeneratorDescriptor) -> Self {
        self.code_generators.push(descriptor);
        self
    }

    pub fn with_resource_compiler(mut self, descriptor: ResourceCompilerDescriptor) -> Self {
        self.resource_compilers.push(descriptor);
        self
    }

    fn has_sources(module: &ModuleSettings, directory: &str) -> bool {
        module
            .source_directory
            .as_ref()
            .map(|root| root.join(directory))
            .is_some_and(|path: PathBuf| path.is_dir())
    }
}

impl PlatformCapabilities for GenericPlatform {
    fn moniker(&self) -> &str {
        &self.moniker
    }

    fn create_compiler(&self, _module: &ModuleSettings) -> ToolHandle {
        Arc::new(NamedTool::new(&self.compiler))
    }

    fn create_linker(&self, module: &ModuleSettings) -> ToolHandle {
        match module.link_kind {
            ModuleLinkKind::StaticLibrary => Arc::new(NamedTool::new(&self.archiver)),
            ModuleLinkKind::ImportedLibrary => Arc::new(NamedTool::unsupported(&self.linker)),
            _ => Arc::new(NamedTool::new(&self.linker)),
        }
    }

    fn create_assembler(&self, module: &ModuleSettings) -> Option<ToolHandle> {
        if !module.features.assembly {
            return None;
        }

        self.assembler
            .as_ref()
            .map(|id| Arc::new(NamedTool::new(id)) as ToolHandle)
    }

    fn create_code_generators(&self, module: &ModuleSettings) -> Vec<CodeGeneratorHandle> {
        self.code_generators
            .iter()
            .map(|descriptor| {
                let supported = match &descriptor.source_directory {
                    Some(directory) => Self::has_sources(module, directory),
                    None => true,
                };

                Arc::new(DescribedGenerator {
                    descriptor: descriptor.clone(),
                    supported,
                }) as CodeGeneratorHandle
            })
            .collect()
    }

    fn create_resource_compilers(&self, module: &ModuleSettings) -> Vec<ToolHandle> {
        self.resource_compilers
            .iter()
            .map(|descriptor| {
                let tool = if Self::has_sources(module, &descriptor.source_directory) {
                    NamedTool::new(&descriptor.id)
                } else {
                    NamedTool::unsupported(&descriptor.id)
                };
                Arc::new(tool) as ToolHandle
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleDeclaration, ModuleKind};
    use crate::target::TargetDeclaration;

    fn settings(module: &ModuleDeclaration) -> ModuleSettings {
        let target = TargetDeclaration::new("Sandbox");
        let directories = target.directories("test");
        ModuleSettings::resolve(module, &target, &directories).unwrap()
    }

    #[test]
    fn test_generic_platform_tools() {
        let platform = GenericPlatform::new("linux-x64")
            .with_compiler("clang")
            .with_linker("lld");
        let module = ModuleDeclaration::new("Game", ModuleKind::GameApplication);
        let settings = settings(&module);

        assert_eq!(platform.moniker(), "linux-x64");
        assert_eq!(platform.create_compiler(&settings).id(), "clang");
        assert_eq!(platform.create_linker(&settings).id(), "lld");
        assert!(platform.create_assembler(&settings).is_none());
    }

    #[test]
    fn test_static_libraries_use_archiver() {
        let platform = GenericPlatform::new("linux-x64").with_archiver("llvm-ar");
        let module = ModuleDeclaration::new("Core", ModuleKind::RuntimeLibrary)
            .with_link_kind(ModuleLinkKind::StaticLibrary);

        assert_eq!(platform.create_linker(&settings(&module)).id(), "llvm-ar");
    }

    #[test]
    fn test_generator_without_sources_is_unsupported() {
        let platform = GenericPlatform::new("linux-x64")
            .with_code_generator(CodeGeneratorDescriptor::new("reflect", "Reflection").with_include())
            .with_code_generator(
                CodeGeneratorDescriptor::new("shaders", "Shaders").with_source_directory("Shaders"),
            );
        let module = ModuleDeclaration::new("Core", ModuleKind::RuntimeLibrary);
        let generators = platform.create_code_generators(&settings(&module));

        assert_eq!(generators.len(), 2);
        assert!(generators[0].is_supported());
        assert!(generators[0].descriptor().requires_include);
        assert!(!generators[1].is_supported());
    }

    #[test]
    fn test_tools_with_sources_are_supported() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("Shaders")).unwrap();

        let platform = GenericPlatform::new("linux-x64")
            .with_code_generator(
                CodeGeneratorDescriptor::new("shaders", "Shaders").with_source_directory("Shaders"),
            )
            .with_resource_compiler(ResourceCompilerDescriptor {
                id: "icons".to_string(),
                source_directory: "Icons".to_string(),
            });
        let module = ModuleDeclaration::new("Render", ModuleKind::RuntimeLibrary)
            .with_source_directory(temp_dir.path());
        let settings = settings(&module);

        assert!(platform.create_code_generators(&settings)[0].is_supported());
        assert!(!platform.create_resource_compilers(&settings)[0].is_supported());
    }
}
