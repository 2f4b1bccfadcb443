//! Resolved modules
//!
//! A [`ResolvedModule`] is one node of a resolved target. It is created from
//! a declaration plus target context, receives its own properties in
//! [`ResolvedModule::import_properties`], and is then filled with edges and
//! propagated properties by the resolver. Nodes refer to each other only
//! through [`ModuleId`], an index into the owning target's node list.

use crate::configuration::{OptimizationLevel, TargetConfiguration};
use crate::error::{DependencySource, ResolveError, ResolveResult};
use crate::module::{ModuleDeclaration, ModuleKind, ModuleLanguage, ModuleLinkKind};
use crate::platform::{CodeGeneratorHandle, PlatformCapabilities, ToolHandle};
use crate::reference::{ReferenceKind, Scoped};
use crate::target::{TargetDeclaration, TargetDirectories, TargetLinkKind};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::path::PathBuf;

/// Index of a module within its resolved target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    /// Position in [`crate::ResolvedTarget::nodes`]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Effective feature switches of a module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedFeatures {
    pub unity: bool,
    pub static_runtime: bool,
    pub assembly: bool,
    pub debug_info: bool,
    pub rtti: bool,
    pub exceptions: bool,
    pub address_sanitizer: bool,
    pub thread_sanitizer: bool,
    pub memory_sanitizer: bool,
    pub undefined_behavior_sanitizer: bool,
    pub data_flow_sanitizer: bool,
    pub leak_sanitizer: bool,
    pub edit_and_continue: bool,
    pub incremental_linking: bool,
    pub link_time_code_generation: bool,
    pub symbols_collection: bool,
    pub avx: bool,
    pub avx2: bool,
    pub neon: bool,
}

impl ResolvedFeatures {
    fn resolve(
        module: &ModuleDeclaration,
        target: &TargetDeclaration,
        language: ModuleLanguage,
        optimization: OptimizationLevel,
    ) -> Self {
        let overrides = &module.features;
        let defaults = &target.features;
        let sanitizers = target.configuration.allows_sanitizers();
        let sanitizer = |value: Option<bool>, default: bool| sanitizers && value.unwrap_or(default);

        Self {
            // Many C libraries break when merged into unity files.
            unity: overrides.unity.unwrap_or(defaults.unity) && language != ModuleLanguage::C,
            static_runtime: defaults.static_runtime
                && target.link_kind == TargetLinkKind::Monolithic,
            assembly: module.enable_assembly,
            debug_info: overrides.debug_info.unwrap_or(defaults.debug_info),
            rtti: overrides.rtti.unwrap_or(defaults.rtti),
            exceptions: overrides.exceptions.unwrap_or(defaults.exceptions),
            address_sanitizer: sanitizer(overrides.address_sanitizer, defaults.address_sanitizer),
            thread_sanitizer: sanitizer(overrides.thread_sanitizer, defaults.thread_sanitizer),
            memory_sanitizer: sanitizer(overrides.memory_sanitizer, defaults.memory_sanitizer),
            undefined_behavior_sanitizer: sanitizer(
                overrides.undefined_behavior_sanitizer,
                defaults.undefined_behavior_sanitizer,
            ),
            data_flow_sanitizer: sanitizer(
                overrides.data_flow_sanitizer,
                defaults.data_flow_sanitizer,
            ),
            leak_sanitizer: sanitizer(overrides.leak_sanitizer, defaults.leak_sanitizer),
            edit_and_continue: overrides
                .edit_and_continue
                .unwrap_or(defaults.edit_and_continue),
            incremental_linking: defaults.incremental_linking,
            link_time_code_generation: defaults.link_time_code_generation
                && optimization.is_optimized(),
            symbols_collection: overrides
                .symbols_collection
                .unwrap_or(defaults.symbols_collection)
                && optimization == OptimizationLevel::Full,
            avx: defaults.avx,
            avx2: defaults.avx2,
            neon: defaults.neon,
        }
    }
}

/// Scalar settings of a module, computed before any tool is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSettings {
    pub name: String,
    pub kind: ModuleKind,
    pub link_kind: ModuleLinkKind,
    pub language: ModuleLanguage,
    pub configuration: TargetConfiguration,
    pub optimization_level: OptimizationLevel,
    pub features: ResolvedFeatures,
    pub export_define: String,
    pub external_source: bool,
    pub source_directory: Option<PathBuf>,
    pub generated_directory: PathBuf,
}

impl ModuleSettings {
    /// Compute the settings of `module` within `target`
    pub fn resolve(
        module: &ModuleDeclaration,
        target: &TargetDeclaration,
        directories: &TargetDirectories,
    ) -> ResolveResult<Self> {
        module.validate()?;

        let link_kind = module.link_kind_for(target.link_kind);

        if !module.test_runs.is_empty() && !link_kind.is_application() {
            return Err(ResolveError::invalid_module(
                &module.name,
                "test runs are only allowed on applications",
            ));
        }

        let language = module.language.resolve();
        let optimization_level = target.configuration.optimization_level(module.kind);

        Ok(Self {
            name: module.name.clone(),
            kind: module.kind,
            link_kind,
            language,
            configuration: target.configuration,
            optimization_level,
            features: ResolvedFeatures::resolve(module, target, language, optimization_level),
            export_define: module.export_define(),
            external_source: module.external_source,
            source_directory: module.source_directory.clone(),
            generated_directory: directories.module_generated(&module.name),
        })
    }
}

/// One view of the propagated properties of a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub defines: IndexSet<String>,
    pub libraries: IndexSet<String>,
    pub include_paths: IndexSet<String>,
    pub library_paths: IndexSet<String>,
    pub dependencies: IndexSet<ModuleId>,
}

impl Properties {
    /// Add every entry of `other`
    pub fn extend_from(&mut self, other: &Properties) {
        self.defines.extend(other.defines.iter().cloned());
        self.libraries.extend(other.libraries.iter().cloned());
        self.include_paths.extend(other.include_paths.iter().cloned());
        self.library_paths.extend(other.library_paths.iter().cloned());
        self.dependencies.extend(other.dependencies.iter().copied());
    }

    /// Add what is needed to link against a module with these properties
    pub fn extend_link_inputs_from(&mut self, other: &Properties) {
        self.libraries.extend(other.libraries.iter().cloned());
        self.library_paths.extend(other.library_paths.iter().cloned());
        self.dependencies.extend(other.dependencies.iter().copied());
    }
}

/// Node of a resolved target
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub(crate) id: ModuleId,
    pub(crate) declaration: ModuleDeclaration,
    pub(crate) settings: ModuleSettings,

    pub(crate) compiler: ToolHandle,
    pub(crate) linker: ToolHandle,
    pub(crate) assembler: Option<ToolHandle>,
    pub(crate) code_generators: Vec<CodeGeneratorHandle>,
    pub(crate) resource_compilers: Vec<ToolHandle>,

    pub(crate) outgoing: IndexMap<ModuleId, ReferenceKind>,
    pub(crate) incoming: IndexSet<ModuleId>,

    pub(crate) private: Properties,
    pub(crate) interface: Properties,
    pub(crate) runtime_dependencies: IndexSet<ModuleId>,
}

impl ResolvedModule {
    /// Create an unconnected node and request its tools from the platform
    pub(crate) fn new(
        id: ModuleId,
        declaration: &ModuleDeclaration,
        target: &TargetDeclaration,
        directories: &TargetDirectories,
        platform: &dyn PlatformCapabilities,
    ) -> ResolveResult<Self> {
        let settings = ModuleSettings::resolve(declaration, target, directories)?;

        Ok(Self {
            id,
            declaration: declaration.clone(),
            compiler: platform.create_compiler(&settings),
            linker: platform.create_linker(&settings),
            assembler: platform.create_assembler(&settings),
            code_generators: platform.create_code_generators(&settings),
            resource_compilers: platform.create_resource_compilers(&settings),
            settings,
            outgoing: IndexMap::new(),
            incoming: IndexSet::new(),
            private: Properties::default(),
            interface: Properties::default(),
            runtime_dependencies: IndexSet::new(),
        })
    }

    /// Import the module's own properties and the target-wide ones
    pub(crate) fn import_properties(
        &mut self,
        target: &TargetDeclaration,
        directories: &TargetDirectories,
        lookup: &IndexMap<String, ModuleId>,
    ) -> ResolveResult<()> {
        let generated = self.settings.generated_directory.clone();

        self.private
            .include_paths
            .insert(generated.display().to_string());
        self.private
            .include_paths
            .insert(directories.generated.display().to_string());

        for generator in &self.code_generators {
            let descriptor = generator.descriptor();
            if descriptor.requires_include && generator.is_supported() {
                let path = generated
                    .join(&descriptor.output_directory)
                    .display()
                    .to_string();
                self.private.include_paths.insert(path.clone());
                self.interface.include_paths.insert(path);
            }
        }

        let declaration = &self.declaration;
        import_scoped(&declaration.defines, &mut self.private.defines, &mut self.interface.defines);
        import_scoped(
            &declaration.libraries,
            &mut self.private.libraries,
            &mut self.interface.libraries,
        );
        import_scoped(
            &declaration.include_paths,
            &mut self.private.include_paths,
            &mut self.interface.include_paths,
        );
        import_scoped(
            &declaration.library_paths,
            &mut self.private.library_paths,
            &mut self.interface.library_paths,
        );

        for name in &declaration.runtime_dependencies {
            let id = lookup.get(name).ok_or_else(|| {
                ResolveError::dependency_not_found(
                    &declaration.name,
                    name,
                    DependencySource::Runtime,
                )
            })?;
            self.runtime_dependencies.insert(*id);
        }

        if !self.settings.kind.is_third_party() && target.link_kind == TargetLinkKind::Monolithic {
            self.private
                .defines
                .insert("KEEL_TARGET_MONOLITHIC=1".to_string());
        }

        match self.settings.link_kind {
            ModuleLinkKind::Application => {
                self.private
                    .defines
                    .insert("KEEL_MODULE_PRIVATE_APPLICATION=1".to_string());
            }
            ModuleLinkKind::ConsoleApplication => {
                self.private
                    .defines
                    .insert("KEEL_MODULE_PRIVATE_CONSOLE_APPLICATION=1".to_string());
            }
            ModuleLinkKind::StaticLibrary
            | ModuleLinkKind::DynamicLibrary
            | ModuleLinkKind::ImportedLibrary => {}
        }

        self.private.defines.extend(target.defines.iter().cloned());
        self.private
            .include_paths
            .extend(target.include_paths.iter().cloned());
        self.private
            .library_paths
            .extend(target.library_paths.iter().cloned());

        Ok(())
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Declaration this node was created from
    pub fn declaration(&self) -> &ModuleDeclaration {
        &self.declaration
    }

    pub fn settings(&self) -> &ModuleSettings {
        &self.settings
    }

    pub fn kind(&self) -> ModuleKind {
        self.settings.kind
    }

    pub fn link_kind(&self) -> ModuleLinkKind {
        self.settings.link_kind
    }

    pub fn language(&self) -> ModuleLanguage {
        self.settings.language
    }

    pub fn optimization_level(&self) -> OptimizationLevel {
        self.settings.optimization_level
    }

    pub fn features(&self) -> &ResolvedFeatures {
        &self.settings.features
    }

    pub fn export_define(&self) -> &str {
        &self.settings.export_define
    }

    pub fn external_source(&self) -> bool {
        self.settings.external_source
    }

    pub fn compiler(&self) -> &ToolHandle {
        &self.compiler
    }

    pub fn linker(&self) -> &ToolHandle {
        &self.linker
    }

    pub fn assembler(&self) -> Option<&ToolHandle> {
        self.assembler.as_ref()
    }

    pub fn code_generators(&self) -> &[CodeGeneratorHandle] {
        &self.code_generators
    }

    pub fn resource_compilers(&self) -> &[ToolHandle] {
        &self.resource_compilers
    }

    /// Referenced modules with the kind of each reference
    pub fn outgoing_references(&self) -> &IndexMap<ModuleId, ReferenceKind> {
        &self.outgoing
    }

    /// Modules referencing this one
    pub fn incoming_references(&self) -> &IndexSet<ModuleId> {
        &self.incoming
    }

    /// Private (compile) view
    pub fn private_properties(&self) -> &Properties {
        &self.private
    }

    /// Interface (export) view
    pub fn interface_properties(&self) -> &Properties {
        &self.interface
    }

    pub fn defines(&self) -> &IndexSet<String> {
        &self.private.defines
    }

    pub fn interface_defines(&self) -> &IndexSet<String> {
        &self.interface.defines
    }

    pub fn libraries(&self) -> &IndexSet<String> {
        &self.private.libraries
    }

    pub fn interface_libraries(&self) -> &IndexSet<String> {
        &self.interface.libraries
    }

    pub fn include_paths(&self) -> &IndexSet<String> {
        &self.private.include_paths
    }

    pub fn interface_include_paths(&self) -> &IndexSet<String> {
        &self.interface.include_paths
    }

    pub fn library_paths(&self) -> &IndexSet<String> {
        &self.private.library_paths
    }

    pub fn interface_library_paths(&self) -> &IndexSet<String> {
        &self.interface.library_paths
    }

    pub fn dependencies(&self) -> &IndexSet<ModuleId> {
        &self.private.dependencies
    }

    pub fn interface_dependencies(&self) -> &IndexSet<ModuleId> {
        &self.interface.dependencies
    }

    pub fn runtime_dependencies(&self) -> &IndexSet<ModuleId> {
        &self.runtime_dependencies
    }
}

/// Public entries go to both views, the others to their own view only
fn import_scoped(
    scoped: &Scoped,
    private: &mut IndexSet<String>,
    interface: &mut IndexSet<String>,
) {
    for (kind, item) in scoped.iter() {
        if kind.is_private() {
            private.insert(item.clone());
        }
        if kind.is_interface() {
            interface.insert(item.clone());
        }
    }
}
