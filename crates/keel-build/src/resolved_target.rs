//! Resolved targets
//!
//! [`ResolvedTarget::resolve`] turns one target declaration and a list of
//! module declarations into an acyclic, ordered graph of [`ResolvedModule`]s.
//! The stages run strictly in sequence:
//!
//! 1. node creation, one node per declaration
//! 2. property import from the module's own declaration and the target
//! 3. edge construction from the dependency lists
//! 4. cycle detection
//! 5. root discovery and topological sort
//! 6. property propagation in topological order
//! 7. transitive closure
//!
//! Any error aborts the whole resolution; no partial graph is returned.

use crate::build_order;
use crate::configuration::TargetConfiguration;
use crate::error::{DependencySource, ResolveError, ResolveResult};
use crate::module::ModuleDeclaration;
use crate::platform::PlatformCapabilities;
use crate::propagation;
use crate::reference::ReferenceKind;
use crate::resolved_module::{ModuleId, ResolvedModule};
use crate::target::{TargetDeclaration, TargetDirectories};
use crate::transitive;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, debug_span};

/// Directed reference from a module to one of its dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge {
    pub source: ModuleId,
    pub target: ModuleId,
}

/// Fully resolved module graph of one (target, platform, configuration)
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    declaration: TargetDeclaration,
    moniker: String,
    directories: TargetDirectories,
    nodes: Vec<ResolvedModule>,
    lookup: IndexMap<String, ModuleId>,
    edges: IndexMap<Edge, ReferenceKind>,
    roots: Vec<ModuleId>,
    sorted: Vec<ModuleId>,
    transitive: IndexSet<ModuleId>,
}

impl ResolvedTarget {
    /// Resolve `modules` for `target` on `platform`
    pub fn resolve(
        platform: &dyn PlatformCapabilities,
        target: &TargetDeclaration,
        modules: &[ModuleDeclaration],
    ) -> ResolveResult<Self> {
        let span = debug_span!(
            "resolve",
            name = %target.name,
            platform = platform.moniker(),
            configuration = %target.configuration,
        );
        let _enter = span.enter();

        let directories = target.directories(platform.moniker());

        let mut resolved = Self {
            declaration: target.clone(),
            moniker: platform.moniker().to_string(),
            directories,
            nodes: Vec::with_capacity(modules.len()),
            lookup: IndexMap::with_capacity(modules.len()),
            edges: IndexMap::new(),
            roots: Vec::new(),
            sorted: Vec::new(),
            transitive: IndexSet::new(),
        };

        resolved.create_nodes(platform, modules)?;
        debug!(nodes = resolved.nodes.len(), "created graph nodes");

        for node in &mut resolved.nodes {
            node.import_properties(target, &resolved.directories, &resolved.lookup)?;
        }

        resolved.create_edges(modules)?;
        debug!(edges = resolved.edges.len(), "created graph edges");

        build_order::detect_cycles(resolved.nodes.as_slice())?;

        resolved.roots = build_order::roots(resolved.nodes.as_slice());
        resolved.sorted = build_order::topological_sort(resolved.nodes.as_slice(), &resolved.roots)?;
        debug!(roots = resolved.roots.len(), "sorted graph");

        propagation::propagate(&mut resolved.nodes, &resolved.sorted);

        resolved.transitive =
            transitive::transitive_closure(&resolved.nodes, &resolved.lookup, target)?;
        debug!(transitive = resolved.transitive.len(), "computed transitive closure");

        Ok(resolved)
    }

    fn create_nodes(
        &mut self,
        platform: &dyn PlatformCapabilities,
        modules: &[ModuleDeclaration],
    ) -> ResolveResult<()> {
        for module in modules {
            if self.lookup.contains_key(&module.name) {
                return Err(ResolveError::DuplicateModuleName {
                    module: module.name.clone(),
                });
            }

            let id = ModuleId(self.nodes.len());
            let node = ResolvedModule::new(
                id,
                module,
                &self.declaration,
                &self.directories,
                platform,
            )?;
            self.lookup.insert(module.name.clone(), id);
            self.nodes.push(node);
        }

        Ok(())
    }

    fn create_edges(&mut self, modules: &[ModuleDeclaration]) -> ResolveResult<()> {
        for (index, module) in modules.iter().enumerate() {
            let source = ModuleId(index);

            for (kind, name) in module.dependencies.iter() {
                let target = self.lookup.get(name).copied().ok_or_else(|| {
                    ResolveError::dependency_not_found(
                        &module.name,
                        name,
                        DependencySource::Reference(kind),
                    )
                })?;

                self.add_reference(source, target, kind)?;
            }
        }

        Ok(())
    }

    /// Connect two nodes; a pair may be connected only once
    fn add_reference(
        &mut self,
        source: ModuleId,
        target: ModuleId,
        kind: ReferenceKind,
    ) -> ResolveResult<()> {
        if self.nodes[source.index()].outgoing.contains_key(&target) {
            return Err(ResolveError::duplicate_reference(
                self.nodes[source.index()].name(),
                self.nodes[target.index()].name(),
            ));
        }

        tracing::trace!(
            module = self.nodes[source.index()].name(),
            dependency = self.nodes[target.index()].name(),
            %kind,
            "adding reference"
        );

        let node = &mut self.nodes[source.index()];
        node.outgoing.insert(target, kind);
        if kind.is_private() {
            node.private.dependencies.insert(target);
        }
        if kind.is_interface() {
            node.interface.dependencies.insert(target);
        }

        self.nodes[target.index()].incoming.insert(source);
        self.edges.insert(Edge { source, target }, kind);

        Ok(())
    }

    /// Target declaration this graph was resolved for
    pub fn declaration(&self) -> &TargetDeclaration {
        &self.declaration
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn configuration(&self) -> TargetConfiguration {
        self.declaration.configuration
    }

    /// Moniker of the platform the graph was resolved on
    pub fn platform(&self) -> &str {
        &self.moniker
    }

    pub fn directories(&self) -> &TargetDirectories {
        &self.directories
    }

    /// All modules, in declaration order
    pub fn nodes(&self) -> &[ResolvedModule] {
        &self.nodes
    }

    pub fn node(&self, id: ModuleId) -> &ResolvedModule {
        &self.nodes[id.index()]
    }

    pub fn module_by_name(&self, name: &str) -> Option<&ResolvedModule> {
        self.lookup.get(name).map(|id| &self.nodes[id.index()])
    }

    pub fn edges(&self) -> &IndexMap<Edge, ReferenceKind> {
        &self.edges
    }

    /// Modules no other module references
    pub fn roots(&self) -> &[ModuleId] {
        &self.roots
    }

    /// All modules, dependencies before dependents
    pub fn sorted(&self) -> &[ModuleId] {
        &self.sorted
    }

    /// Modules that are actually built for this target
    pub fn transitive(&self) -> &IndexSet<ModuleId> {
        &self.transitive
    }

    pub fn is_transitive(&self, id: ModuleId) -> bool {
        self.transitive.contains(&id)
    }

    /// Transitive modules, dependencies before dependents
    pub fn transitive_sorted(&self) -> impl Iterator<Item = &ResolvedModule> + '_ {
        self.sorted
            .iter()
            .filter(|id| self.transitive.contains(*id))
            .map(|id| &self.nodes[id.index()])
    }

    /// Modules grouped by dependency depth, see [`build_order::build_levels`]
    pub fn build_levels(&self) -> Vec<Vec<ModuleId>> {
        build_order::build_levels(self.nodes.as_slice(), &self.sorted)
    }

    /// Tarjan's components over the resolved references
    pub fn strongly_connected_components(&self) -> Vec<Vec<ModuleId>> {
        build_order::strongly_connected_components(self.nodes.as_slice())
    }

    /// Names of the given modules
    pub fn names<'a>(&'a self, ids: impl IntoIterator<Item = &'a ModuleId>) -> Vec<&'a str> {
        ids.into_iter()
            .map(|id| self.nodes[id.index()].name())
            .collect()
    }

    /// SHA-256 over the sorted order, the edges and every propagated set
    ///
    /// Sets are hashed sorted, so two resolutions of the same inputs yield
    /// the same digest.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.declaration.name.as_bytes());
        hasher.update(self.moniker.as_bytes());
        hasher.update(self.declaration.configuration.name().as_bytes());

        for id in &self.sorted {
            let node = &self.nodes[id.index()];
            hasher.update(b"\0module\0");
            hasher.update(node.name().as_bytes());
            hasher.update(node.link_kind().to_string().as_bytes());
            hasher.update([u8::from(self.transitive.contains(id))]);

            for (label, values) in [
                ("defines", node.defines()),
                ("interface-defines", node.interface_defines()),
                ("libraries", node.libraries()),
                ("interface-libraries", node.interface_libraries()),
                ("include-paths", node.include_paths()),
                ("interface-include-paths", node.interface_include_paths()),
                ("library-paths", node.library_paths()),
                ("interface-library-paths", node.interface_library_paths()),
            ] {
                let mut values: Vec<&str> = values.iter().map(String::as_str).collect();
                values.sort_unstable();
                hasher.update(label.as_bytes());
                for value in values {
                    hasher.update(b"\0");
                    hasher.update(value.as_bytes());
                }
            }

            for (label, ids) in [
                ("dependencies", node.dependencies()),
                ("interface-dependencies", node.interface_dependencies()),
                ("runtime-dependencies", node.runtime_dependencies()),
            ] {
                let mut names = self.names(ids);
                names.sort_unstable();
                hasher.update(label.as_bytes());
                for name in names {
                    hasher.update(b"\0");
                    hasher.update(name.as_bytes());
                }
            }
        }

        let mut edges: Vec<(&str, &str, ReferenceKind)> = self
            .edges
            .iter()
            .map(|(edge, kind)| {
                (
                    self.nodes[edge.source.index()].name(),
                    self.nodes[edge.target.index()].name(),
                    *kind,
                )
            })
            .collect();
        edges.sort_unstable();
        for (source, target, kind) in edges {
            hasher.update(b"\0edge\0");
            hasher.update(source.as_bytes());
            hasher.update(target.as_bytes());
            hasher.update([kind.bits()]);
        }

        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleKind;
    use crate::platform::GenericPlatform;

    #[test]
    fn test_empty_target_resolves() {
        let platform = GenericPlatform::new("test");
        let target = TargetDeclaration::new("Empty");
        let resolved = ResolvedTarget::resolve(&platform, &target, &[]).unwrap();

        assert!(resolved.nodes().is_empty());
        assert!(resolved.sorted().is_empty());
        assert!(resolved.transitive().is_empty());
        assert_eq!(resolved.platform(), "test");
    }

    #[test]
    fn test_duplicate_module_name() {
        let platform = GenericPlatform::new("test");
        let target = TargetDeclaration::new("Sandbox");
        let modules = vec![
            ModuleDeclaration::new("Core", ModuleKind::RuntimeLibrary),
            ModuleDeclaration::new("Core", ModuleKind::GameLibrary),
        ];

        let err = ResolvedTarget::resolve(&platform, &target, &modules).unwrap_err();
        assert_eq!(
            err,
            ResolveError::DuplicateModuleName {
                module: "Core".to_string()
            }
        );
    }

    #[test]
    fn test_edges_record_both_directions() {
        let platform = GenericPlatform::new("test");
        let target = TargetDeclaration::new("Sandbox");
        let modules = vec![
            ModuleDeclaration::new("Game", ModuleKind::GameApplication)
                .with_interface_dependencies(&["Core"]),
            ModuleDeclaration::new("Core", ModuleKind::RuntimeLibrary),
        ];
        let resolved = ResolvedTarget::resolve(&platform, &target, &modules).unwrap();

        let game = resolved.module_by_name("Game").unwrap();
        let core = resolved.module_by_name("Core").unwrap();
        assert_eq!(
            game.outgoing_references().get(&core.id()),
            Some(&ReferenceKind::Interface)
        );
        assert!(core.incoming_references().contains(&game.id()));
        assert!(game.interface_dependencies().contains(&core.id()));
        assert!(!game.dependencies().contains(&core.id()));
        assert_eq!(
            resolved.edges().get(&Edge {
                source: game.id(),
                target: core.id()
            }),
            Some(&ReferenceKind::Interface)
        );
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let platform = GenericPlatform::new("test");
        let target = TargetDeclaration::new("Sandbox");
        let modules = vec![
            ModuleDeclaration::new("Game", ModuleKind::GameApplication)
                .with_public_dependencies(&["Core"]),
            ModuleDeclaration::new("Core", ModuleKind::RuntimeLibrary)
                .with_defines(&["CORE=1"], &[], &[]),
        ];

        let first = ResolvedTarget::resolve(&platform, &target, &modules).unwrap();
        let second = ResolvedTarget::resolve(&platform, &target, &modules).unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.fingerprint().len(), 64);

        let shipping = target.clone().with_configuration(TargetConfiguration::Shipping);
        let third = ResolvedTarget::resolve(&platform, &shipping, &modules).unwrap();
        assert_ne!(first.fingerprint(), third.fingerprint());
    }
}
