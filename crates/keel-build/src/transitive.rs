//! Transitive closure of a target
use crate::error::{ResolveError, ResolveResult, SeedRole};
use crate::resolved_module::{ModuleId, ResolvedModule};
use crate::target::TargetDeclaration;
use indexmap::{IndexMap, IndexSet};

/// Modules that must be built for `target`
///
/// Seeds are the startup module, the required modules, every application
/// and the runtime dependencies of every application. Everything reachable
/// from a seed over references of any kind belongs to the closure.
pub(crate) fn transitive_closure(
    nodes: &[ResolvedModule],
    lookup: &IndexMap<String, ModuleId>,
    target: &TargetDeclaration,
) -> ResolveResult<IndexSet<ModuleId>> {
    let mut result = IndexSet::new();

    let seed = |name: &str, role: SeedRole| {
        lookup
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnresolvedSeed {
                module: name.to_string(),
                role,
            })
    };

    if let Some(startup) = &target.startup_module {
        collect(nodes, seed(startup.as_str(), SeedRole::Startup)?, &mut result);
    }

    for name in &target.required_modules {
        collect(nodes, seed(name.as_str(), SeedRole::Required)?, &mut result);
    }

    for node in nodes.iter().filter(|n| n.link_kind().is_application()) {
        collect(nodes, node.id(), &mut result);

        for &runtime in &node.runtime_dependencies {
            collect(nodes, runtime, &mut result);
        }
    }

    Ok(result)
}

fn collect(nodes: &[ResolvedModule], start: ModuleId, result: &mut IndexSet<ModuleId>) {
    let mut pending = vec![start];

    while let Some(node) = pending.pop() {
        if result.insert(node) {
            pending.extend(
                nodes[node.index()]
                    .outgoing
                    .keys()
                    .rev()
                    .filter(|id| !result.contains(*id)),
            );
        }
    }
}
