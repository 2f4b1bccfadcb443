//! Property propagation along module references
//!
//! Runs once, in topological order, so every dependency is complete before a
//! dependent reads it. Only interface properties cross a module boundary for
//! compilation. Linking is the exception: a static or imported library hands
//! its private link inputs to whoever references it.

use crate::reference::ReferenceKind;
use crate::resolved_module::{ModuleId, ResolvedModule};
use tracing::trace;

/// Merge dependency properties into every node, visiting `sorted` in order
pub(crate) fn propagate(nodes: &mut [ResolvedModule], sorted: &[ModuleId]) {
    for &current in sorted {
        let references: Vec<(ModuleId, ReferenceKind)> = nodes[current.index()]
            .outgoing
            .iter()
            .map(|(id, kind)| (*id, *kind))
            .collect();

        for (dependency, kind) in references {
            if let Some((node, dependency)) = split_pair(nodes, current, dependency) {
                trace!(
                    module = node.name(),
                    dependency = dependency.name(),
                    %kind,
                    "propagating properties"
                );
                merge(node, dependency, kind);
            }
        }
    }
}

fn merge(current: &mut ResolvedModule, dependency: &ResolvedModule, kind: ReferenceKind) {
    current
        .runtime_dependencies
        .extend(dependency.runtime_dependencies.iter().copied());

    if kind.is_interface() {
        current.interface.extend_from(&dependency.interface);
    }

    if kind.is_private() {
        current.private.extend_from(&dependency.interface);
    }

    if dependency.link_kind().forwards_link_dependencies() {
        current.private.extend_link_inputs_from(&dependency.private);
    }
}

/// Mutable access to `current` alongside shared access to `dependency`
fn split_pair(
    nodes: &mut [ResolvedModule],
    current: ModuleId,
    dependency: ModuleId,
) -> Option<(&mut ResolvedModule, &ResolvedModule)> {
    let (current, dependency) = (current.index(), dependency.index());

    if current < dependency {
        let (head, tail) = nodes.split_at_mut(dependency);
        Some((&mut head[current], &tail[0]))
    } else if current > dependency {
        let (head, tail) = nodes.split_at_mut(current);
        Some((&mut tail[0], &head[dependency]))
    } else {
        None
    }
}
