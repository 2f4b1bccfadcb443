//! Property-based tests over randomly generated module graphs
//!
//! Graphs are generated acyclic by only letting module `i` reference
//! modules with a higher index.

use keel_build::{
    GenericPlatform, ModuleDeclaration, ModuleKind, ReferenceKind, ResolvedTarget,
    TargetDeclaration,
};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct GraphShape {
    count: usize,
    edges: Vec<(usize, usize, ReferenceKind)>,
}

fn kind_strategy() -> impl Strategy<Value = ReferenceKind> {
    prop::sample::select(ReferenceKind::ALL.to_vec())
}

/// Acyclic shapes with 1-16 modules and every pair connected at most once
fn dag_strategy() -> impl Strategy<Value = GraphShape> {
    (1usize..=16).prop_flat_map(|count| {
        prop::collection::vec((0..count, 0..count, kind_strategy()), 0..=40).prop_map(
            move |raw| {
                let mut seen = HashSet::new();
                let edges = raw
                    .into_iter()
                    .filter(|(a, b, _)| a != b)
                    .map(|(a, b, kind)| (a.min(b), a.max(b), kind))
                    .filter(|(a, b, _)| seen.insert((*a, *b)))
                    .collect();
                GraphShape { count, edges }
            },
        )
    })
}

fn module_name(index: usize) -> String {
    format!("M{}", index)
}

fn declarations(shape: &GraphShape) -> Vec<ModuleDeclaration> {
    (0..shape.count)
        .map(|index| {
            let name = module_name(index);
            let mut module = ModuleDeclaration::new(&name, ModuleKind::RuntimeLibrary)
                .with_defines(
                    &[format!("{}_PUBLIC", name).as_str()],
                    &[format!("{}_PRIVATE", name).as_str()],
                    &[],
                );
            for (_, dependency, kind) in shape.edges.iter().filter(|(s, _, _)| *s == index) {
                module
                    .dependencies
                    .list_mut(*kind)
                    .push(module_name(*dependency));
            }
            module
        })
        .collect()
}

fn resolve(modules: &[ModuleDeclaration]) -> Result<ResolvedTarget, keel_build::ResolveError> {
    ResolvedTarget::resolve(
        &GenericPlatform::new("test"),
        &TargetDeclaration::new("Random"),
        modules,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every module appears once in the sorted order, after all its dependencies
    #[test]
    fn prop_sorted_order_is_topological(shape in dag_strategy()) {
        let target = resolve(&declarations(&shape)).unwrap();

        let mut sorted: Vec<usize> = target.sorted().iter().map(|id| id.index()).collect();
        let positions: Vec<usize> = {
            let mut positions = vec![0; shape.count];
            for (position, index) in sorted.iter().enumerate() {
                positions[*index] = position;
            }
            positions
        };

        for (source, dependency, _) in &shape.edges {
            prop_assert!(
                positions[*dependency] < positions[*source],
                "{} sorted after its dependent {}",
                module_name(*dependency),
                module_name(*source)
            );
        }

        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..shape.count).collect::<Vec<_>>());
    }

    /// Roots are exactly the modules nothing references
    #[test]
    fn prop_roots_have_no_incoming_references(shape in dag_strategy()) {
        let target = resolve(&declarations(&shape)).unwrap();
        let referenced: HashSet<usize> = shape.edges.iter().map(|(_, d, _)| *d).collect();

        let roots: HashSet<usize> = target.roots().iter().map(|id| id.index()).collect();
        let expected: HashSet<usize> =
            (0..shape.count).filter(|i| !referenced.contains(i)).collect();
        prop_assert_eq!(roots, expected);
    }

    /// Resolving the same declarations twice gives the same graph
    #[test]
    fn prop_resolution_is_deterministic(shape in dag_strategy()) {
        let modules = declarations(&shape);
        let first = resolve(&modules).unwrap();
        let second = resolve(&modules).unwrap();

        prop_assert_eq!(first.sorted(), second.sorted());
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
    }

    /// Private defines never leave their module
    #[test]
    fn prop_private_defines_stay_local(shape in dag_strategy()) {
        let target = resolve(&declarations(&shape)).unwrap();

        for node in target.nodes() {
            for define in node.defines().iter().chain(node.interface_defines()) {
                if let Some(owner) = define.strip_suffix("_PRIVATE") {
                    prop_assert_eq!(owner, node.name());
                }
            }
        }
    }

    /// Without seeds or applications nothing is transitive
    #[test]
    fn prop_transitive_is_subset_of_nodes(shape in dag_strategy(), seed in any::<prop::sample::Index>()) {
        let modules = declarations(&shape);
        let unseeded = resolve(&modules).unwrap();
        prop_assert!(unseeded.transitive().is_empty());

        let startup = module_name(seed.index(shape.count));
        let seeded = ResolvedTarget::resolve(
            &GenericPlatform::new("test"),
            &TargetDeclaration::new("Random").with_startup_module(startup.clone()),
            &modules,
        )
        .unwrap();

        prop_assert!(seeded.module_by_name(&startup).is_some_and(|m| seeded.is_transitive(m.id())));
        prop_assert!(seeded.transitive().iter().all(|id| id.index() < shape.count));
        for edge in seeded.edges().keys() {
            if seeded.is_transitive(edge.source) {
                prop_assert!(seeded.is_transitive(edge.target));
            }
        }
    }

    /// Closing any reference into a loop is reported with a closed trace
    #[test]
    fn prop_back_edge_is_a_cycle(shape in dag_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!shape.edges.is_empty());

        let (source, dependency, _) = shape.edges[pick.index(shape.edges.len())];
        let mut modules = declarations(&shape);
        modules[dependency]
            .dependencies
            .private
            .push(module_name(source));

        let error = resolve(&modules).unwrap_err();
        let trace = error.cycle_trace().unwrap();

        prop_assert!(trace.len() >= 3);
        prop_assert_eq!(trace.first(), trace.last());
    }
}
