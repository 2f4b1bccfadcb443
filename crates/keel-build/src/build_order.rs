//! Graph algorithms over module references: cycle detection, topological
//! sort, build levels and strongly connected components
use crate::error::{ResolveError, ResolveResult};
use crate::resolved_module::{ModuleId, ResolvedModule};
use std::collections::VecDeque;

/// Directed graph whose edges point from a module to its dependencies
pub trait DependencyGraph {
    /// Number of nodes; ids are `0..node_count()`
    fn node_count(&self) -> usize;

    fn node_name(&self, id: ModuleId) -> &str;

    /// Direct dependencies of a node, in declaration order
    fn successors(&self, id: ModuleId) -> Box<dyn Iterator<Item = ModuleId> + '_>;
}

impl DependencyGraph for [ResolvedModule] {
    fn node_count(&self) -> usize {
        self.len()
    }

    fn node_name(&self, id: ModuleId) -> &str {
        self[id.index()].name()
    }

    fn successors(&self, id: ModuleId) -> Box<dyn Iterator<Item = ModuleId> + '_> {
        Box::new(self[id.index()].outgoing.keys().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Processed,
}

/// Fail with the first cycle found by a depth-first walk in node order
///
/// The reported trace runs in dependency direction from the first repeated
/// module back to itself, so `a -> b -> c -> b` reports `[b, c, b]` and a
/// module depending on itself reports `[a, a]`.
pub fn detect_cycles<G: DependencyGraph + ?Sized>(graph: &G) -> ResolveResult<()> {
    let mut states = vec![VisitState::Unvisited; graph.node_count()];
    let mut path = Vec::new();

    for index in 0..graph.node_count() {
        if states[index] == VisitState::Unvisited {
            if let Some(cycle) = visit(graph, ModuleId(index), &mut states, &mut path) {
                let trace = cycle
                    .into_iter()
                    .map(|id| graph.node_name(id).to_string())
                    .collect();
                return Err(ResolveError::CircularDependency { trace });
            }
        }
    }

    Ok(())
}

fn visit<G: DependencyGraph + ?Sized>(
    graph: &G,
    node: ModuleId,
    states: &mut [VisitState],
    path: &mut Vec<ModuleId>,
) -> Option<Vec<ModuleId>> {
    states[node.index()] = VisitState::InProgress;
    path.push(node);

    for dependency in graph.successors(node) {
        match states[dependency.index()] {
            VisitState::InProgress => {
                let start = path.iter().position(|id| *id == dependency).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(dependency);
                return Some(cycle);
            }
            VisitState::Unvisited => {
                if let Some(cycle) = visit(graph, dependency, states, path) {
                    return Some(cycle);
                }
            }
            VisitState::Processed => {}
        }
    }

    path.pop();
    states[node.index()] = VisitState::Processed;
    None
}

/// In-degree of every node, counting references from other modules
pub fn in_degrees<G: DependencyGraph + ?Sized>(graph: &G) -> Vec<usize> {
    let mut in_degree = vec![0; graph.node_count()];
    for index in 0..graph.node_count() {
        for dependency in graph.successors(ModuleId(index)) {
            in_degree[dependency.index()] += 1;
        }
    }
    in_degree
}

/// Nodes nothing depends on, in node order
pub fn roots<G: DependencyGraph + ?Sized>(graph: &G) -> Vec<ModuleId> {
    in_degrees(graph)
        .into_iter()
        .enumerate()
        .filter(|(_, degree)| *degree == 0)
        .map(|(index, _)| ModuleId(index))
        .collect()
}

/// Order nodes so that every dependency precedes its dependents
///
/// Kahn's algorithm seeded with `roots`: dequeuing a dependent releases its
/// dependencies, and the dequeue order is reversed at the end. A graph that
/// cannot be fully drained is reported as a cycle.
pub fn topological_sort<G: DependencyGraph + ?Sized>(
    graph: &G,
    roots: &[ModuleId],
) -> ResolveResult<Vec<ModuleId>> {
    let mut in_degree = in_degrees(graph);
    let mut queue: VecDeque<ModuleId> = roots.iter().copied().collect();
    let mut result = Vec::with_capacity(graph.node_count());

    while let Some(node) = queue.pop_front() {
        result.push(node);

        for dependency in graph.successors(node) {
            let degree = &mut in_degree[dependency.index()];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(dependency);
            }
        }
    }

    if result.len() != graph.node_count() {
        detect_cycles(graph)?;

        let trace = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(index, _)| graph.node_name(ModuleId(index)).to_string())
            .collect();
        return Err(ResolveError::CircularDependency { trace });
    }

    result.reverse();
    Ok(result)
}

/// Group nodes into levels that can be built concurrently
///
/// Level zero holds modules without dependencies; every other module sits one
/// level above its deepest dependency. `sorted` must be a topological order.
pub fn build_levels<G: DependencyGraph + ?Sized>(
    graph: &G,
    sorted: &[ModuleId],
) -> Vec<Vec<ModuleId>> {
    let mut level = vec![0usize; graph.node_count()];
    let mut levels: Vec<Vec<ModuleId>> = Vec::new();

    for &node in sorted {
        let depth = graph
            .successors(node)
            .map(|dependency| level[dependency.index()] + 1)
            .max()
            .unwrap_or(0);
        level[node.index()] = depth;

        if levels.len() <= depth {
            levels.resize_with(depth + 1, Vec::new);
        }
        levels[depth].push(node);
    }

    levels
}

struct Tarjan<'g, G: DependencyGraph + ?Sized> {
    graph: &'g G,
    next_index: usize,
    indices: Vec<Option<usize>>,
    lowlinks: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<ModuleId>,
    components: Vec<Vec<ModuleId>>,
}

impl<'g, G: DependencyGraph + ?Sized> Tarjan<'g, G> {
    fn strong_connect(&mut self, node: ModuleId) {
        let current = node.index();
        self.indices[current] = Some(self.next_index);
        self.lowlinks[current] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[current] = true;

        let graph = self.graph;
        for dependency in graph.successors(node) {
            let next = dependency.index();
            match self.indices[next] {
                None => {
                    self.strong_connect(dependency);
                    self.lowlinks[current] = self.lowlinks[current].min(self.lowlinks[next]);
                }
                Some(index) if self.on_stack[next] => {
                    self.lowlinks[current] = self.lowlinks[current].min(index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlinks[current]) == self.indices[current] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack[member.index()] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

/// Tarjan's strongly connected components
///
/// Components come out in reverse topological order; members of a component
/// are listed in stack pop order. On an acyclic graph every component holds
/// exactly one node.
pub fn strongly_connected_components<G: DependencyGraph + ?Sized>(graph: &G) -> Vec<Vec<ModuleId>> {
    let count = graph.node_count();
    let mut tarjan = Tarjan {
        graph,
        next_index: 0,
        indices: vec![None; count],
        lowlinks: vec![0; count],
        on_stack: vec![false; count],
        stack: Vec::new(),
        components: Vec::new(),
    };

    for index in 0..count {
        if tarjan.indices[index].is_none() {
            tarjan.strong_connect(ModuleId(index));
        }
    }

    tarjan.components
}
