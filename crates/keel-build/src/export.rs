//! Exporters for resolved targets
use crate::configuration::{OptimizationLevel, TargetConfiguration};
use crate::module::{ModuleKind, ModuleLanguage, ModuleLinkKind};
use crate::reference::ReferenceKind;
use crate::resolved_target::ResolvedTarget;
use indexmap::IndexSet;
use serde::Serialize;
use std::io::{self, Write};

/// Writes a resolved target in some external format
pub trait TargetExporter {
    fn export(&self, writer: &mut dyn Write, target: &ResolvedTarget) -> io::Result<()>;

    /// Export into a string
    fn export_to_string(&self, target: &ResolvedTarget) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.export(&mut buffer, target)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Graphviz `dot` rendering of the module graph
///
/// Modules are boxes, transitive modules are drawn as double octagons and
/// references are solid, dotted or dashed for public, private and interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphvizDotExporter;

impl TargetExporter for GraphvizDotExporter {
    fn export(&self, writer: &mut dyn Write, target: &ResolvedTarget) -> io::Result<()> {
        writeln!(writer, "digraph G {{")?;
        writeln!(writer, "    rankdir=LR;")?;
        writeln!(writer, "    node [shape=box];")?;

        for node in target.nodes() {
            write!(writer, "    {} [label=\"{}\"", node.id(), node.name())?;
            if target.is_transitive(node.id()) {
                write!(writer, ", shape=doubleoctagon")?;
            }
            writeln!(writer, "];")?;
        }

        for (edge, kind) in target.edges() {
            writeln!(
                writer,
                "    {} -> {} [style={}];",
                edge.source,
                edge.target,
                kind.dot_style()
            )?;
        }

        writeln!(writer, "}}")
    }
}

/// Pretty-printed JSON summary of the resolved graph
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

#[derive(Debug, Serialize)]
struct TargetSummary<'a> {
    name: &'a str,
    platform: &'a str,
    configuration: TargetConfiguration,
    fingerprint: String,
    roots: Vec<&'a str>,
    sorted: Vec<&'a str>,
    transitive: Vec<&'a str>,
    modules: Vec<ModuleSummary<'a>>,
    edges: Vec<EdgeSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct ModuleSummary<'a> {
    name: &'a str,
    kind: ModuleKind,
    link_kind: ModuleLinkKind,
    language: ModuleLanguage,
    optimization_level: OptimizationLevel,
    transitive: bool,
    compiler: &'a str,
    linker: &'a str,
    defines: &'a IndexSet<String>,
    interface_defines: &'a IndexSet<String>,
    libraries: &'a IndexSet<String>,
    interface_libraries: &'a IndexSet<String>,
    include_paths: &'a IndexSet<String>,
    interface_include_paths: &'a IndexSet<String>,
    library_paths: &'a IndexSet<String>,
    interface_library_paths: &'a IndexSet<String>,
    dependencies: Vec<&'a str>,
    interface_dependencies: Vec<&'a str>,
    runtime_dependencies: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct EdgeSummary<'a> {
    source: &'a str,
    target: &'a str,
    kind: ReferenceKind,
}

impl JsonExporter {
    fn summarize<'a>(&self, target: &'a ResolvedTarget) -> TargetSummary<'a> {
        let modules = target
            .nodes()
            .iter()
            .map(|node| ModuleSummary {
                name: node.name(),
                kind: node.kind(),
                link_kind: node.link_kind(),
                language: node.language(),
                optimization_level: node.optimization_level(),
                transitive: target.is_transitive(node.id()),
                compiler: node.compiler().id(),
                linker: node.linker().id(),
                defines: node.defines(),
                interface_defines: node.interface_defines(),
                libraries: node.libraries(),
                interface_libraries: node.interface_libraries(),
                include_paths: node.include_paths(),
                interface_include_paths: node.interface_include_paths(),
                library_paths: node.library_paths(),
                interface_library_paths: node.interface_library_paths(),
                dependencies: target.names(node.dependencies()),
                interface_dependencies: target.names(node.interface_dependencies()),
                runtime_dependencies: target.names(node.runtime_dependencies()),
            })
            .collect();

        let edges = target
            .edges()
            .iter()
            .map(|(edge, kind)| EdgeSummary {
                source: target.node(edge.source).name(),
                target: target.node(edge.target).name(),
                kind: *kind,
            })
            .collect();

        TargetSummary {
            name: target.name(),
            platform: target.platform(),
            configuration: target.configuration(),
            fingerprint: target.fingerprint(),
            roots: target.names(target.roots()),
            sorted: target.names(target.sorted()),
            transitive: target.names(target.transitive()),
            modules,
            edges,
        }
    }
}

impl TargetExporter for JsonExporter {
    fn export(&self, writer: &mut dyn Write, target: &ResolvedTarget) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.summarize(target))?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleDeclaration;
    use crate::platform::GenericPlatform;
    use crate::target::TargetDeclaration;

    fn sample() -> ResolvedTarget {
        let modules = vec![
            ModuleDeclaration::new("Game", ModuleKind::GameApplication)
                .with_private_dependencies(&["Core"]),
            ModuleDeclaration::new("Core", ModuleKind::RuntimeLibrary),
            ModuleDeclaration::new("Unused", ModuleKind::RuntimeLibrary),
        ];
        ResolvedTarget::resolve(
            &GenericPlatform::new("test"),
            &TargetDeclaration::new("Sandbox"),
            &modules,
        )
        .unwrap()
    }

    #[test]
    fn test_dot_output() {
        let dot = GraphvizDotExporter.export_to_string(&sample()).unwrap();
        let expected = "digraph G {\n\
                        \x20   rankdir=LR;\n\
                        \x20   node [shape=box];\n\
                        \x20   0 [label=\"Game\", shape=doubleoctagon];\n\
                        \x20   1 [label=\"Core\", shape=doubleoctagon];\n\
                        \x20   2 [label=\"Unused\"];\n\
                        \x20   0 -> 1 [style=dotted];\n\
                        }\n";
        assert_eq!(dot, expected);
    }

    #[test]
    fn test_json_output() {
        let json = JsonExporter.export_to_string(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["name"], "Sandbox");
        assert_eq!(value["sorted"], serde_json::json!(["Core", "Unused", "Game"]));
        assert_eq!(value["edges"][0]["kind"], "private");
        assert_eq!(value["modules"][0]["link_kind"], "application");
        assert_eq!(value["modules"][2]["transitive"], false);
    }
}
