//! Graph command - export the module graph for Graphviz

use super::{load_project, GraphArgs};
use anyhow::{Context, Result};
use keel_build::{GraphvizDotExporter, TargetExporter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

/// Run the graph command
pub fn run(args: GraphArgs) -> Result<()> {
    let project = load_project(args.selection.project.as_deref())?;
    let (target, platform) = args.selection.resolve_names(&project)?;

    let resolved = project
        .resolve(target, platform, args.selection.configuration)
        .with_context(|| format!("Failed to resolve target '{}' for {}", target, platform))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            GraphvizDotExporter
                .export(&mut writer, &resolved)
                .and_then(|_| writer.flush())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote graph");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            GraphvizDotExporter
                .export(&mut out, &resolved)
                .context("Failed to write graph")?;
        }
    }

    Ok(())
}
