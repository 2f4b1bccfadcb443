//! Resolve command - resolve a target and print what the generators would see

use super::{load_project, ResolveArgs};
use anyhow::{bail, Context, Result};
use colored::*;
use keel_build::{JsonExporter, ResolvedTarget, TargetConfiguration, TargetExporter};
use std::io::{self, Write};
use tracing::info;

/// Run the resolve command
pub fn run(args: ResolveArgs) -> Result<()> {
    let project = load_project(args.selection.project.as_deref())?;
    let (target, platform) = args.selection.resolve_names(&project)?;

    if !args.all_configurations {
        let resolved = project
            .resolve(target, platform, args.selection.configuration)
            .with_context(|| format!("Failed to resolve target '{}' for {}", target, platform))?;
        return report(&resolved, &args);
    }

    let results = project
        .resolve_all(target, platform, &TargetConfiguration::ALL)
        .with_context(|| format!("Failed to resolve target '{}' for {}", target, platform))?;

    let mut failed = 0;
    for resolution in &results {
        match &resolution.result {
            Ok(resolved) => report(resolved, &args)?,
            Err(error) => {
                failed += 1;
                eprintln!(
                    "{} {}: {}",
                    "FAILED".red().bold(),
                    resolution.configuration,
                    error
                );
            }
        }
    }

    if failed > 0 {
        bail!(
            "{} of {} configurations failed to resolve",
            failed,
            results.len()
        );
    }

    info!(configurations = results.len(), "resolved all configurations");
    Ok(())
}

fn report(resolved: &ResolvedTarget, args: &ResolveArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        JsonExporter
            .export(&mut out, resolved)
            .context("Failed to write JSON export")?;
    } else if !args.quiet {
        print_summary(&mut out, resolved).context("Failed to write summary")?;
    }

    Ok(())
}

fn print_summary(out: &mut dyn Write, resolved: &ResolvedTarget) -> io::Result<()> {
    writeln!(
        out,
        "{} {} ({}, {})",
        "Resolved".green().bold(),
        resolved.name().bold(),
        resolved.platform(),
        resolved.configuration()
    )?;
    writeln!(out, "  Modules:     {}", resolved.nodes().len())?;
    writeln!(out, "  References:  {}", resolved.edges().len())?;
    writeln!(out, "  Roots:       {}", resolved.names(resolved.roots()).join(", "))?;
    writeln!(out, "  Order:       {}", resolved.names(resolved.sorted()).join(", "))?;

    let transitive: Vec<&str> = resolved.transitive_sorted().map(|m| m.name()).collect();
    writeln!(out, "  Transitive:  {}", transitive.join(", "))?;
    writeln!(out, "  Levels:      {}", resolved.build_levels().len())?;
    writeln!(out, "  Fingerprint: {}", resolved.fingerprint().dimmed())
}
