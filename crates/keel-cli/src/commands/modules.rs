//! Modules command - list the rule files of a project

use super::load_project;
use anyhow::Result;
use colored::*;
use std::path::PathBuf;

/// Run the modules command
pub fn run(project_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let project = load_project(project_dir.as_deref())?;

    if json {
        let modules: Vec<_> = project
            .rules
            .modules
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "name": rule.module.name,
                    "kind": rule.module.kind,
                    "platforms": rule.platforms,
                    "file": rule.path.display().to_string(),
                })
            })
            .collect();
        let targets: Vec<_> = project
            .rules
            .targets
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "name": rule.target.name,
                    "kind": rule.target.kind,
                    "file": rule.path.display().to_string(),
                })
            })
            .collect();

        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "project": project.config.project.name,
                "modules": modules,
                "targets": targets,
            }))?
        );
        return Ok(());
    }

    println!("{} {}", "Project".bold(), project.config.project.name);

    println!("\n{} ({})", "Modules".bold(), project.rules.modules.len());
    for rule in &project.rules.modules {
        let platforms = if rule.platforms.is_empty() {
            "all platforms".to_string()
        } else {
            rule.platforms.join(", ")
        };
        println!(
            "  {:<24} {:<22} {}",
            rule.module.name.cyan(),
            format!("{:?}", rule.module.kind),
            platforms.dimmed()
        );
    }

    println!("\n{} ({})", "Targets".bold(), project.rules.targets.len());
    for rule in &project.rules.targets {
        println!(
            "  {:<24} {}",
            rule.target.name.cyan(),
            rule.path.display().to_string().dimmed()
        );
    }

    Ok(())
}
