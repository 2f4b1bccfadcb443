pub mod graph;
pub mod modules;
pub mod resolve;

use anyhow::{Context, Result};
use clap::Args;
use keel_build::TargetConfiguration;
use keel_config::{ConfigLoader, Project};
use std::path::{Path, PathBuf};

/// Project, target, platform and configuration chosen on the command line
#[derive(Debug, Clone, Args)]
pub struct Selection {
    /// Project directory (defaults to the current directory)
    #[arg(long, short = 'p')]
    pub project: Option<PathBuf>,

    /// Target name (defaults to the first target of the project)
    #[arg(long, short = 't')]
    pub target: Option<String>,

    /// Platform moniker (defaults to the first platform of the project)
    #[arg(long)]
    pub platform: Option<String>,

    /// Configuration (Debug, GameDebug, EngineDebug, Development, Testing, Shipping)
    #[arg(long, short = 'c')]
    pub configuration: Option<TargetConfiguration>,
}

/// Arguments of `keel resolve`
pub struct ResolveArgs {
    pub selection: Selection,
    pub all_configurations: bool,
    pub json: bool,
    pub quiet: bool,
}

/// Arguments of `keel graph`
pub struct GraphArgs {
    pub selection: Selection,
    pub output: Option<PathBuf>,
}

/// Load the project containing `dir` or the current directory
pub fn load_project(dir: Option<&Path>) -> Result<Project> {
    let start = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    ConfigLoader::new()
        .load_from_directory(&start)
        .with_context(|| format!("Failed to load project from {}", start.display()))
}

impl Selection {
    /// Target name and platform moniker, falling back to project defaults
    pub fn resolve_names<'a>(&'a self, project: &'a Project) -> Result<(&'a str, &'a str)> {
        let target = match &self.target {
            Some(target) => target.as_str(),
            None => project.default_target()?,
        };
        let platform = match &self.platform {
            Some(platform) => platform.as_str(),
            None => project.default_platform()?,
        };
        Ok((target, platform))
    }
}
