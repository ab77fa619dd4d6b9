// Each module handles one subcommand; main.rs only parses and dispatches.

mod airway;
mod route;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use airnav_lib::{resolve_dataset_path, NavContext, RouterConfig};

use crate::output::OutputFormat;

pub use airway::handle_airway;
pub use route::{handle_route, handle_via, RouteCommandArgs, ViaCommandArgs};

/// Global options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

impl CommandContext {
    fn router_config(&self) -> Result<RouterConfig> {
        match &self.config {
            Some(path) => RouterConfig::from_path(path)
                .with_context(|| format!("failed to read router configuration {}", path.display())),
            None => Ok(RouterConfig::default()),
        }
    }

    /// Resolve the dataset and build the navigation context over it.
    pub fn open(&self) -> Result<NavContext> {
        let config = self.router_config()?;
        let dataset_path = resolve_dataset_path(self.data_dir.as_deref())
            .context("failed to locate the navigation dataset")?;
        info!(path = %dataset_path.display(), "opening navigation dataset");
        NavContext::open(&dataset_path, config)
            .with_context(|| format!("failed to load dataset from {}", dataset_path.display()))
    }
}
