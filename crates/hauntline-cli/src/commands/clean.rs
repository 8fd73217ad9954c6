use std::path::Path;

use anyhow::{Context, Result};

use hauntline_engine::cleanup::{self, Removal};
use hauntline_engine::config::parser;
use hauntline_engine::{orchestrator, RunOptions};

/// Execute the `clean` command: remove every stage output in the layout.
pub fn execute(config_path: Option<&Path>, options: &RunOptions) -> Result<()> {
    let config = parser::load_pipeline(config_path).context("Failed to load pipeline")?;
    let (_, layout) = orchestrator::prepare(&config, options)?;

    for removal in cleanup::clean_all(&layout)? {
        match removal {
            Removal::Deleted(path) => println!("Deleted:   {}", path.display()),
            Removal::NotFound(path) => println!("Not found: {}", path.display()),
        }
    }
    Ok(())
}
