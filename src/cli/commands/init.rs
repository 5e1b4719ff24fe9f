use anyhow::bail;
use clap::Args;
use colored::*;

use crate::core::config::{save_config, Config};
use crate::core::paths::config_path;

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    let path = config_path();

    if path.exists() && !args.force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    save_config(&path, &Config::default())?;
    println!(
        "{} wrote default configuration to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
