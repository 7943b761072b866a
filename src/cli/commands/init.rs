//! Implementation of the `repositories init` command.

use anyhow::Result;

use crate::cli::types::InitArgs;
use crate::infrastructure::setup::write_default_config;

pub fn execute(args: &InitArgs) -> Result<()> {
    write_default_config(&args.path, args.force)?;
    println!("Wrote default configuration to {}", args.path.display());
    Ok(())
}
