//! Command-line interface
//!
//! Flag definitions live in [`types`]; each subcommand has its own module
//! under [`commands`].

pub mod commands;
pub mod types;

pub use types::{Cli, Commands, InitArgs, ServeArgs};

/// Print an error chain to stderr and exit with status 1.
pub fn handle_error(err: &anyhow::Error) -> ! {
    eprintln!("Error: {err}");
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    std::process::exit(1);
}
