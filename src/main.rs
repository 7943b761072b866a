//! Repositories server entry point.

use clap::Parser;

use repositories::cli::{commands, handle_error, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Init(args)) => commands::init::execute(&args),
        Some(Commands::Serve(args)) => commands::serve::execute(args).await,
        None => commands::serve::execute(cli.serve).await,
    };

    if let Err(err) = result {
        handle_error(&err);
    }
}
