//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::models::{Config, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "repositories")]
#[command(about = "Batch repository fetcher with fallback cache", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server flags, used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (the default)
    Serve(ServeArgs),

    /// Write a default configuration file
    Init(InitArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to listen on (":8080" binds all interfaces)
    #[arg(long, env = "REPOSITORIES_ADDR")]
    pub addr: Option<String>,

    /// Base URL of the upstream repository service
    #[arg(long, env = "REPOSITORIES_REPOSITORY_ADDR")]
    pub repository_addr: Option<String>,

    /// Configuration file (defaults to ./repositories.yaml if present)
    #[arg(short, long, env = "REPOSITORIES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "REPOSITORIES_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Stdout log format
    #[arg(long, value_enum, env = "REPOSITORIES_LOG_FORMAT")]
    pub log_format: Option<LogFormatArg>,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,

    /// Target file
    #[arg(default_value = "repositories.yaml")]
    pub path: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

impl ServeArgs {
    /// Apply flags on top of loaded configuration. Flags win.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(addr) = &self.addr {
            config.server.addr = normalize_addr(addr);
        }
        if let Some(url) = &self.repository_addr {
            config.upstream.base_url.clone_from(url);
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(format) = self.log_format {
            config.logging.format = format.into();
        }
    }
}

/// Expand a bare `:port` into an all-interfaces socket address.
pub fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}
