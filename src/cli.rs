// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `scriptchain`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "scriptchain",
    version,
    about = "Run a chain of scripts one after another, watching their processes.",
    long_about = None
)]
pub struct CliArgs {
    /// Name of the chain to run.
    #[arg(long, value_name = "NAME", default_value = "01")]
    pub chain: String,

    /// Exit once the chain is done, regardless of the chain's setting.
    #[arg(long)]
    pub close: bool,

    /// Shut the machine down once the chain is done, regardless of the
    /// chain's setting.
    #[arg(long)]
    pub shutdown: bool,

    /// Directory holding `<chain>.toml` files.
    ///
    /// If omitted, `SCRIPTCHAIN_CONFIG_DIR` or `config/script_chain` is used.
    #[arg(long, value_name = "PATH")]
    pub config_dir: Option<String>,

    /// How step start/finish notifications are delivered.
    #[arg(long, value_enum, value_name = "KIND", default_value = "desktop")]
    pub notifier: NotifierKind,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SCRIPTCHAIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load the chain, print its steps and their validity, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the names of the stored chains and exit.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Notification delivery as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum NotifierKind {
    Desktop,
    None,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
