//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for uyac.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Struct containing the CLI configuration for uyac.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of uyac.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings (like unsupported array-from-identifier
    /// initializers) are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the compiler, e.g., which
    /// phase is currently running.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the compiler.
    /// Note: This output can be quite clunky, since _very much_ will be logged.
    #[value(alias("3"))]
    Debug,

    /// Log extra information. This can include more precise debug output or even
    /// non-important diagnostics.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lower a type-checked AST to a C99 translation unit.
    Build(BuildArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// The path to the serialized AST (JSON, `ast::Program`) to lower.
    #[arg(index = 1)]
    pub file: PathBuf,

    /// Whether to dump the deserialized AST (for debugging).
    #[arg(long)]
    pub dump_ast: bool,

    /// Suppress `#line` directives referencing the original source.
    #[arg(long)]
    pub no_line_directives: bool,

    /// The path to the output C file. Defaults to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
