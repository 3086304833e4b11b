//! Command-line interface for appframe.
use std::{path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::logging::Severity;

/// Verbosity of the process diagnostics (`tracing`), given either by name
/// ("info", "debug", ...) or as a number from 0 (off) to 5 (trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// Directive string understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("log level cannot be empty".into());
        }

        const BY_NUMBER: [LevelFilter; 6] = [
            LevelFilter::OFF,
            LevelFilter::ERROR,
            LevelFilter::WARN,
            LevelFilter::INFO,
            LevelFilter::DEBUG,
            LevelFilter::TRACE,
        ];
        if let Ok(number) = trimmed.parse::<usize>() {
            return BY_NUMBER
                .get(number)
                .copied()
                .map(LogLevelArg)
                .ok_or_else(|| format!("unsupported log level number '{number}' (expected 0-5)"));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "off" => Ok(LevelFilter::OFF),
            "error" | "err" => Ok(LevelFilter::ERROR),
            "warn" | "warning" => Ok(LevelFilter::WARN),
            "info" => Ok(LevelFilter::INFO),
            "debug" => Ok(LevelFilter::DEBUG),
            "trace" => Ok(LevelFilter::TRACE),
            _ => Err(format!("invalid log level '{trimmed}'")),
        }
        .map(LogLevelArg)
    }
}

/// Command-line interface for appframe.
#[derive(Parser)]
#[command(name = "appframe", version)]
#[command(about = "A minimal application scaffold: init, run, shutdown", long_about = None)]
pub struct Cli {
    /// Verbosity of process diagnostics for this invocation only.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for appframe.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize, run and shut down the application.
    Run {
        /// Path to the configuration file (defaults to `appframe.yaml` if present).
        #[arg(short, long)]
        config: Option<String>,

        /// Exit code carried by the scripted quit event.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        exit_code: i32,

        /// Simulate the platform refusing to create the main window.
        #[arg(long)]
        fail_window: bool,

        /// Wait for Ctrl-C instead of quitting immediately.
        #[arg(long)]
        wait: bool,

        /// Write the application log to this file instead of the configured one.
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,

        /// Drop application log messages below this severity.
        #[arg(long, value_name = "SEVERITY")]
        min_severity: Option<Severity>,
    },

    /// Print the resolved configuration.
    Config {
        /// Path to the configuration file (defaults to `appframe.yaml` if present).
        #[arg(short, long)]
        config: Option<String>,

        /// Emit JSON instead of YAML.
        #[arg(long)]
        json: bool,
    },
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
