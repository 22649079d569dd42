//! CLI module for vidstrip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::RemuxConfig;

pub mod args;
pub mod commands;

pub use args::{BatchArgs, InspectArgs, StripArgs};

/// vidstrip - remove audio from media files without re-encoding
#[derive(Parser, Debug)]
#[command(name = "vidstrip")]
#[command(about = "Copy media files without their audio streams, no re-encoding")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: vidstrip.toml in the working directory, if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy one file, dropping the streams the selection does not keep
    Strip(StripArgs),
    /// Process every matching file in a directory
    Batch(BatchArgs),
    /// Show a file's streams and which ones the selection keeps
    Inspect(InspectArgs),
}

impl Cli {
    /// Apply the global flags on top of file and environment configuration
    pub fn apply_global(&self, config: &mut RemuxConfig) {
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if self.json_logs {
            config.log.json = true;
        }
    }
}
