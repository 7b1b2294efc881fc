// Command-line interface

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

/// cachebust - point JS imports at content-hashed static files
#[derive(Parser, Debug)]
#[command(name = "cachebust")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: ./cachebust.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that describe or override a target.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// JSON manifest; replaces configured targets with a single ad-hoc one
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Prefix stripped from resolved import paths to form manifest keys
    #[arg(long, global = true)]
    pub static_dir: Option<String>,

    /// Directory to search for files
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// File glob relative to --cwd; prefix with ! to exclude (repeatable)
    #[arg(long = "src", global = true)]
    pub src: Vec<String>,

    /// Write rewritten files under this directory instead of in place
    #[arg(long, global = true)]
    pub dest: Option<PathBuf>,
}

impl TargetArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            manifest: self.manifest.clone(),
            static_dir: self.static_dir.clone(),
            cwd: self.cwd.clone(),
            src: self.src.clone(),
            dest: self.dest.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite imports in hashed files
    Run {
        /// Only run these targets (repeatable; default: all)
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON instead of a summary line
        #[arg(long)]
        json: bool,

        /// Fail when an import has no manifest entry
        #[arg(long)]
        strict: bool,
    },

    /// List import references found in files
    Scan {
        /// Files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List configured targets
    Targets,
}
