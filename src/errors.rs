// Error types
//
// Library code returns these typed errors; the binary and the config
// loader wrap them with anyhow context.

use std::path::PathBuf;
use thiserror::Error;

use crate::rewrite::RewriteReport;

/// Failures while loading the JSON manifest. Any of these aborts the run
/// before a single candidate file is opened.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("JSON map file \"{}\" not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read JSON map file \"{}\"", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON map file \"{}\" is not a valid manifest", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The run visited every file but some of them could not be processed.
    /// The report is kept so callers can still show what did succeed.
    #[error("{} of {} files failed", failed_count(.report), .report.outcomes.len())]
    FilesFailed { report: Box<RewriteReport> },
}

fn failed_count(report: &RewriteReport) -> usize {
    report.failed().count()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no targets configured")]
    NoTargets,

    #[error("unknown target \"{0}\"")]
    UnknownTarget(String),

    #[error("target \"{target}\" has no manifest path")]
    MissingManifest { target: String },

    #[error("target \"{target}\" has an empty src list")]
    EmptySources { target: String },

    #[error("target \"{target}\" has an invalid glob")]
    InvalidGlob {
        target: String,
        #[source]
        source: GlobError,
    },
}

#[derive(Debug, Error)]
#[error("invalid glob pattern \"{pattern}\"")]
pub struct GlobError {
    pub pattern: String,
    #[source]
    pub source: glob::PatternError,
}

/// Append a hint line to an error message, shown to the user by the CLI.
pub fn with_suggestion(message: &str, suggestion: &str) -> String {
    format!("{message}\n\n  hint: {suggestion}")
}
