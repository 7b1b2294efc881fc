// cachebust - cache-busting import rewriter
// Library exports

pub mod cli;
pub mod config;
pub mod errors;
pub mod files;
pub mod logging;
pub mod manifest;
pub mod rewrite;

pub use errors::{ConfigError, GlobError, ManifestError, RewriteError};
pub use files::FileSet;
pub use manifest::Manifest;
pub use rewrite::{
    run_task, FileDescriptor, FileOutcome, MissPolicy, RewriteOptions, RewriteReport, Rewriter,
};
