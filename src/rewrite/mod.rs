// Cache-busting import rewrite
//
// Scans hashed JS files for relative imports and points them at the
// hashed file names recorded in the manifest.

pub mod imports;
pub mod paths;
mod report;
mod rewriter;

pub use imports::{scan_imports, ImportReference};
pub use report::{FileOutcome, FileResult, RewriteReport};
pub use rewriter::{
    run_task, ContentRewrite, FileDescriptor, MissPolicy, RewriteOptions, Rewriter,
};
