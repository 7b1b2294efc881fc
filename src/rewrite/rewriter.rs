// Import rewriter - points relative imports in hashed JS files at their
// hashed siblings.
//
// A file is read, rewritten fully in memory and written back once. Files
// where nothing resolved are never written.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::imports::{scan_imports, unique_relative};
use super::paths::{is_hashed_file, lookup_key, replacement_for, resolve_reference};
use super::report::{FileOutcome, FileResult, RewriteReport};
use crate::errors::RewriteError;
use crate::manifest::Manifest;

/// What to do when a relative import has no manifest entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    /// Log a warning and leave that import alone. Partial manifests are
    /// normal during incremental builds.
    #[default]
    Warn,
    /// Treat the file as failed and leave it untouched.
    Fail,
}

#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// Prefix stripped from resolved import paths to form manifest keys.
    pub static_root: String,
    pub on_missing: MissPolicy,
    /// Compute everything, write nothing.
    pub dry_run: bool,
}

/// A file handed to the rewriter by the file-set expansion (or built by hand).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// File to read.
    pub src: PathBuf,
    /// Where to write; `None` rewrites `src` in place.
    pub dest: Option<PathBuf>,
    /// `/`-separated name imports are resolved against.
    pub name: String,
}

impl FileDescriptor {
    pub fn new(src: impl Into<PathBuf>) -> Self {
        let src = src.into();
        let name = src.to_string_lossy().replace('\\', "/");
        Self {
            src,
            dest: None,
            name,
        }
    }

    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn output_path(&self) -> &Path {
        self.dest.as_deref().unwrap_or(&self.src)
    }

    fn writes_in_place(&self) -> bool {
        self.dest.as_deref().map_or(true, |d| d == self.src)
    }
}

/// Result of rewriting one file's content in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRewrite {
    /// New content, if anything changed.
    pub content: Option<String>,
    pub replacements: usize,
    pub unresolved: Vec<String>,
}

pub struct Rewriter<'m> {
    manifest: &'m Manifest,
    options: RewriteOptions,
}

impl<'m> Rewriter<'m> {
    pub fn new(manifest: &'m Manifest, options: RewriteOptions) -> Self {
        Self { manifest, options }
    }

    /// Rewrite every resolvable `./` import in `content`.
    ///
    /// `name` is the importing file's path as the manifest sees it.
    pub fn rewrite_content(&self, name: &str, content: &str) -> ContentRewrite {
        let refs = scan_imports(content);
        let mut updated = content.to_string();
        let mut replacements = 0;
        let mut unresolved = Vec::new();

        for path in unique_relative(&refs) {
            if is_hashed_file(Path::new(path)) {
                // already points at a hashed file
                continue;
            }

            let resolved = resolve_reference(name, path);
            let key = lookup_key(&resolved, &self.options.static_root);

            let Some(hashed) = self.manifest.lookup(key, &self.options.static_root) else {
                unresolved.push(path.to_string());
                continue;
            };

            let replacement = replacement_for(path, hashed);
            if replacement == path {
                continue;
            }

            for quote in ['\'', '"'] {
                let needle = format!("{quote}{path}{quote}");
                let count = updated.matches(&needle).count();
                if count > 0 {
                    updated = updated.replace(&needle, &format!("{quote}{replacement}{quote}"));
                    replacements += count;
                }
            }
            debug!(file = name, import = path, %replacement, "resolved import");
        }

        let content = (replacements > 0 && updated != content).then_some(updated);
        ContentRewrite {
            content,
            replacements,
            unresolved,
        }
    }

    /// Process one file: filter, read, rewrite, write.
    pub fn process(&self, file: &FileDescriptor) -> FileResult {
        let (outcome, unresolved) = self.process_inner(file);
        FileResult {
            path: file.src.clone(),
            outcome,
            unresolved,
        }
    }

    fn process_inner(&self, file: &FileDescriptor) -> (FileOutcome, Vec<String>) {
        if !is_hashed_file(&file.src) {
            return (FileOutcome::NotHashed, Vec::new());
        }

        let content = match fs::read_to_string(&file.src) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %file.src.display(), "Source file not found, skipping");
                return (FileOutcome::Missing, Vec::new());
            }
            Err(e) => {
                let error = format!("failed to read {}: {}", file.src.display(), e);
                warn!(path = %file.src.display(), error = %e, "Failed to read source file");
                return (FileOutcome::Failed { error }, Vec::new());
            }
        };

        let rewrite = self.rewrite_content(&file.name, &content);

        for path in &rewrite.unresolved {
            warn!(
                file = %file.src.display(),
                import = %path,
                "No manifest entry for import, leaving it unchanged"
            );
        }

        if self.options.on_missing == MissPolicy::Fail && !rewrite.unresolved.is_empty() {
            let error = format!(
                "no manifest entry for {}",
                rewrite.unresolved.join(", ")
            );
            return (FileOutcome::Failed { error }, rewrite.unresolved);
        }

        let Some(updated) = rewrite.content else {
            return (FileOutcome::Unchanged, rewrite.unresolved);
        };

        if !self.options.dry_run {
            if let Err(e) = write_output(file, &updated) {
                return (
                    FileOutcome::Failed {
                        error: format!("{e:#}"),
                    },
                    rewrite.unresolved,
                );
            }
        }

        (
            FileOutcome::Rewritten {
                replacements: rewrite.replacements,
            },
            rewrite.unresolved,
        )
    }

    /// Process every file in order.
    ///
    /// Keeps going after a per-file failure, then returns
    /// `RewriteError::FilesFailed` so the caller still sees a failed run.
    pub fn run<'a, I>(&self, files: I) -> Result<RewriteReport, RewriteError>
    where
        I: IntoIterator<Item = &'a FileDescriptor>,
    {
        let mut report = RewriteReport::new(self.options.dry_run);

        for file in files {
            let result = self.process(file);
            if let FileOutcome::Failed { error } = &result.outcome {
                warn!(path = %file.src.display(), %error, "File failed");
            }
            report.outcomes.push(result);
        }

        info!(
            files = report.outcomes.len(),
            modified = report.files_modified(),
            dry_run = report.dry_run,
            "Rewrite finished"
        );

        if report.has_failures() {
            return Err(RewriteError::FilesFailed {
                report: Box::new(report),
            });
        }
        Ok(report)
    }
}

/// Load the manifest, then rewrite `files`.
///
/// A manifest problem fails the whole run before any file is opened.
pub fn run_task(
    manifest_path: &Path,
    files: &[FileDescriptor],
    options: RewriteOptions,
) -> Result<RewriteReport, RewriteError> {
    let manifest = Manifest::load(manifest_path)?;
    info!(
        manifest = %manifest_path.display(),
        entries = manifest.len(),
        "Loaded manifest"
    );
    Rewriter::new(&manifest, options).run(files)
}

/// Write through a temp file in the target's directory, then persist it
/// over the target.
///
/// In-place writes follow symlinks, so the linked file is the one replaced.
/// The source file's permissions carry over to the output. The temp file
/// is removed on any failure.
fn write_output(file: &FileDescriptor, content: &str) -> Result<()> {
    let target = if file.writes_in_place() {
        fs::canonicalize(&file.src)
            .with_context(|| format!("Failed to resolve {}", file.src.display()))?
    } else {
        let dest = file.output_path();
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        dest.to_path_buf()
    };

    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

    temp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", temp.path().display()))?;

    let permissions = fs::metadata(&file.src)
        .with_context(|| format!("Failed to read metadata of {}", file.src.display()))?
        .permissions();
    temp.as_file()
        .set_permissions(permissions)
        .with_context(|| format!("Failed to set permissions on {}", temp.path().display()))?;

    temp.persist(&target)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", target.display()))?;

    Ok(())
}
