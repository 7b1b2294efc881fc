// File-set expansion
//
// Turns `{ cwd, src: [globs], dest }` into a sorted list of file
// descriptors. Globs are matched against the path relative to `cwd` and
// applied in order: a `!pattern` removes earlier matches, a later plain
// pattern can add them back.

use anyhow::{bail, Result};
use glob::{MatchOptions, Pattern};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::errors::GlobError;
use crate::rewrite::FileDescriptor;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    pub cwd: PathBuf,
    pub src: Vec<String>,
    /// Output directory; relative paths are kept under it.
    pub dest: Option<PathBuf>,
}

struct Rule {
    negated: bool,
    pattern: Pattern,
}

impl FileSet {
    pub fn new(cwd: impl Into<PathBuf>, src: Vec<String>) -> Self {
        Self {
            cwd: cwd.into(),
            src,
            dest: None,
        }
    }

    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    fn rules(&self) -> Result<Vec<Rule>, GlobError> {
        let mut rules = Vec::with_capacity(self.src.len());
        for raw in &self.src {
            let (negated, glob) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let pattern = Pattern::new(glob).map_err(|source| GlobError {
                pattern: raw.clone(),
                source,
            })?;
            rules.push(Rule { negated, pattern });
        }
        Ok(rules)
    }

    /// Check every `src` pattern compiles, without touching the filesystem.
    pub fn validate(&self) -> Result<(), GlobError> {
        self.rules().map(|_| ())
    }

    /// Relative path matches under the ordered include/exclude rules.
    fn is_selected(rules: &[Rule], relative: &str) -> bool {
        let mut selected = false;
        for rule in rules {
            if rule.pattern.matches_with(relative, MATCH_OPTIONS) {
                selected = !rule.negated;
            }
        }
        selected
    }

    pub fn expand(&self) -> Result<Vec<FileDescriptor>> {
        if !self.cwd.is_dir() {
            bail!("File set directory not found: {}", self.cwd.display());
        }
        let rules = self.rules()?;

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.cwd)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            // symlinks count when they point at a file
            if !entry.path().is_file() {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(&self.cwd) else {
                continue;
            };
            let relative = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if !Self::is_selected(&rules, &relative) {
                continue;
            }

            let mut descriptor =
                FileDescriptor::new(entry.path().to_path_buf()).with_name(relative);
            if let Some(dest) = &self.dest {
                descriptor = descriptor.with_dest(dest.join(rel));
            }
            files.push(descriptor);
        }

        Ok(files)
    }
}
