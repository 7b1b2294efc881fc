// Per-run results
//
// Each invocation returns one of these instead of bumping shared counters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Content changed and was written (or would be, in a dry run).
    Rewritten { replacements: usize },
    /// Eligible and read, but nothing resolved. Bytes on disk untouched.
    Unchanged,
    /// Name carries no content hash; never opened.
    NotHashed,
    /// Listed by the file set but gone by the time we got to it.
    Missing,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    /// Relative imports that had no manifest entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub outcomes: Vec<FileResult>,
}

impl RewriteReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            outcomes: Vec::new(),
        }
    }

    pub fn files_modified(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Rewritten { .. }))
            .count()
    }

    pub fn replacements(&self) -> usize {
        self.outcomes
            .iter()
            .map(|r| match r.outcome {
                FileOutcome::Rewritten { replacements } => replacements,
                _ => 0,
            })
            .sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileResult> {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed { .. }))
    }

    pub fn missing(&self) -> impl Iterator<Item = &FileResult> {
        self.outcomes
            .iter()
            .filter(|r| r.outcome == FileOutcome::Missing)
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// The one line shown to the user after a run.
    pub fn summary_line(&self) -> String {
        let count = self.files_modified();
        let noun = if count == 1 { "file" } else { "files" };
        if self.dry_run {
            format!("Replacements would be made in {count} {noun}.")
        } else {
            format!("Replacements made in {count} {noun}.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(path: &str, outcome: FileOutcome) -> FileResult {
        FileResult {
            path: PathBuf::from(path),
            outcome,
            unresolved: Vec::new(),
        }
    }

    #[test]
    fn test_summary_pluralizes() {
        let mut report = RewriteReport::new(false);
        assert_eq!(report.summary_line(), "Replacements made in 0 files.");

        report
            .outcomes
            .push(result("a.0123456789ab.js", FileOutcome::Rewritten { replacements: 2 }));
        assert_eq!(report.summary_line(), "Replacements made in 1 file.");

        report
            .outcomes
            .push(result("b.0123456789ab.js", FileOutcome::Rewritten { replacements: 1 }));
        report.outcomes.push(result("c.js", FileOutcome::NotHashed));
        assert_eq!(report.summary_line(), "Replacements made in 2 files.");
        assert_eq!(report.replacements(), 3);
    }

    #[test]
    fn test_dry_run_summary() {
        let report = RewriteReport::new(true);
        assert_eq!(report.summary_line(), "Replacements would be made in 0 files.");
    }

    #[test]
    fn test_failures_are_counted() {
        let mut report = RewriteReport::new(false);
        report.outcomes.push(result("a.js", FileOutcome::Missing));
        assert!(!report.has_failures());
        report.outcomes.push(result(
            "b.0123456789ab.js",
            FileOutcome::Failed {
                error: "permission denied".to_string(),
            },
        ));
        assert!(report.has_failures());
        assert_eq!(report.missing().count(), 1);
    }

    #[test]
    fn test_serializes_status_tag() {
        let json = serde_json::to_value(result(
            "a.0123456789ab.js",
            FileOutcome::Rewritten { replacements: 1 },
        ))
        .unwrap();
        assert_eq!(json["status"], "rewritten");
        assert_eq!(json["replacements"], 1);
        assert!(json.get("unresolved").is_none());
    }
}
