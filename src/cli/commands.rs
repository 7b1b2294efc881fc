// Command handlers
//
// Each handler writes its user-facing output to `out`; logs go through
// tracing.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::Command;
use crate::config::{Config, Target};
use crate::errors::RewriteError;
use crate::rewrite::paths::is_hashed_file;
use crate::rewrite::{run_task, scan_imports, RewriteReport};

#[derive(Serialize)]
struct TargetReport<'a> {
    target: &'a str,
    #[serde(flatten)]
    report: &'a RewriteReport,
}

/// Dispatch a parsed command. `config` is loaded lazily: `scan` needs none.
pub fn execute<W, F>(command: &Command, load: F, out: &mut W) -> Result<()>
where
    W: Write,
    F: FnOnce() -> Result<Config>,
{
    match command {
        Command::Run {
            targets,
            dry_run,
            json,
            strict,
        } => {
            let config = load()?;
            run_targets(&config, targets, *dry_run, *json, *strict, out)
        }
        Command::Scan { files } => scan_files(files, out),
        Command::Targets => {
            let config = load()?;
            list_targets(&config, out)
        }
    }
}

pub fn run_targets<W: Write>(
    config: &Config,
    names: &[String],
    dry_run: bool,
    json: bool,
    strict: bool,
    out: &mut W,
) -> Result<()> {
    for target in config.select(names)? {
        match run_target(target, dry_run, strict) {
            Ok(report) => print_report(target, &report, json, out)?,
            Err(e) => {
                if let Some(RewriteError::FilesFailed { report }) = e.downcast_ref::<RewriteError>()
                {
                    print_report(target, report, json, out)?;
                }
                return Err(e.context(format!("Target \"{}\" failed", target.name)));
            }
        }
    }
    Ok(())
}

fn run_target(target: &Target, dry_run: bool, strict: bool) -> Result<RewriteReport> {
    let manifest_path = target
        .manifest
        .as_deref()
        .with_context(|| format!("Target \"{}\" has no manifest", target.name))?;
    let files = target.files.expand()?;
    info!(target = %target.name, files = files.len(), "Running target");

    Ok(run_task(
        manifest_path,
        &files,
        target.rewrite_options(dry_run, strict),
    )?)
}

fn print_report<W: Write>(
    target: &Target,
    report: &RewriteReport,
    json: bool,
    out: &mut W,
) -> Result<()> {
    if json {
        let line = serde_json::to_string(&TargetReport {
            target: &target.name,
            report,
        })
        .context("Failed to serialize report")?;
        writeln!(out, "{}", line)?;
    } else {
        writeln!(out, "{}", report.summary_line())?;
    }
    Ok(())
}

pub fn scan_files<W: Write>(files: &[PathBuf], out: &mut W) -> Result<()> {
    for path in files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let refs = scan_imports(&content);

        let marker = if is_hashed_file(path) { " [hashed]" } else { "" };
        writeln!(out, "{}{}", path.display(), marker)?;
        if refs.is_empty() {
            writeln!(out, "  (no imports)")?;
        }
        for r in &refs {
            let kind = if r.is_relative() { "relative" } else { "skipped" };
            writeln!(out, "  {q}{}{q} ({})", r.path, kind, q = r.quote)?;
        }
    }
    Ok(())
}

pub fn list_targets<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    if let Some(source) = &config.source {
        writeln!(out, "# {}", source.display())?;
    }
    for target in &config.targets {
        writeln!(out, "{}", target.name)?;
        if let Some(manifest) = &target.manifest {
            writeln!(out, "  manifest:   {}", manifest.display())?;
        }
        writeln!(out, "  static_dir: {}", target.static_dir)?;
        writeln!(out, "  cwd:        {}", target.files.cwd.display())?;
        writeln!(out, "  src:        {}", target.files.src.join(", "))?;
        if let Some(dest) = &target.files.dest {
            writeln!(out, "  dest:       {}", dest.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use std::path::Path;

    fn config_for(manifest: &Path, cwd: &Path, static_dir: &str) -> Config {
        let mut config = Config::default();
        config.apply_overrides(&Overrides {
            manifest: Some(manifest.to_path_buf()),
            static_dir: Some(static_dir.to_string()),
            cwd: Some(cwd.to_path_buf()),
            ..Default::default()
        });
        config
    }

    #[test]
    fn test_run_prints_summary_and_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("staticfiles.json");
        fs::write(
            &manifest,
            r#"{"paths": {"src/a.js": "src/a.ab12cd34ef56.js"}}"#,
        )
        .unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        let file = dist.join("x.7f7f7f7f7f7f.js");
        fs::write(&file, "import {y} from './a.js';").unwrap();

        let config = config_for(&manifest, &dist, "src/");
        let mut out = Vec::new();
        run_targets(&config, &[], false, false, false, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Replacements made in 1 file.\n");
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "import {y} from './a.ab12cd34ef56.js';"
        );
    }

    #[test]
    fn test_run_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("staticfiles.json");
        fs::write(&manifest, r#"{"paths": {}}"#).unwrap();

        let config = config_for(&manifest, dir.path(), "");
        let mut out = Vec::new();
        run_targets(&config, &[], true, true, false, &mut out).unwrap();

        let line: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(line["target"], "cli");
        assert_eq!(line["dry_run"], true);
        assert!(line["outcomes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_run_missing_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("nope.json"), dir.path(), "");
        let mut out = Vec::new();
        let err = run_targets(&config, &[], false, false, false, &mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("not found"), "got: {:#}", err);
        assert!(out.is_empty());
    }

    #[test]
    fn test_scan_lists_references() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.0123456789ab.js");
        fs::write(&file, r#"import{a}from'./a.js';import{b}from"lit";"#).unwrap();

        let mut out = Vec::new();
        scan_files(&[file], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[hashed]"));
        assert!(text.contains("  './a.js' (relative)"));
        assert!(text.contains("  \"lit\" (skipped)"));
    }

    #[test]
    fn test_list_targets() {
        let config = config_for(Path::new("m.json"), Path::new("dist"), "static/");
        let mut out = Vec::new();
        list_targets(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("cli\n"));
        assert!(text.contains("static_dir: static/"));
    }

    #[test]
    fn test_scan_does_not_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "").unwrap();

        let command = Command::Scan { files: vec![file] };
        let mut out = Vec::new();
        execute(&command, || anyhow::bail!("config should not load"), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("(no imports)"));
    }
}
