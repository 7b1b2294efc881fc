// Configuration structs

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::constants::{CLI_TARGET_NAME, DEFAULT_SRC_GLOB};
use crate::errors::ConfigError;
use crate::files::FileSet;
use crate::rewrite::{MissPolicy, RewriteOptions};

/// Values shared by every target unless the target sets its own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDefaults {
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    #[serde(default)]
    pub static_dir: Option<String>,
    #[serde(default)]
    pub on_missing: Option<MissPolicy>,
}

/// One `[targets.<name>]` table as written in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEntry {
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    #[serde(default)]
    pub static_dir: Option<String>,
    #[serde(default)]
    pub on_missing: Option<MissPolicy>,
    #[serde(default = "default_cwd")]
    pub cwd: PathBuf,
    #[serde(default = "default_src")]
    pub src: Vec<String>,
    #[serde(default)]
    pub dest: Option<PathBuf>,
}

fn default_cwd() -> PathBuf {
    PathBuf::from(".")
}

fn default_src() -> Vec<String> {
    vec![DEFAULT_SRC_GLOB.to_string()]
}

/// The TOML document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: TargetDefaults,
    #[serde(default)]
    pub targets: BTreeMap<String, TargetEntry>,
}

/// A fully resolved target, ready to run.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    /// `None` until validation; a target without one is rejected.
    pub manifest: Option<PathBuf>,
    pub static_dir: String,
    pub on_missing: MissPolicy,
    pub files: FileSet,
}

impl Target {
    pub fn rewrite_options(&self, dry_run: bool, strict: bool) -> RewriteOptions {
        RewriteOptions {
            static_root: self.static_dir.clone(),
            on_missing: if strict {
                MissPolicy::Fail
            } else {
                self.on_missing
            },
            dry_run,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.is_none() {
            return Err(ConfigError::MissingManifest {
                target: self.name.clone(),
            });
        }
        if self.files.src.is_empty() {
            return Err(ConfigError::EmptySources {
                target: self.name.clone(),
            });
        }
        self.files
            .validate()
            .map_err(|source| ConfigError::InvalidGlob {
                target: self.name.clone(),
                source,
            })
    }
}

/// Command-line flags that override or replace file configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub manifest: Option<PathBuf>,
    pub static_dir: Option<String>,
    pub cwd: Option<PathBuf>,
    pub src: Vec<String>,
    pub dest: Option<PathBuf>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.manifest.is_none()
            && self.static_dir.is_none()
            && self.cwd.is_none()
            && self.src.is_empty()
            && self.dest.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File the configuration came from, if any.
    pub source: Option<PathBuf>,
    pub defaults: TargetDefaults,
    pub targets: Vec<Target>,
}

impl Config {
    /// Resolve a parsed file. Relative paths are taken relative to `base_dir`.
    pub fn from_file(file: ConfigFile, base_dir: &Path, source: Option<PathBuf>) -> Self {
        let defaults = TargetDefaults {
            manifest: file.defaults.manifest.map(|p| join_base(base_dir, p)),
            ..file.defaults
        };

        let targets = file
            .targets
            .into_iter()
            .map(|(name, entry)| {
                let mut files = FileSet::new(join_base(base_dir, entry.cwd), entry.src);
                files.dest = entry.dest.map(|p| join_base(base_dir, p));
                Target {
                    name,
                    manifest: entry
                        .manifest
                        .map(|p| join_base(base_dir, p))
                        .or_else(|| defaults.manifest.clone()),
                    static_dir: entry
                        .static_dir
                        .or_else(|| defaults.static_dir.clone())
                        .unwrap_or_default(),
                    on_missing: entry.on_missing.or(defaults.on_missing).unwrap_or_default(),
                    files,
                }
            })
            .collect();

        Self {
            source,
            defaults,
            targets,
        }
    }

    /// Apply command-line flags.
    ///
    /// With `--manifest` the file's targets are replaced by a single ad-hoc
    /// target. Otherwise the flags override every configured target.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if overrides.is_empty() {
            return;
        }

        if let Some(manifest) = &overrides.manifest {
            let src = if overrides.src.is_empty() {
                default_src()
            } else {
                overrides.src.clone()
            };
            let mut files = FileSet::new(overrides.cwd.clone().unwrap_or_else(default_cwd), src);
            files.dest = overrides.dest.clone();
            self.targets = vec![Target {
                name: CLI_TARGET_NAME.to_string(),
                manifest: Some(manifest.clone()),
                static_dir: overrides
                    .static_dir
                    .clone()
                    .or_else(|| self.defaults.static_dir.clone())
                    .unwrap_or_default(),
                on_missing: self.defaults.on_missing.unwrap_or_default(),
                files,
            }];
            return;
        }

        for target in &mut self.targets {
            if let Some(static_dir) = &overrides.static_dir {
                target.static_dir = static_dir.clone();
            }
            if let Some(cwd) = &overrides.cwd {
                target.files.cwd = cwd.clone();
            }
            if !overrides.src.is_empty() {
                target.files.src = overrides.src.clone();
            }
            if let Some(dest) = &overrides.dest {
                target.files.dest = Some(dest.clone());
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        self.targets.iter().try_for_each(Target::validate)
    }

    /// Targets to run, in file order. An empty selection means all of them.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Target>, ConfigError> {
        if names.is_empty() {
            return Ok(self.targets.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.targets
                    .iter()
                    .find(|t| &t.name == name)
                    .ok_or_else(|| ConfigError::UnknownTarget(name.clone()))
            })
            .collect()
    }
}

fn join_base(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
