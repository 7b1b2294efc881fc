// Configuration loader
// Loads targets from ./cachebust.toml, the user config dir, or an explicit path

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::constants::{CONFIG_FILE_NAME, USER_CONFIG_DIR, USER_CONFIG_FILE};
use super::settings::{Config, ConfigFile, Overrides};
use crate::errors;

/// Load configuration and apply command-line overrides.
///
/// Lookup order: `explicit` (must exist), `./cachebust.toml`, then
/// `<config dir>/cachebust/config.toml`. With no file at all, the flags
/// alone must describe a target.
pub fn load_config(explicit: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    let mut config = match find_config_file(explicit)? {
        Some(path) => load_from_file(&path)?,
        None => {
            debug!("No config file found, using command-line flags only");
            Config::default()
        }
    };

    config.apply_overrides(overrides);

    if config.targets.is_empty() {
        bail!(errors::with_suggestion(
            "No targets configured.",
            &format!(
                "create {CONFIG_FILE_NAME} with a [targets.<name>] table, \
                 or pass --manifest and --cwd"
            ),
        ));
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("Configuration file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    if let Some(dir) = dirs::config_dir() {
        let user = dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
        if user.is_file() {
            return Ok(Some(user));
        }
    }

    Ok(None)
}

/// Parse a config file. Relative paths inside it resolve against its directory.
pub fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&contents).map_err(|e| {
        anyhow::anyhow!(errors::with_suggestion(
            &format!("Failed to parse {}: {}", path.display(), e),
            "check the [defaults] and [targets.<name>] tables",
        ))
    })?;

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    debug!(path = %path.display(), targets = file.targets.len(), "Loaded config file");
    Ok(Config::from_file(file, base_dir, Some(path.to_path_buf())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::CLI_TARGET_NAME;

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cachebust.toml");
        fs::write(
            &path,
            "[targets.app]\nmanifest = \"staticfiles.json\"\ncwd = \"static\"\n",
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        let app = &config.targets[0];
        assert_eq!(app.manifest, Some(dir.path().join("staticfiles.json")));
        assert_eq!(app.files.cwd, dir.path().join("static"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), &Overrides::default()).is_err());
    }

    #[test]
    fn test_bad_toml_mentions_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cachebust.toml");
        fs::write(&path, "[targets.app\n").unwrap();
        let err = load_from_file(&path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse"), "got: {}", err);
    }

    #[test]
    fn test_explicit_file_with_manifest_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cachebust.toml");
        fs::write(&path, "[defaults]\nstatic_dir = \"static/\"\n").unwrap();

        let overrides = Overrides {
            manifest: Some(dir.path().join("m.json")),
            ..Default::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].name, CLI_TARGET_NAME);
        assert_eq!(config.targets[0].static_dir, "static/");
    }
}
