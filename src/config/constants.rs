// Project-wide constants
//
// Import via `use crate::config::constants::*;`.

/// Project config file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "cachebust.toml";

/// Directory under the platform config dir holding the user-level config.
pub const USER_CONFIG_DIR: &str = "cachebust";

pub const USER_CONFIG_FILE: &str = "config.toml";

/// Hex digits in a content hash segment (`app.3f2a9c1b77de.js`).
///
/// Matches Django's `ManifestStaticFilesStorage`, which keeps the first
/// 12 characters of the MD5 digest.
pub const HASH_LEN: usize = 12;

/// Default file selection for a target.
pub const DEFAULT_SRC_GLOB: &str = "**/*.js";

/// Name of the target built from command-line flags alone.
pub const CLI_TARGET_NAME: &str = "cli";
