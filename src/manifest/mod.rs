// Manifest loader
//
// Reads the JSON map written by the static-file hashing step:
//
//   { "paths": { "app/util.js": "app/util.3f2a9c1b77de.js" }, "version": "1.0" }
//
// Only `paths` is used. The manifest is immutable once loaded.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::errors::ManifestError;

#[derive(Debug, Deserialize)]
struct ManifestFile {
    paths: HashMap<String, String>,
}

/// Logical asset path -> content-hashed output path.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    paths: HashMap<String, String>,
}

impl Manifest {
    /// Load a manifest from disk.
    ///
    /// Errors if the file is missing, unreadable, or not a JSON object with
    /// a `paths` map of strings. An empty `paths` map is fine.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.is_file() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let file: ManifestFile = serde_json::from_str(json)?;
        Ok(Self { paths: file.paths })
    }

    pub fn from_paths<I, K, V>(paths: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Find the hashed output for a lookup key.
    ///
    /// Tries the key as-is, then with the static root prefixed, for
    /// manifests whose keys still carry the static root.
    pub fn lookup(&self, key: &str, static_root: &str) -> Option<&str> {
        if let Some(hashed) = self.paths.get(key) {
            return Some(hashed.as_str());
        }

        let root = static_root.trim_start_matches("./");
        if root.is_empty() {
            return None;
        }

        let prefixed = if root.ends_with('/') {
            format!("{root}{key}")
        } else {
            format!("{root}/{key}")
        };
        self.paths.get(&prefixed).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
