// Path normalization for manifest lookups
//
// Everything here works on `/`-separated strings, since both JS import
// paths and manifest keys use URL-style separators regardless of platform.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::config::constants::HASH_LEN;

static HASHED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\.[a-f0-9]{{{HASH_LEN}}}\.js$")).expect("hash pattern is valid")
});

/// True when the file name carries a content hash, e.g. `app.3f2a9c1b77de.js`.
pub fn is_hashed_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| HASHED_NAME_RE.is_match(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Join a `./` reference onto the directory of the file that contains it.
///
/// `file` is the `/`-separated name of the importing file. `.` and `..`
/// segments are collapsed; `..` past the top is dropped.
pub fn resolve_reference(file: &str, reference: &str) -> String {
    let file = file.replace('\\', "/");
    let dir = match file.rfind('/') {
        Some(idx) => &file[..idx],
        None => "",
    };
    let rel = reference.strip_prefix("./").unwrap_or(reference);

    let absolute = file.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for seg in dir.split('/').chain(rel.split('/')) {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Strip the static root from a resolved path to get the manifest key.
pub fn lookup_key<'a>(resolved: &'a str, static_root: &str) -> &'a str {
    let root = static_root.trim_start_matches("./");
    if root.is_empty() {
        return resolved;
    }
    let path = resolved.trim_start_matches("./");

    if root.ends_with('/') {
        return path.strip_prefix(root).unwrap_or(resolved);
    }
    match path.strip_prefix(root) {
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => resolved,
    }
}

/// The reference with its last segment swapped for the hashed base name.
///
/// `./lib/dom.js` + `app/lib/dom.fedcba987654.js` -> `./lib/dom.fedcba987654.js`
pub fn replacement_for(reference: &str, hashed_output: &str) -> String {
    let base = hashed_output
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(hashed_output);
    let dir = match reference.rfind('/') {
        Some(idx) => &reference[..=idx],
        None => "./",
    };
    format!("{dir}{base}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hashed_file() {
        assert!(is_hashed_file(Path::new("dist/x.7f7f7f7f7f7f.js")));
        assert!(is_hashed_file(Path::new("a.b.0123456789ab.js")));
        assert!(!is_hashed_file(Path::new("dist/x.js")));
        assert!(!is_hashed_file(Path::new("x.7F7F7F7F7F7F.js")));
        assert!(!is_hashed_file(Path::new("x.7f7f7f7f7f.js")));
        assert!(!is_hashed_file(Path::new("x.7f7f7f7f7f7f.js.map")));
        assert!(!is_hashed_file(Path::new("x.7f7f7f7f7f7f.js.gz")));
    }

    #[test]
    fn test_hash_in_directory_name_does_not_count() {
        assert!(!is_hashed_file(Path::new("build.0123456789ab.js/x.js")));
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("dist/x.js", "./a.js"), "dist/a.js");
        assert_eq!(resolve_reference("x.js", "./a.js"), "a.js");
        assert_eq!(resolve_reference("./x.js", "./a.js"), "a.js");
        assert_eq!(resolve_reference("a/b/x.js", "./../c.js"), "a/c.js");
        assert_eq!(resolve_reference("/srv/static/x.js", "./y/z.js"), "/srv/static/y/z.js");
        assert_eq!(resolve_reference(r"win\dir\x.js", "./a.js"), "win/dir/a.js");
    }

    #[test]
    fn test_lookup_key_strips_root() {
        assert_eq!(lookup_key("static/app/a.js", "static/"), "app/a.js");
        assert_eq!(lookup_key("static/app/a.js", "static"), "app/a.js");
        assert_eq!(lookup_key("static/app/a.js", "./static/"), "app/a.js");
        assert_eq!(lookup_key("staticfoo/a.js", "static"), "staticfoo/a.js");
        assert_eq!(lookup_key("other/a.js", "static/"), "other/a.js");
        assert_eq!(lookup_key("a.js", ""), "a.js");
    }

    #[test]
    fn test_replacement_for() {
        assert_eq!(
            replacement_for("./a.js", "src/a.ab12cd34ef56.js"),
            "./a.ab12cd34ef56.js"
        );
        assert_eq!(replacement_for("./a.js", "a.ab12cd34ef56.js"), "./a.ab12cd34ef56.js");
    }

    #[test]
    fn test_replacement_keeps_reference_directory() {
        assert_eq!(
            replacement_for("./lib/dom.js", "app/lib/dom.fedcba987654.js"),
            "./lib/dom.fedcba987654.js"
        );
        assert_eq!(
            replacement_for("./a/../b/c.js", "b/c.0123456789ab.js"),
            "./a/../b/c.0123456789ab.js"
        );
    }
}
