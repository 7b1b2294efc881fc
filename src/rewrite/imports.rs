// Import reference scanner
//
// Finds `} from '<path>';` clauses in (usually minified) JS. Side-effect
// imports (`import './x.js';`) and dynamic imports are not matched.

use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\}\s*from\s*(?:"([^"\r\n]*?)"|'([^'\r\n]*?)')\s*;"#)
        .expect("import pattern is valid")
});

/// One `from '<path>'` clause found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub path: String,
    pub quote: char,
}

impl ImportReference {
    /// Only `./` paths are candidates for rewriting. Bare specifiers and
    /// `../` paths are left alone.
    pub fn is_relative(&self) -> bool {
        self.path.starts_with("./")
    }
}

/// All import references in source order, duplicates included.
pub fn scan_imports(content: &str) -> Vec<ImportReference> {
    IMPORT_RE
        .captures_iter(content)
        .filter_map(|caps| {
            if let Some(m) = caps.get(1) {
                Some(ImportReference {
                    path: m.as_str().to_string(),
                    quote: '"',
                })
            } else {
                caps.get(2).map(|m| ImportReference {
                    path: m.as_str().to_string(),
                    quote: '\'',
                })
            }
        })
        .collect()
}

/// Distinct relative paths, in the order they were first seen.
pub fn unique_relative(refs: &[ImportReference]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for r in refs.iter().filter(|r| r.is_relative()) {
        if !seen.contains(&r.path.as_str()) {
            seen.push(&r.path);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quoted_import() {
        let refs = scan_imports("import {y} from './a.js';");
        assert_eq!(
            refs,
            vec![ImportReference {
                path: "./a.js".to_string(),
                quote: '\''
            }]
        );
        assert!(refs[0].is_relative());
    }

    #[test]
    fn test_minified_line_with_many_imports() {
        let src = r#"import{a as b}from"./util.js";import{c}from './dom.js' ;import{d}from"lit";"#;
        let paths: Vec<_> = scan_imports(src).into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["./util.js", "./dom.js", "lit"]);
    }

    #[test]
    fn test_requires_semicolon_and_brace() {
        assert!(scan_imports("import x from './a.js';").is_empty());
        assert!(scan_imports("import {x} from './a.js'").is_empty());
    }

    #[test]
    fn test_mismatched_quotes_not_matched() {
        assert!(scan_imports(r#"import {x} from './a.js";"#).is_empty());
    }

    #[test]
    fn test_unique_relative_skips_bare_and_parent() {
        let refs = scan_imports(
            "import {a} from './a.js';import {b} from 'pkg';\
             import {c} from '../c.js';import {d} from './a.js';",
        );
        assert_eq!(unique_relative(&refs), vec!["./a.js"]);
    }

    #[test]
    fn test_multiline_named_imports() {
        let src = "import {\n  one,\n  two\n} from './many.js';\n";
        assert_eq!(scan_imports(src)[0].path, "./many.js");
    }
}
