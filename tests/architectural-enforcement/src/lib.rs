//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code; waiting is done on channels,
//!   task handles and `tokio::time::interval`
//! - The conductor core stays free of terminal UI crates
//!
//! The helpers here are shared by the tests under `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this crate
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// One offending line
#[derive(Debug)]
pub struct Violation {
    /// File the line is in
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Scan every `.rs` file under `dir` (relative to the workspace root) for
/// production lines matching `is_violation`.
///
/// Comments are ignored, and scanning of a file stops at its
/// `#[cfg(test)]` module.
pub fn scan(dir: &str, is_violation: impl Fn(&str) -> bool) -> Vec<Violation> {
    let root = workspace_root().join(dir);
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
    {
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if line.trim_start().starts_with("#[cfg(test)]") {
                break;
            }
            let code_part = line.split("//").next().unwrap_or(line);
            if is_violation(code_part) {
                violations.push(Violation {
                    path: entry.path().to_path_buf(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                });
            }
        }
    }

    violations
}
