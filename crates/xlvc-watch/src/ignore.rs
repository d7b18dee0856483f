//! Ignore-pattern and extension filtering, applied after coalescing.

use std::collections::HashSet;
use std::path::Path;

/// Default ignore patterns: Excel's own lock/temp sigils.
pub fn default_ignore_patterns() -> Vec<String> {
    vec!["~$*".to_string(), "*.tmp".to_string(), ".~lock.*".to_string()]
}

/// A compiled set of ignore glob patterns plus an extension allow-list.
pub struct EventFilter {
    patterns: Vec<String>,
    extensions: HashSet<String>,
}

impl EventFilter {
    pub fn new(patterns: Vec<String>, extensions: HashSet<String>) -> Self {
        Self {
            patterns,
            extensions: extensions.into_iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    /// True if `path` should be dropped: it matches an ignore pattern, or
    /// its extension is not in the watched set.
    pub fn should_ignore(&self, path: &Path) -> bool {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return true,
        };

        if self.patterns.iter().any(|p| glob_match(p, file_name)) {
            return true;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => !self.extensions.contains(&ext.to_ascii_lowercase()),
            None => true,
        }
    }
}

/// A tiny glob matcher supporting only the wildcard this module needs: `*`
/// as "zero or more characters". Good enough for `~$*`, `*.tmp`,
/// `.~lock.*`; not a general glob engine.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !remaining.starts_with(part) {
                return false;
            }
            remaining = &remaining[part.len()..];
        } else if i == parts.len() - 1 {
            return remaining.ends_with(part);
        } else {
            match remaining.find(part) {
                Some(pos) => remaining = &remaining[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> EventFilter {
        EventFilter::new(default_ignore_patterns(), ["xlsx".to_string(), "xlsm".to_string()].into_iter().collect())
    }

    #[test]
    fn test_ignores_excel_lock_files() {
        let f = filter();
        assert!(f.should_ignore(Path::new("~$Budget.xlsx")));
    }

    #[test]
    fn test_ignores_tmp_files() {
        let f = filter();
        assert!(f.should_ignore(Path::new("Budget.xlsx.tmp")));
    }

    #[test]
    fn test_ignores_lock_swap_files() {
        let f = filter();
        assert!(f.should_ignore(Path::new(".~lock.Budget.xlsx#")));
    }

    #[test]
    fn test_allows_watched_extension() {
        let f = filter();
        assert!(!f.should_ignore(Path::new("Budget.xlsx")));
    }

    #[test]
    fn test_rejects_unwatched_extension() {
        let f = filter();
        assert!(f.should_ignore(Path::new("notes.txt")));
    }

    #[test]
    fn test_glob_match_prefix_wildcard() {
        assert!(glob_match("~$*", "~$Budget.xlsx"));
        assert!(!glob_match("~$*", "Budget.xlsx"));
    }

    #[test]
    fn test_glob_match_suffix_wildcard() {
        assert!(glob_match("*.tmp", "Budget.xlsx.tmp"));
        assert!(!glob_match("*.tmp", "Budget.xlsx"));
    }
}
