use crate::CoreError;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::path::Path;

/// Exclusions that are always active. They are compiled into their own matcher,
/// so no caller or ignore-file rule (including a `!` negation) can lift them.
pub const BUILTIN_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "dist/**",
    "build/**",
    "coverage/**",
    "*.min.js",
];

pub const HIDDEN_PATTERN: &str = ".*";

pub const IGNORE_FILE_NAME: &str = ".neatignore";

/// Directory names whose whole subtree is excluded by [`BUILTIN_PATTERNS`].
/// Discovery prunes them instead of walking into them.
pub(crate) const PRUNED_DIR_NAMES: &[&str] = &["node_modules", ".git"];

/// Reads line-delimited patterns. Blank lines and `#` comments are dropped.
/// A missing or unreadable file yields no patterns.
pub fn load_ignore_file(path: &Path) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no ignore rules loaded");
            return Vec::new();
        }
    };
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

/// The ordered rule set for one root: built-ins, then ignore-file rules, then
/// caller rules, then the hidden-file rule unless hidden files are included.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    file_rules: Vec<String>,
    extra_rules: Vec<String>,
    include_hidden: bool,
}

impl IgnoreRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_rules(mut self, rules: Vec<String>) -> Self {
        self.file_rules.extend(rules);
        self
    }

    pub fn with_extra_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_rules.extend(rules.into_iter().map(Into::into));
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn patterns(&self) -> Vec<&str> {
        let mut v: Vec<&str> = BUILTIN_PATTERNS.to_vec();
        v.extend(self.file_rules.iter().map(String::as_str));
        v.extend(self.extra_rules.iter().map(String::as_str));
        if !self.include_hidden {
            v.push(HIDDEN_PATTERN);
        }
        v
    }

    /// Compiles the rules. A malformed ignore-file line is skipped with a
    /// warning; a malformed caller rule is an [`CoreError::InvalidInput`].
    pub fn build(&self, root: &Path) -> Result<IgnoreMatcher, CoreError> {
        let mut b = GitignoreBuilder::new(root);
        for p in BUILTIN_PATTERNS {
            b.add_line(None, p)
                .map_err(|e| CoreError::InvalidInput(format!("built-in pattern {p}: {e}")))?;
        }
        let builtin = b
            .build()
            .map_err(|e| CoreError::InvalidInput(format!("built-in patterns: {e}")))?;

        let mut c = GitignoreBuilder::new(root);
        for p in &self.file_rules {
            if let Err(e) = c.add_line(None, p) {
                tracing::warn!(pattern = %p, error = %e, "skipping invalid ignore-file rule");
            }
        }
        for p in &self.extra_rules {
            c.add_line(None, p)
                .map_err(|e| CoreError::InvalidInput(format!("ignore pattern {p:?}: {e}")))?;
        }
        if !self.include_hidden {
            c.add_line(None, HIDDEN_PATTERN)
                .map_err(|e| CoreError::InvalidInput(format!("hidden pattern: {e}")))?;
        }
        let custom = c
            .build()
            .map_err(|e| CoreError::InvalidInput(format!("ignore patterns: {e}")))?;

        Ok(IgnoreMatcher { builtin, custom })
    }
}

#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    builtin: Gitignore,
    custom: Gitignore,
}

impl IgnoreMatcher {
    /// `relative` is a file path relative to the root. Backslashes are treated
    /// as separators so callers on any platform get the same answer.
    pub fn is_excluded(&self, relative: &str) -> bool {
        let normalized = relative.replace('\\', "/");
        let p = Path::new(normalized.trim_start_matches("./"));
        if p.as_os_str().is_empty() || p.has_root() {
            return false;
        }
        self.builtin.matched_path_or_any_parents(p, false).is_ignore()
            || self.custom.matched_path_or_any_parents(p, false).is_ignore()
    }
}
