use std::fmt;
use std::path::Path;

const JAVASCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Every extension any [`Language`] claims, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = JAVASCRIPT_EXTENSIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::JavaScript];

    pub fn name(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::JavaScript => JAVASCRIPT_EXTENSIONS,
        }
    }

    /// Extension lookup is case-insensitive; files without an extension never match.
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
