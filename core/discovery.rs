use crate::CoreError;
use crate::ignore_rules::{IGNORE_FILE_NAME, IgnoreRuleSet, PRUNED_DIR_NAMES, load_ignore_file};
use crate::language::Language;
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Caller-supplied gitignore-style rules, applied after the ignore file.
    pub extra_ignores: Vec<String>,
    pub include_hidden: bool,
    /// Read `<root>/.neatignore` (or `ignore_path`) when expanding a directory.
    pub use_ignore_file: bool,
    pub ignore_path: Option<PathBuf>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DiscoveryOptions {
            extra_ignores: Vec::new(),
            include_hidden: false,
            use_ignore_file: true,
            ignore_path: None,
        }
    }
}

impl DiscoveryOptions {
    pub fn rule_set(&self, root: &Path) -> IgnoreRuleSet {
        let file_rules = if self.use_ignore_file {
            let p = self
                .ignore_path
                .clone()
                .unwrap_or_else(|| root.join(IGNORE_FILE_NAME));
            load_ignore_file(&p)
        } else {
            Vec::new()
        };
        IgnoreRuleSet::new()
            .with_file_rules(file_rules)
            .with_extra_rules(self.extra_ignores.iter().cloned())
            .include_hidden(self.include_hidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    File,
    Directory,
}

/// Makes `root` absolute (without resolving symlinks) and classifies it.
pub fn resolve_root(root: &Path) -> Result<(PathBuf, RootKind), CoreError> {
    let abs = std::path::absolute(root)
        .map_err(|e| CoreError::InvalidInput(format!("{}: {}", root.display(), e)))?;
    let meta = match fs::metadata(&abs) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(CoreError::NotFound(abs)),
        Err(e) => return Err(CoreError::io(abs, e)),
    };
    if meta.is_file() {
        Ok((abs, RootKind::File))
    } else if meta.is_dir() {
        Ok((abs, RootKind::Directory))
    } else {
        Err(CoreError::InvalidInput(format!(
            "{} is neither a file nor a directory",
            abs.display()
        )))
    }
}

/// Candidate files for one root, sorted by path.
///
/// An explicit file is returned as-is when its extension is supported; ignore
/// rules only apply while expanding a directory.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>, CoreError> {
    let (root, kind) = resolve_root(root)?;
    match kind {
        RootKind::File if Language::from_path(&root).is_some() => Ok(vec![root]),
        RootKind::File => Ok(Vec::new()),
        RootKind::Directory => discover_dir(&root, options),
    }
}

pub(crate) fn discover_dir(
    root: &Path,
    options: &DiscoveryOptions,
) -> Result<Vec<PathBuf>, CoreError> {
    let rules = options.rule_set(root);
    let m = rules.build(root)?;
    tracing::debug!(root = %root.display(), patterns = ?rules.patterns(), "expanding directory");

    let mut w = WalkBuilder::new(root);
    w.standard_filters(false);
    w.follow_links(false);
    w.filter_entry(|e| !is_pruned(e));

    let mut f = Vec::new();
    for i in w.build() {
        let e = match i {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !is_candidate_file(&e) {
            continue;
        }
        let p = e.into_path();
        if Language::from_path(&p).is_none() {
            continue;
        }
        let Ok(rel) = p.strip_prefix(root) else {
            continue;
        };
        if m.is_excluded(&rel.to_string_lossy()) {
            tracing::trace!(path = %p.display(), "excluded");
            continue;
        }
        f.push(p);
    }
    f.sort();
    Ok(f)
}

/// Regular files, plus symlinks that point at one. Linked directories are
/// never descended into.
fn is_candidate_file(e: &DirEntry) -> bool {
    match e.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => fs::metadata(e.path()).is_ok_and(|m| m.is_file()),
        _ => false,
    }
}

fn is_pruned(e: &DirEntry) -> bool {
    e.depth() > 0
        && e.file_type().is_some_and(|ft| ft.is_dir())
        && e
            .file_name()
            .to_str()
            .is_some_and(|n| PRUNED_DIR_NAMES.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "x;\n").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn expands_directory_with_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path();
        for f in [
            "a.js",
            "b.mjs",
            "src/c.cjs",
            "src/readme.md",
            "node_modules/dep/index.js",
            "dist/out.js",
            "lib/jquery.min.js",
            ".hidden.js",
            ".config/x.js",
        ] {
            touch(r, f);
        }
        let files = discover(r, &DiscoveryOptions::default()).unwrap();
        assert_eq!(names(r, &files), vec!["a.js", "b.mjs", "src/c.cjs"]);
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn ignore_file_and_extra_rules() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path();
        for f in ["a.js", "b.mjs", "gen/c.js", "keep/d.js"] {
            touch(r, f);
        }
        fs::write(r.join(IGNORE_FILE_NAME), "# comment\nb.mjs\n\n").unwrap();

        let opts = DiscoveryOptions {
            extra_ignores: vec!["gen/**".into()],
            ..Default::default()
        };
        assert_eq!(names(r, &discover(r, &opts).unwrap()), vec!["a.js", "keep/d.js"]);

        let opts = DiscoveryOptions {
            use_ignore_file: false,
            ..Default::default()
        };
        assert_eq!(
            names(r, &discover(r, &opts).unwrap()),
            vec!["a.js", "b.mjs", "gen/c.js", "keep/d.js"]
        );
    }

    #[test]
    fn custom_ignore_path() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path().join("proj");
        touch(&r, "a.js");
        touch(&r, "b.js");
        let rules = dir.path().join("rules.txt");
        fs::write(&rules, "a.js\n").unwrap();
        let opts = DiscoveryOptions {
            ignore_path: Some(rules),
            ..Default::default()
        };
        assert_eq!(names(&r, &discover(&r, &opts).unwrap()), vec!["b.js"]);
    }

    #[test]
    fn include_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path();
        touch(r, ".eslintrc.js");
        touch(r, ".git/hook.js");
        let opts = DiscoveryOptions {
            include_hidden: true,
            ..Default::default()
        };
        assert_eq!(names(r, &discover(r, &opts).unwrap()), vec![".eslintrc.js"]);
    }

    #[test]
    fn explicit_file_bypasses_ignore_rules() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path();
        touch(r, "node_modules/c.js");
        touch(r, "notes.txt");
        let dep = r.join("node_modules/c.js");
        assert_eq!(discover(&dep, &DiscoveryOptions::default()).unwrap(), vec![dep]);
        assert!(
            discover(&r.join("notes.txt"), &DiscoveryOptions::default())
                .unwrap()
                .is_empty()
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_candidates() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let proj = dir.path().join("proj");
        touch(&proj, "plain.js");
        touch(dir.path(), "shared/real.js");
        touch(dir.path(), "shared/lib/inner.js");
        symlink(dir.path().join("shared/real.js"), proj.join("link.js")).unwrap();
        symlink(dir.path().join("shared/lib"), proj.join("lib")).unwrap();
        symlink(dir.path().join("shared/gone.js"), proj.join("dangling.js")).unwrap();

        let files = discover(&proj, &DiscoveryOptions::default()).unwrap();
        assert_eq!(names(&proj, &files), vec!["link.js", "plain.js"]);
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("nope"), &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn special_file_is_invalid_input() {
        let err = resolve_root(Path::new("/dev/null")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn discovery_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path();
        for f in ["z.js", "a/b.js", "m.mjs", "a/a.js"] {
            touch(r, f);
        }
        let first = discover(r, &DiscoveryOptions::default()).unwrap();
        let second = discover(r, &DiscoveryOptions::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(names(r, &first), vec!["a/a.js", "a/b.js", "m.mjs", "z.js"]);
    }
}
