use crate::CoreError;
use crate::language::Language;
use crate::transformer::Transformer;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Report what would change; the filesystem is never touched.
    Check,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Unchanged,
    Changed,
    /// The extension is not in the allow-list; the transformer was not called.
    Skipped,
}

fn language_of(path: &Path) -> Result<Language, CoreError> {
    Language::from_path(path).ok_or_else(|| CoreError::UnsupportedFile(path.to_path_buf()))
}

/// Runs the transformer over one file. In [`OperationMode::Write`] a changed
/// file is replaced with the transformed text.
pub fn process_file<T>(
    path: &Path,
    transformer: &T,
    mode: OperationMode,
) -> Result<ProcessingOutcome, CoreError>
where
    T: Transformer + ?Sized,
{
    let language = match language_of(path) {
        Ok(l) => l,
        Err(CoreError::UnsupportedFile(_)) => {
            tracing::debug!(path = %path.display(), "skipped: unsupported extension");
            return Ok(ProcessingOutcome::Skipped);
        }
        Err(e) => return Err(e),
    };

    tracing::trace!(path = %path.display(), %language, "transforming");
    let original = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    let formatted =
        transformer
            .transform(&original, language)
            .map_err(|source| CoreError::Formatting {
                path: path.to_path_buf(),
                source,
            })?;

    if formatted == original {
        tracing::debug!(path = %path.display(), "unchanged");
        return Ok(ProcessingOutcome::Unchanged);
    }

    if mode == OperationMode::Write {
        persist(path, &formatted)?;
        tracing::debug!(path = %path.display(), "formatted");
    } else {
        tracing::debug!(path = %path.display(), "needs formatting");
    }
    Ok(ProcessingOutcome::Changed)
}

/// Replaces the file through a sibling temp file and a rename, keeping the
/// original permissions. A symlink is resolved so its target is updated.
///
/// When the directory refuses a new entry the file is rewritten in place
/// instead, which keeps its inode but is not atomic.
fn persist(path: &Path, content: &str) -> Result<(), CoreError> {
    let target = fs::canonicalize(path).map_err(|e| CoreError::io(path, e))?;
    let parent = target.parent().ok_or_else(|| {
        CoreError::io(&target, std::io::Error::other("file has no parent directory"))
    })?;
    let permissions = fs::metadata(&target)
        .map_err(|e| CoreError::io(&target, e))?
        .permissions();

    let mut temp_file = match tempfile::Builder::new()
        .prefix(".neatify_")
        .suffix(".tmp")
        .tempfile_in(parent)
    {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            tracing::debug!(path = %target.display(), "directory not writable, rewriting in place");
            return fs::write(&target, content).map_err(|e| CoreError::io(&target, e));
        }
        Err(e) => return Err(CoreError::io(&target, e)),
    };
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| CoreError::io(&target, e))?;
    temp_file.flush().map_err(|e| CoreError::io(&target, e))?;
    fs::set_permissions(temp_file.path(), permissions).map_err(|e| CoreError::io(&target, e))?;

    temp_file
        .persist(&target)
        .map_err(|persist_error| CoreError::io(&target, persist_error.error))?;
    Ok(())
}
