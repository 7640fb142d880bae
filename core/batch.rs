use crate::CoreError;
use crate::discovery::{DiscoveryOptions, RootKind, discover_dir, resolve_root};
use crate::processor::{OperationMode, ProcessingOutcome, process_file};
use crate::transformer::Transformer;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub discovery: DiscoveryOptions,
    /// Worker threads per root. `None` uses the global rayon pool, `Some(1)`
    /// processes files strictly one at a time.
    pub jobs: Option<usize>,
}

/// `formatted_files` is only ever counted in write mode and
/// `files_needing_formatting` only in check mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormattingStats {
    pub formatted_files: usize,
    pub files_needing_formatting: usize,
    /// Files that were processed without error.
    pub total_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub stats: FormattingStats,
    pub errors: Vec<ErrorRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Absolute paths, in discovery order.
    pub needs_formatting: Vec<PathBuf>,
    pub errors: Vec<ErrorRecord>,
    pub stats: FormattingStats,
}

enum Execution {
    Sequential,
    Global,
    Pool(rayon::ThreadPool),
}

enum Target {
    File(PathBuf),
    Directory { root: PathBuf, files: Vec<PathBuf> },
}

#[derive(Default)]
struct Tally {
    stats: FormattingStats,
    changed: Vec<PathBuf>,
    errors: Vec<ErrorRecord>,
}

impl Tally {
    fn record(
        &mut self,
        path: &Path,
        result: Result<ProcessingOutcome, CoreError>,
        mode: OperationMode,
        explicit: bool,
    ) {
        match result {
            Ok(ProcessingOutcome::Skipped) => {
                if explicit {
                    self.stats.total_files += 1;
                }
            }
            Ok(ProcessingOutcome::Unchanged) => self.stats.total_files += 1,
            Ok(ProcessingOutcome::Changed) => {
                self.stats.total_files += 1;
                match mode {
                    OperationMode::Write => self.stats.formatted_files += 1,
                    OperationMode::Check => self.stats.files_needing_formatting += 1,
                }
                self.changed.push(path.to_path_buf());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "file failed");
                self.errors.push(ErrorRecord {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Identity of a candidate across roots: the canonical parent directory plus
/// the file name. `..` and linked directories collapse; a symlinked file stays
/// distinct from its target.
fn dedupe_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// Drives discovery and per-file processing over a list of roots.
///
/// Every root is resolved and expanded before the first file is processed, so
/// a missing root or a bad ignore pattern fails the batch without side
/// effects. Per-file failures never fail the batch; they are collected in the
/// report in discovery order.
pub struct BatchRunner<'a, T: Transformer + ?Sized> {
    transformer: &'a T,
    options: BatchOptions,
    execution: Execution,
}

impl<'a, T: Transformer + ?Sized> BatchRunner<'a, T> {
    pub fn new(transformer: &'a T, options: BatchOptions) -> Result<Self, CoreError> {
        let execution = match options.jobs {
            None => Execution::Global,
            Some(0) => {
                return Err(CoreError::InvalidInput(
                    "the number of jobs must be at least 1".to_string(),
                ));
            }
            Some(1) => Execution::Sequential,
            Some(n) => Execution::Pool(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| CoreError::InvalidInput(format!("thread pool: {e}")))?,
            ),
        };
        Ok(BatchRunner {
            transformer,
            options,
            execution,
        })
    }

    pub fn run_write<P: AsRef<Path>>(&self, roots: &[P]) -> Result<WriteReport, CoreError> {
        let t = self.run(roots, OperationMode::Write)?;
        Ok(WriteReport {
            stats: t.stats,
            errors: t.errors,
        })
    }

    pub fn run_check<P: AsRef<Path>>(&self, roots: &[P]) -> Result<CheckReport, CoreError> {
        let t = self.run(roots, OperationMode::Check)?;
        Ok(CheckReport {
            needs_formatting: t.changed,
            errors: t.errors,
            stats: t.stats,
        })
    }

    fn run<P: AsRef<Path>>(&self, roots: &[P], mode: OperationMode) -> Result<Tally, CoreError> {
        let targets = self.plan(roots)?;
        let mut tally = Tally::default();

        for target in targets {
            match target {
                Target::File(p) => {
                    let r = process_file(&p, self.transformer, mode);
                    tally.record(&p, r, mode, true);
                }
                Target::Directory { root, files } => {
                    let before = tally.stats;
                    let results = self.process_all(&files, mode);
                    for (p, r) in files.iter().zip(results) {
                        tally.record(p, r, mode, false);
                    }
                    tracing::info!(
                        root = %root.display(),
                        files = tally.stats.total_files - before.total_files,
                        changed = (tally.stats.formatted_files - before.formatted_files)
                            + (tally.stats.files_needing_formatting
                                - before.files_needing_formatting),
                        ?mode,
                        "processed directory"
                    );
                }
            }
        }
        Ok(tally)
    }

    /// Resolves and expands every root once. A file reached from more than one
    /// root is kept only under the first.
    fn plan<P: AsRef<Path>>(&self, roots: &[P]) -> Result<Vec<Target>, CoreError> {
        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(roots.len());
        for r in roots {
            let (root, kind) = resolve_root(r.as_ref())?;
            match kind {
                RootKind::File => {
                    if seen.insert(dedupe_key(&root)) {
                        targets.push(Target::File(root));
                    }
                }
                RootKind::Directory => {
                    let files: Vec<PathBuf> = discover_dir(&root, &self.options.discovery)?
                        .into_iter()
                        .filter(|f| seen.insert(dedupe_key(f)))
                        .collect();
                    tracing::debug!(root = %root.display(), candidates = files.len(), "discovered");
                    targets.push(Target::Directory { root, files });
                }
            }
        }
        Ok(targets)
    }

    /// Results come back in the order of `files` whatever the execution.
    fn process_all(
        &self,
        files: &[PathBuf],
        mode: OperationMode,
    ) -> Vec<Result<ProcessingOutcome, CoreError>> {
        let transformer = self.transformer;
        let one = |p: &PathBuf| process_file(p, transformer, mode);
        match &self.execution {
            Execution::Sequential => files.iter().map(one).collect(),
            Execution::Global => files.par_iter().map(one).collect(),
            Execution::Pool(pool) => pool.install(|| files.par_iter().map(one).collect()),
        }
    }
}
