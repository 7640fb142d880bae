pub mod batch;
pub mod command_runner;
pub mod discovery;
pub mod ignore_rules;
pub mod language;
pub mod processor;
pub mod transformer;

use std::path::PathBuf;

pub use batch::{BatchOptions, BatchRunner, CheckReport, ErrorRecord, FormattingStats, WriteReport};
pub use command_runner::CommandTransformer;
pub use discovery::{DiscoveryOptions, RootKind, discover, resolve_root};
pub use ignore_rules::{
    BUILTIN_PATTERNS, HIDDEN_PATTERN, IGNORE_FILE_NAME, IgnoreMatcher, IgnoreRuleSet,
    load_ignore_file,
};
pub use language::{Language, SUPPORTED_EXTENSIONS};
pub use processor::{OperationMode, ProcessingOutcome, process_file};
pub use transformer::{TidyTransformer, TransformError, Transformer};

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported file: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Formatting failed for {}: {source}", path.display())]
    Formatting {
        path: PathBuf,
        #[source]
        source: TransformError,
    },
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures that describe the invocation rather than a single file.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, CoreError::NotFound(_) | CoreError::InvalidInput(_))
    }
}
