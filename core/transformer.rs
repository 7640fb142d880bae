use crate::language::Language;

#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    /// The formatter understood the request but refused the input.
    #[error("{0}")]
    Rejected(String),

    #[error("formatter '{program}' is not available: {reason}")]
    Unavailable { program: String, reason: String },

    #[error("failed to spawn formatter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter '{program}' exited with {status}:\n{stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("formatter '{program}' produced output that is not valid UTF-8")]
    InvalidOutput { program: String },
}

/// Converts source text into its canonical form.
///
/// Implementations must be deterministic and must not touch the filesystem:
/// the processor compares the returned text byte-for-byte with the original
/// to decide whether a file changed. `Sync` is required because a batch may
/// call the same instance from several worker threads.
pub trait Transformer: Send + Sync {
    fn transform(&self, content: &str, language: Language) -> Result<String, TransformError>;
}

impl<F> Transformer for F
where
    F: Fn(&str, Language) -> Result<String, TransformError> + Send + Sync,
{
    fn transform(&self, content: &str, language: Language) -> Result<String, TransformError> {
        self(content, language)
    }
}

/// Built-in whitespace normalizer: trailing whitespace is removed, runs of
/// blank lines collapse to one, leading and trailing blank lines are dropped
/// and non-empty output ends with exactly one `\n`. CRLF becomes LF.
#[derive(Debug, Clone, Copy, Default)]
pub struct TidyTransformer;

impl Transformer for TidyTransformer {
    fn transform(&self, content: &str, _language: Language) -> Result<String, TransformError> {
        Ok(tidy(content))
    }
}

fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}
