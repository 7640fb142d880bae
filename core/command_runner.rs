use crate::language::Language;
use crate::transformer::{TransformError, Transformer};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

const DEFAULT_PROBE_ARGS: &[&str] = &["--version"];

/// An external formatter that reads source on stdin and writes the formatted
/// text to stdout, e.g. `prettier --stdin-filepath x.js` or `prettierd x.js`.
///
/// Whether the program can run at all is probed on first use and remembered
/// for the lifetime of the instance. Every call spawns its own process, so one
/// instance may be shared across worker threads.
#[derive(Debug)]
pub struct CommandTransformer {
    program: String,
    args: Vec<String>,
    probe_args: Vec<String>,
    available: OnceLock<Result<(), String>>,
}

impl CommandTransformer {
    pub fn new(program: impl Into<String>) -> Self {
        CommandTransformer {
            program: program.into(),
            args: Vec::new(),
            probe_args: DEFAULT_PROBE_ARGS.iter().map(|s| s.to_string()).collect(),
            available: OnceLock::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments used for the availability probe. An empty list skips the
    /// probe and lets the first real invocation report spawn failures.
    pub fn probe_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.probe_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn check_available(&self) -> Result<(), TransformError> {
        self.available
            .get_or_init(|| self.probe())
            .clone()
            .map_err(|reason| TransformError::Unavailable {
                program: self.program.clone(),
                reason,
            })
    }

    fn probe(&self) -> Result<(), String> {
        if self.probe_args.is_empty() {
            return Ok(());
        }
        let status = Command::new(&self.program)
            .args(&self.probe_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| e.to_string())?;
        if !status.success() {
            return Err(format!(
                "'{} {}' exited with {}",
                self.program,
                self.probe_args.join(" "),
                status
            ));
        }
        tracing::debug!(program = %self.program, "formatter available");
        Ok(())
    }

    fn run(&self, content: &str) -> Result<String, TransformError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut process = cmd.spawn().map_err(|source| TransformError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let mut stdin = process.stdin.take().ok_or_else(|| TransformError::Spawn {
            program: self.program.clone(),
            source: std::io::Error::other("stdin was not captured"),
        })?;

        let input = content.as_bytes().to_vec();
        let write_thread = std::thread::spawn(move || stdin.write_all(&input));

        let output = process
            .wait_with_output()
            .map_err(|source| TransformError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // A formatter that rejects input may close stdin early; its exit
        // status is the authoritative signal.
        let _ = write_thread.join();

        if !output.status.success() {
            return Err(TransformError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| TransformError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}

impl Transformer for CommandTransformer {
    fn transform(&self, content: &str, language: Language) -> Result<String, TransformError> {
        self.check_available()?;
        tracing::trace!(program = %self.program, %language, "running external formatter");
        self.run(content)
    }
}
