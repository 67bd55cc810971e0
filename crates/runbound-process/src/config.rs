//! Execution configuration

use std::fmt;
use std::path::PathBuf;

use tokio::io::AsyncWrite;

use crate::error::{ExecError, Result};

/// Capture limit applied when the caller specifies nothing: 10 KiB per
/// stream. `capture_limit(0)` disables the cap entirely.
pub const DEFAULT_CAPTURE_LIMIT: i64 = 10 * 1024;

/// External consumer for live output bytes.
pub type OutputWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Identity to run the command with (Unix only).
///
/// Applied before exec on Unix targets. Accepted and ignored elsewhere;
/// callers must not assume enforcement on non-Unix platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    /// User id to drop to
    pub uid: u32,
    /// Group id to drop to
    pub gid: u32,
}

/// Configuration for a single execution
///
/// Built with consuming setters and handed to [`execute`]; immutable once
/// execution starts.
///
/// [`execute`]: crate::execute
pub struct ExecConfig {
    /// Program path or name (resolved via PATH by the OS)
    pub(crate) program: String,
    /// Argument vector
    pub(crate) args: Vec<String>,
    /// Entries appended to the inherited environment, in caller order
    pub(crate) env: Vec<(String, String)>,
    /// Working directory (None = inherit)
    pub(crate) working_dir: Option<PathBuf>,
    /// Live stdout consumer (None = discard)
    pub(crate) stdout_writer: Option<OutputWriter>,
    /// Live stderr consumer (None = discard)
    pub(crate) stderr_writer: Option<OutputWriter>,
    /// Identity to drop to before exec
    pub(crate) credential: Option<Credential>,
    /// Per-stream capture limit in bytes (<= 0 = unbounded)
    pub(crate) capture_limit: i64,
}

impl ExecConfig {
    /// Create a configuration for `program` with default settings.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            env: vec![],
            working_dir: None,
            stdout_writer: None,
            stderr_writer: None,
            credential: None,
            capture_limit: DEFAULT_CAPTURE_LIMIT,
        }
    }

    /// Set the argument vector. Replaces any previously set arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Append one environment entry to the inherited environment.
    ///
    /// Later entries for the same key override earlier ones.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Append several environment entries, preserving order.
    pub fn envs<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set an external consumer for live stdout bytes.
    ///
    /// The writer sees every byte the process produces; the capture limit
    /// applies only to the internal buffer.
    pub fn stdout_writer(mut self, writer: OutputWriter) -> Self {
        self.stdout_writer = Some(writer);
        self
    }

    /// Set an external consumer for live stderr bytes.
    pub fn stderr_writer(mut self, writer: OutputWriter) -> Self {
        self.stderr_writer = Some(writer);
        self
    }

    /// Run the process as `uid`/`gid` (Unix only, inert elsewhere).
    pub fn credential(mut self, uid: u32, gid: u32) -> Self {
        self.credential = Some(Credential { uid, gid });
        self
    }

    /// Cap internal capture at `bytes` per stream (`<= 0` = unbounded).
    pub fn capture_limit(mut self, bytes: i64) -> Self {
        self.capture_limit = bytes;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.program.is_empty() {
            return Err(ExecError::EmptyCommand);
        }
        Ok(())
    }
}

impl fmt::Debug for ExecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecConfig")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("working_dir", &self.working_dir)
            .field("stdout_writer", &self.stdout_writer.is_some())
            .field("stderr_writer", &self.stderr_writer.is_some())
            .field("credential", &self.credential)
            .field("capture_limit", &self.capture_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExecConfig::new("echo");
        assert_eq!(config.program, "echo");
        assert!(config.args.is_empty());
        assert!(config.env.is_empty());
        assert!(config.working_dir.is_none());
        assert!(config.stdout_writer.is_none());
        assert!(config.stderr_writer.is_none());
        assert!(config.credential.is_none());
        assert_eq!(config.capture_limit, DEFAULT_CAPTURE_LIMIT);
    }

    #[test]
    fn args_replace_wholesale() {
        let config = ExecConfig::new("echo").args(["a", "b"]).args(["c"]);
        assert_eq!(config.args, vec!["c"]);
    }

    #[test]
    fn env_entries_append_in_order() {
        let config = ExecConfig::new("env")
            .env("FOO", "one")
            .envs([("BAR", "x"), ("FOO", "two")]);
        assert_eq!(
            config.env,
            vec![
                ("FOO".to_string(), "one".to_string()),
                ("BAR".to_string(), "x".to_string()),
                ("FOO".to_string(), "two".to_string()),
            ]
        );
    }

    #[test]
    fn empty_program_is_rejected() {
        let config = ExecConfig::new("");
        assert!(matches!(config.validate(), Err(ExecError::EmptyCommand)));
    }
}
