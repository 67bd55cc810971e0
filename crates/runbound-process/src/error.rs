//! Error types for process execution

use std::io;

use thiserror::Error;

/// Execution errors
///
/// Every failure is returned as data inside an [`ExecResult`]; the engine
/// never aborts the caller's control flow.
///
/// [`ExecResult`]: crate::ExecResult
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command name was empty; nothing was spawned
    #[error("command cannot be empty")]
    EmptyCommand,

    /// The operating system could not create the process
    #[error("failed to start process: {0}")]
    Start(#[source] io::Error),

    /// The cancellation token fired before the process completed.
    ///
    /// The payload describes what the post-kill wait observed.
    #[error("execution cancelled: {0}")]
    Cancelled(String),

    /// Waiting on a started process failed at the OS layer
    #[error("failed to await process exit: {0}")]
    Wait(#[source] io::Error),
}

impl ExecError {
    /// Whether this error reports a cancelled execution.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled(_))
    }
}

/// Result type for execution operations
pub type Result<T> = std::result::Result<T, ExecError>;
