//! # runbound-process
//!
//! **Purpose**: Bounded, cancellable execution of a single child process
//!
//! Spawns a resolved program with an argument vector (no shell
//! interpretation), tees live output into size-capped capture buffers and
//! optional external writers, races completion against a caller-supplied
//! cancellation token, and always reaps the process before returning a
//! structured result.
//!
//! ## Features
//!
//! - **Bounded Capture**: per-stream capture buffers with a configurable
//!   byte cap and truncation tracking
//! - **Output Tee**: every live byte also reaches an optional external
//!   writer, independent of the capture cap
//! - **Cancellation**: a fired `CancellationToken` hard-kills the process
//!   (whole process group on Unix) and still waits for the real exit
//! - **Exit Mapping**: signal deaths reported as `128 + signal` on Unix
//! - **Identity Drop**: optional uid/gid applied before exec (Unix only)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use runbound_process::{execute, ExecConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cancel = CancellationToken::new();
//! let result = execute(&cancel, ExecConfig::new("echo").args(["hello"])).await;
//!
//! assert_eq!(result.exit_code, 0);
//! assert_eq!(result.stdout, "hello\n");
//! # }
//! ```

pub mod config;
pub mod error;
pub mod runner;
pub mod sink;

mod controller;
mod pump;

pub use config::{Credential, ExecConfig, OutputWriter, DEFAULT_CAPTURE_LIMIT};
pub use error::{ExecError, Result};
pub use runner::{execute, ExecResult, UNDETERMINED_EXIT_CODE};
pub use sink::BoundedSink;
