//! Errors raised by the command runner.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// The executable does not exist on disk. Raised before anything is spawned.
    #[error("The file specified does not exist: {}", .path.display())]
    ExecutableNotFound { path: PathBuf },

    /// The OS refused to launch the process
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on, or killing, the child failed
    #[error("Failed while waiting for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A stdout/stderr reader thread failed or panicked
    #[error("Failed to capture {stream} of '{command}': {message}")]
    Capture {
        command: String,
        stream: &'static str,
        message: String,
    },

    /// The process, or something still holding its output pipes, outlived the
    /// timeout. The direct child is killed; `stderr` is whatever was read before that.
    #[error("'{command}' did not finish within {timeout:?}: {stderr}")]
    TimedOut {
        command: String,
        timeout: Duration,
        stderr: String,
    },

    /// The process exited with a non-zero code. Only produced by
    /// [`RunOutcome::into_result`](super::RunOutcome::into_result).
    #[error("'{command}' exited with {}: {stderr}", .exit_code.map_or_else(|| "a signal".to_string(), |c| format!("code {}", c)))]
    NonZeroExit {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The background task running an async invocation failed
    #[error("Background command task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type RunnerResult<T> = std::result::Result<T, RunnerError>;
