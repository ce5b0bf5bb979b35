use std::time::Duration;

use serde::Serialize;

use super::error::{RunnerError, RunnerResult};

/// Result of a process that ran to completion.
///
/// A non-zero exit is still an `Ok` outcome from the runner; use
/// [`RunOutcome::success`] or [`RunOutcome::into_result`] to tell them apart.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Rendered command line, for display
    pub command: String,

    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,

    /// Captured stdout (empty unless redirected)
    pub stdout: String,

    /// Captured stderr (empty unless redirected)
    pub stderr: String,

    pub elapsed: Duration,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The stream worth showing an operator: stdout on success, stderr otherwise
    pub fn report_text(&self) -> &str {
        if self.success() {
            &self.stdout
        } else {
            &self.stderr
        }
    }

    /// Turn a non-zero exit into [`RunnerError::NonZeroExit`].
    pub fn into_result(self) -> RunnerResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(RunnerError::NonZeroExit {
                command: self.command,
                exit_code: self.exit_code,
                stderr: self.stderr.trim_end().to_string(),
            })
        }
    }
}
