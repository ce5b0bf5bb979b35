//! External converter execution.
//!
//! Launches the shapefile converter as a child process in the configured
//! working directory, streams its output into the log and reports how it
//! exited.

mod command_line;
mod error;
mod options;
mod outcome;
mod process;

pub use command_line::{join_arguments, quote_executable, CommandLine};
pub use error::{RunnerError, RunnerResult};
pub use options::{RunOptions, WindowStyle};
pub use outcome::RunOutcome;
pub use process::CommandRunner;
