//! Launch description for a single converter invocation.

use std::fmt;
use std::path::{Path, PathBuf};

/// Quote an executable path if it contains a space.
pub fn quote_executable(path: &str) -> String {
    if path.contains(' ') {
        format!("\"{}\"", path)
    } else {
        path.to_string()
    }
}

/// Join arguments with single spaces, in order, without quoting.
///
/// This is the display form only. The process itself receives each argument
/// separately through its argument vector.
pub fn join_arguments(args: &[String]) -> String {
    args.join(" ")
}

/// Everything needed to launch the child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    executable: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandLine {
    pub fn new(executable: &Path, args: &[String], working_dir: &Path) -> Self {
        Self {
            executable: executable.to_path_buf(),
            args: args.to_vec(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Executable component as it appears on a command line
    pub fn file_name(&self) -> String {
        quote_executable(&self.executable.to_string_lossy())
    }

    /// Arguments joined for display
    pub fn arguments(&self) -> String {
        join_arguments(&self.args)
    }

    /// Argument vector handed to the OS, one entry per argument
    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.file_name())
        } else {
            write!(f, "{} {}", self.file_name(), self.arguments())
        }
    }
}
