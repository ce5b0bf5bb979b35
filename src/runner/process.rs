//! Blocking and background execution of the converter process.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::command_line::CommandLine;
use super::error::{RunnerError, RunnerResult};
use super::options::{RunOptions, WindowStyle};
use super::outcome::RunOutcome;
use crate::config::Config;

/// How often a child is polled while a timeout is armed
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long readers may drain a killed child's output
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Runs an external executable in a fixed working directory.
///
/// Cheap to clone; concurrent calls share nothing but the read-only settings.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let runner = Self::new(config.paths.working_dir.clone());
        match config.converter.timeout() {
            Some(timeout) => runner.with_timeout(timeout),
            None => runner,
        }
    }

    /// Kill the child and fail with [`RunnerError::TimedOut`] if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run an executable given as a path string.
    pub fn run(
        &self,
        command: &str,
        args: &[String],
        options: Option<&RunOptions>,
    ) -> RunnerResult<RunOutcome> {
        debug!("Running command from string");
        self.run_path(Path::new(command), args, options)
    }

    /// Run an executable given as a path.
    ///
    /// Returns `Ok` for every process that exits, whatever its exit code.
    pub fn run_path(
        &self,
        command: &Path,
        args: &[String],
        options: Option<&RunOptions>,
    ) -> RunnerResult<RunOutcome> {
        self.execute(command, args, options).inspect_err(log_failure)
    }

    /// [`run`](Self::run) on the blocking thread pool.
    pub async fn run_async(
        &self,
        command: String,
        args: Vec<String>,
        options: Option<RunOptions>,
    ) -> RunnerResult<RunOutcome> {
        debug!("Running command from string (async)");
        let runner = self.clone();
        let task =
            tokio::task::spawn_blocking(move || runner.run(&command, &args, options.as_ref()));
        flatten(task.await)
    }

    /// [`run_path`](Self::run_path) on the blocking thread pool.
    pub async fn run_path_async(
        &self,
        command: PathBuf,
        args: Vec<String>,
        options: Option<RunOptions>,
    ) -> RunnerResult<RunOutcome> {
        debug!("Running command from path (async)");
        let runner = self.clone();
        let task =
            tokio::task::spawn_blocking(move || runner.run_path(&command, &args, options.as_ref()));
        flatten(task.await)
    }

    fn execute(
        &self,
        command: &Path,
        args: &[String],
        options: Option<&RunOptions>,
    ) -> RunnerResult<RunOutcome> {
        debug!(path = %command.display(), "Checking executable exists");
        if !command.is_file() {
            return Err(RunnerError::ExecutableNotFound {
                path: command.to_path_buf(),
            });
        }
        let executable = std::path::absolute(command).map_err(|source| RunnerError::Spawn {
            command: command.display().to_string(),
            source,
        })?;

        info!(
            "Executing command: {}",
            executable
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default()
        );

        let default_options = RunOptions::default();
        let options = options.unwrap_or(&default_options);

        let line = CommandLine::new(&executable, args, &self.working_dir);
        debug!(
            file_name = %line.file_name(),
            arguments = %line.arguments(),
            working_dir = %line.working_dir().display(),
            shell = options.use_shell_execute,
            "Built process launch spec"
        );
        let mut process = build_command(&line, options);
        let rendered = line.to_string();

        let started = Instant::now();
        let deadline = self.timeout.map(|timeout| started + timeout);
        let mut child = process.spawn().map_err(|source| RunnerError::Spawn {
            command: rendered.clone(),
            source,
        })?;
        info!(pid = child.id(), "Command process has started");

        // A redirected stdin is closed right away so the child sees EOF.
        drop(child.stdin.take());
        let stdout_reader = child.stdout.take().map(|s| LineReader::spawn(s, "stdout"));
        let stderr_reader = child.stderr.take().map(|s| LineReader::spawn(s, "stderr"));

        let status = match deadline {
            Some(deadline) => wait_until(&mut child, deadline, &rendered)?,
            None => Some(child.wait().map_err(|source| RunnerError::Wait {
                command: rendered.clone(),
                source,
            })?),
        };
        let Some(status) = status else {
            // Give the readers a moment to drain what the killed process wrote.
            if let Some(reader) = &stderr_reader {
                let _ = reader.wait_until(Instant::now() + KILL_GRACE);
            }
            return Err(self.timed_out(rendered, stderr_reader.as_ref()));
        };

        // A grandchild holding the pipes open must not outlive the timeout either.
        let stdout = join_reader(stdout_reader.as_ref(), "stdout", deadline, &rendered)?;
        let stderr = join_reader(stderr_reader.as_ref(), "stderr", deadline, &rendered)?;
        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            warn!("Output streams still open after the timeout, detaching readers");
            return Err(self.timed_out(rendered, stderr_reader.as_ref()));
        };

        let outcome = RunOutcome {
            command: rendered,
            exit_code: status.code(),
            stdout,
            stderr,
            elapsed: started.elapsed(),
        };

        let text = outcome.report_text().trim_end();
        if !text.is_empty() {
            if outcome.success() {
                info!("{}", text);
            } else {
                warn!("{}", text);
            }
        }
        info!(
            exit_code = ?outcome.exit_code,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Process has exited"
        );

        Ok(outcome)
    }

    fn timed_out(&self, command: String, stderr: Option<&LineReader>) -> RunnerError {
        RunnerError::TimedOut {
            command,
            timeout: self.timeout.unwrap_or_default(),
            stderr: stderr
                .map(|r| r.snapshot().trim_end().to_string())
                .unwrap_or_default(),
        }
    }
}

fn log_failure(err: &RunnerError) {
    error!("{}", err);
    debug!("{:?}", err);
}

fn flatten(
    joined: Result<RunnerResult<RunOutcome>, tokio::task::JoinError>,
) -> RunnerResult<RunOutcome> {
    match joined {
        Ok(result) => result,
        Err(join_err) => {
            let err = RunnerError::from(join_err);
            log_failure(&err);
            Err(err)
        }
    }
}

fn build_command(line: &CommandLine, options: &RunOptions) -> Command {
    let mut command = if options.use_shell_execute {
        shell_command(&line.to_string())
    } else {
        let mut command = Command::new(line.executable());
        command.args(line.argv());
        command
    };

    command
        .current_dir(line.working_dir())
        .stdin(stdio(options.redirect_standard_input))
        .stdout(stdio(options.redirect_standard_output))
        .stderr(stdio(options.redirect_standard_error));

    apply_window_options(&mut command, options);
    command
}

fn stdio(redirect: bool) -> Stdio {
    if redirect {
        Stdio::piped()
    } else {
        Stdio::inherit()
    }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut command = Command::new("cmd");
    command.arg("/C").raw_arg(command_line);
    command
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn apply_window_options(command: &mut Command, options: &RunOptions) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    if options.create_no_window || options.window_style == WindowStyle::Hidden {
        command.creation_flags(CREATE_NO_WINDOW);
    }
}

#[cfg(not(windows))]
fn apply_window_options(_command: &mut Command, options: &RunOptions) {
    if options.create_no_window || options.window_style != WindowStyle::Normal {
        debug!("Window options have no effect on this platform");
    }
}

/// Poll until the child exits or `deadline` passes. `None` means it was killed.
fn wait_until(
    child: &mut Child,
    deadline: Instant,
    command: &str,
) -> RunnerResult<Option<ExitStatus>> {
    let wait_err = |source: std::io::Error| RunnerError::Wait {
        command: command.to_string(),
        source,
    };

    loop {
        if let Some(status) = child.try_wait().map_err(wait_err)? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            warn!("Timeout reached, killing process");
            child.kill().map_err(wait_err)?;
            child.wait().map_err(wait_err)?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Reads a child stream line by line on its own thread, logging each line
/// as it arrives. What has been read so far stays available after a timeout.
struct LineReader {
    captured: Arc<Mutex<String>>,
    done: Receiver<std::io::Result<()>>,
}

impl LineReader {
    fn spawn<R>(stream: R, name: &'static str) -> Self
    where
        R: Read + Send + 'static,
    {
        let captured = Arc::new(Mutex::new(String::new()));
        let (tx, done) = mpsc::channel();
        let sink = Arc::clone(&captured);

        thread::spawn(move || {
            let result = read_lines(stream, name, &sink);
            // The runner may have stopped listening after a timeout.
            let _ = tx.send(result);
        });

        Self { captured, done }
    }

    /// Block until the stream closes or `deadline` passes, whichever is first
    fn wait_until(&self, deadline: Instant) -> Option<std::io::Result<()>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.done.recv_timeout(remaining).ok()
    }

    fn snapshot(&self) -> String {
        match self.captured.lock() {
            Ok(text) => text.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

fn read_lines<R: Read>(stream: R, name: &'static str, sink: &Mutex<String>) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        // Converters do not always emit UTF-8 (TIGER names are Latin-1 in older vintages)
        let line = String::from_utf8_lossy(&buf);
        debug!(stream = name, "{}", line.trim_end());
        if let Ok(mut captured) = sink.lock() {
            captured.push_str(&line);
        }
    }
}

/// Collect a reader's output. `Ok(None)` means the deadline passed first.
fn join_reader(
    reader: Option<&LineReader>,
    stream: &'static str,
    deadline: Option<Instant>,
    command: &str,
) -> RunnerResult<Option<String>> {
    let Some(reader) = reader else {
        return Ok(Some(String::new()));
    };
    let capture_err = |message: String| RunnerError::Capture {
        command: command.to_string(),
        stream,
        message,
    };

    let finished = match deadline {
        Some(deadline) => match reader.done.recv_timeout(
            deadline.saturating_duration_since(Instant::now()),
        ) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(capture_err("reader thread panicked".to_string()))
            }
        },
        None => reader
            .done
            .recv()
            .map_err(|_| capture_err("reader thread panicked".to_string()))?,
    };
    finished.map_err(|e| capture_err(e.to_string()))?;
    Ok(Some(reader.snapshot()))
}
