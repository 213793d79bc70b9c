//! Running prettier (or any stdin/stdout formatter) as a child process.
//!
//! An [`Invocation`] names the program, its arguments and, for prettier, the
//! parser it runs with. [`ToolExecutor::run`] feeds the input on stdin and
//! returns stdout. A child that outlives its run (timeout, failed write) is
//! killed and reaped before the error is returned.

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::PrettierMarkdownConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool '{tool}' not found in PATH")]
    ToolNotFound { tool: String },
    #[error("Tool '{tool}' failed: {message}")]
    ExecutionFailed { tool: String, message: String },
    #[error("Tool '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("No formatter available for language '{language}'")]
    Unsupported { language: String },
    #[error("Invalid {language} input: {message}")]
    InvalidInput { language: String, message: String },
}

/// A single formatter command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    /// Prettier parser, used to attribute syntax errors to the input language.
    parser: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            parser: None,
        }
    }

    /// `program --parser <parser>` plus the layout options prettier shares
    /// between Markdown and embedded code.
    pub fn prettier(program: &str, parser: &str, options: &PrettierMarkdownConfig) -> Self {
        let mut invocation = Self::new(program)
            .arg("--parser")
            .arg(parser)
            .arg("--tab-width")
            .arg(options.tab_width.to_string());
        if options.use_tabs {
            invocation = invocation.arg("--use-tabs");
        }
        if let Some(width) = options.line_limit() {
            invocation = invocation.arg("--print-width").arg(width.to_string());
        }
        invocation.parser = Some(parser.to_string());
        invocation
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn parser(&self) -> Option<&str> {
        self.parser.as_deref()
    }

    /// Map a non-zero exit to an error. Prettier reports unparsable input as
    /// a `SyntaxError` on stderr.
    fn failure(&self, status: ExitStatus, stderr: &str) -> ToolError {
        let message = stderr.trim().to_string();
        match &self.parser {
            Some(parser) if message.contains("SyntaxError") => ToolError::InvalidInput {
                language: parser.clone(),
                message,
            },
            _ => ToolError::ExecutionFailed {
                tool: self.program.clone(),
                message: match status.code() {
                    Some(code) => format!("exit code {code}: {message}"),
                    None => format!("terminated by signal: {message}"),
                },
            },
        }
    }
}

/// Runs formatter invocations with a timeout and remembers which programs
/// exist on `PATH`.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    available: Arc<Mutex<HashMap<String, bool>>>,
    timeout: Duration,
}

impl ToolExecutor {
    /// A zero timeout waits for the tool indefinitely.
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            available: Arc::new(Mutex::new(HashMap::new())),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn is_available(&self, program: &str) -> bool {
        if let Ok(cache) = self.available.lock()
            && let Some(&found) = cache.get(program)
        {
            return found;
        }
        let found = find_on_path(program);
        log::debug!("Tool '{program}' available: {found}");
        if let Ok(mut cache) = self.available.lock() {
            cache.insert(program.to_string(), found);
        }
        found
    }

    /// Pipe `input` through the tool and return its stdout.
    pub fn run(&self, invocation: &Invocation, input: &str) -> Result<String, ToolError> {
        let program = invocation.program();
        if !self.is_available(program) {
            return Err(ToolError::ToolNotFound {
                tool: program.to_string(),
            });
        }

        let mut child = RunningTool::spawn(invocation)?;
        if let Err(e) = child.feed(input) {
            // A tool that exits early closes its stdin; its exit status and stderr
            // explain more than the broken pipe does.
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(ToolError::Io {
                    message: format!("Failed to write to '{program}': {e}"),
                });
            }
            log::debug!("'{program}' closed stdin early");
        }

        let Some(status) = child.wait(self.timeout).map_err(|e| ToolError::Io {
            message: format!("Failed to wait for '{program}': {e}"),
        })?
        else {
            return Err(ToolError::Timeout {
                tool: program.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            });
        };

        let (stdout, stderr) = child.output().map_err(|e| ToolError::Io {
            message: format!("Failed to read output of '{program}': {e}"),
        })?;
        if status.success() {
            Ok(stdout)
        } else {
            Err(invocation.failure(status, &stderr))
        }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new(30_000)
    }
}

type PipeReader = JoinHandle<io::Result<Vec<u8>>>;

/// A spawned child with its output being drained on background threads.
/// Dropping it before [`RunningTool::wait`] reports an exit kills the child.
struct RunningTool {
    child: Child,
    stdout: Option<PipeReader>,
    stderr: Option<PipeReader>,
    exited: bool,
}

impl RunningTool {
    fn spawn(invocation: &Invocation) -> Result<Self, ToolError> {
        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::Io {
                message: format!("Failed to spawn '{}': {e}", invocation.program()),
            })?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        Ok(Self {
            child,
            stdout,
            stderr,
            exited: false,
        })
    }

    /// Write all of `input` and close stdin.
    fn feed(&mut self, input: &str) -> io::Result<()> {
        match self.child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        }
    }

    /// `Ok(None)` when the deadline passes first.
    fn wait(&mut self, timeout: Duration) -> io::Result<Option<ExitStatus>> {
        if timeout.is_zero() {
            let status = self.child.wait()?;
            self.exited = true;
            return Ok(Some(status));
        }

        let deadline = Instant::now() + timeout;
        let mut pause = Duration::from_millis(1);
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.exited = true;
                return Ok(Some(status));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(pause.min(deadline - now));
            pause = (pause * 2).min(Duration::from_millis(50));
        }
    }

    fn output(mut self) -> io::Result<(String, String)> {
        let stdout = collect(self.stdout.take())?;
        let stderr = collect(self.stderr.take())?;
        Ok((stdout, stderr))
    }
}

impl Drop for RunningTool {
    fn drop(&mut self) {
        if !self.exited {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
        // The pipes close once the child is gone, so the readers finish.
        let _ = collect(self.stdout.take());
        let _ = collect(self.stderr.take());
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> PipeReader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(reader: Option<PipeReader>) -> io::Result<String> {
    let Some(reader) = reader else {
        return Ok(String::new());
    };
    let bytes = reader
        .join()
        .map_err(|_| io::Error::other("output reader panicked"))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn find_on_path(program: &str) -> bool {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| {
        let full = dir.join(program);
        full.is_file() || (cfg!(windows) && ["exe", "cmd", "bat"].iter().any(|ext| full.with_extension(ext).is_file()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prettier_invocation_carries_layout_options() {
        let options = PrettierMarkdownConfig {
            print_width: 80,
            use_tabs: true,
            ..Default::default()
        };
        let invocation = Invocation::prettier("prettier", "babel", &options);
        assert_eq!(invocation.program(), "prettier");
        assert_eq!(invocation.parser(), Some("babel"));
        assert_eq!(
            invocation.args(),
            ["--parser", "babel", "--tab-width", "2", "--use-tabs", "--print-width", "80"]
        );
    }

    #[test]
    fn test_missing_tool() {
        let executor = ToolExecutor::default();
        let result = executor.run(&Invocation::new("nonexistent-tool-xyz123"), "test");
        assert_eq!(
            result,
            Err(ToolError::ToolNotFound {
                tool: "nonexistent-tool-xyz123".to_string()
            })
        );
    }

    #[test]
    fn test_availability_is_cached() {
        let executor = ToolExecutor::new(1_000);
        assert!(!executor.is_available("nonexistent-tool-xyz123"));
        let cache = executor.available.lock().unwrap();
        assert_eq!(cache.get("nonexistent-tool-xyz123"), Some(&false));
    }

    #[test]
    #[cfg(unix)]
    fn test_run_pipes_stdin_to_stdout() {
        let executor = ToolExecutor::default();
        let output = executor.run(&Invocation::new("cat"), "hello world\n").unwrap();
        assert_eq!(output, "hello world\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_slow_tool_times_out() {
        let executor = ToolExecutor::new(50);
        let start = Instant::now();
        let result = executor.run(&Invocation::new("sleep").arg("5"), "");
        assert_eq!(
            result,
            Err(ToolError::Timeout {
                tool: "sleep".to_string(),
                timeout_ms: 50
            })
        );
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    #[cfg(unix)]
    fn test_tool_closing_stdin_early_is_reaped() {
        let executor = ToolExecutor::new(5_000);
        let input = "x".repeat(1 << 20);
        let result = executor.run(&Invocation::new("sh").arg("-c").arg("echo closed >&2; exit 4"), &input);
        match result {
            Err(ToolError::ExecutionFailed { tool, message }) => {
                assert_eq!(tool, "sh");
                assert!(message.contains("exit code 4"), "{message}");
                assert!(message.contains("closed"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_syntax_error_maps_to_invalid_input() {
        let executor = ToolExecutor::default();
        let mut invocation = Invocation::new("sh")
            .arg("-c")
            .arg("cat >/dev/null; echo '[error] stdin: SyntaxError: Unexpected token (2:3)' >&2; exit 2");
        invocation.parser = Some("babel".to_string());
        match executor.run(&invocation, "let = ;\n") {
            Err(ToolError::InvalidInput { language, message }) => {
                assert_eq!(language, "babel");
                assert!(message.contains("(2:3)"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
