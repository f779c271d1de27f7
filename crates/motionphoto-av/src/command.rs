//! Builder for executing external tool commands with timeout support.

use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Default command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// The child is killed if the timeout fires before it exits.
///
/// # Example
///
/// ```no_run
/// use motionphoto_av::ToolCommand;
/// use std::path::PathBuf;
///
/// let output = ToolCommand::new(PathBuf::from("exiftool"))
///     .arg("-b")
///     .arg("-XMP")
///     .arg("/path/to/photo.MP.jpg")
///     .run_blocking()?;
/// println!("{} bytes of XMP", output.stdout.len());
/// # Ok::<(), motionphoto_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Short program name used in errors and logs.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the executable does not exist.
    /// - [`Error::ToolTimeout`] if the process outlives the timeout.
    /// - [`Error::ToolFailed`] if spawning fails or the process exits with a
    ///   non-zero status (message includes stderr).
    pub async fn execute(&self) -> Result<ToolOutput> {
        let tool = self.program_name();

        #[cfg(feature = "tracing")]
        tracing::debug!("Running {} {}", tool, self.args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(&tool)
            } else {
                Error::tool_failed(&tool, format!("failed to spawn: {e}"))
            }
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::tool_failed(
                    tool,
                    format!("I/O error waiting for process: {e}"),
                ))
            }
            Err(_elapsed) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("{} timed out after {:?}, killed", tool, self.timeout);
                return Err(Error::ToolTimeout {
                    tool,
                    timeout: self.timeout,
                });
            }
        };

        let tool_output = ToolOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !tool_output.status.success() {
            return Err(Error::tool_failed(
                tool,
                format!(
                    "exited with status {}: {}",
                    tool_output.status,
                    tool_output.stderr.trim()
                ),
            ));
        }

        Ok(tool_output)
    }

    /// Execute on a private current-thread runtime.
    ///
    /// Must not be called from within an async context.
    pub fn run_blocking(&self) -> Result<ToolOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        let output = ToolCommand::new(PathBuf::from("echo"))
            .arg("hello")
            .execute()
            .await;

        match output {
            Ok(out) => {
                assert!(out.status.success());
                assert!(String::from_utf8_lossy(&out.stdout).contains("hello"));
            }
            Err(_) => {
                // On some minimal environments echo may not exist; skip.
            }
        }
    }

    #[tokio::test]
    async fn execute_nonexistent_tool() {
        let result = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345"))
            .execute()
            .await;
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn timeout_fires() {
        if which::which("sleep").is_err() {
            eprintln!("Skipping: sleep not available");
            return;
        }
        let result = ToolCommand::new(PathBuf::from("sleep"))
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await;
        let err = result.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("timed out"), "unexpected error: {err}");
    }

    #[test]
    fn non_zero_exit_reports_failure() {
        if which::which("false").is_err() {
            eprintln!("Skipping: false not available");
            return;
        }
        let err = ToolCommand::new(PathBuf::from("false"))
            .run_blocking()
            .unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
    }
}
