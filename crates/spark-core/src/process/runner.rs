//! Spawning and supervising a single external command

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;

use super::escalation::{KillEscalation, StopAction};
use crate::error::ProcessError;

/// Default timeout for a supervised command (5 minutes).
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Grace window between the soft termination request and the force kill.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// Which stream a chunk of output arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of child output, forwarded to the caller as it arrives.
#[derive(Debug, Clone)]
pub struct OutputChunk {
    pub stream: OutputStream,
    pub data: String,
}

/// Options for a supervised run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory for the child; inherits ours when `None`.
    pub cwd: Option<PathBuf>,
    /// Environment variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// How long the child may run before shutdown escalation begins.
    pub timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            env: Vec::new(),
            timeout: DEFAULT_RUN_TIMEOUT,
        }
    }
}

/// Captured streams and exit status of a completed command.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub succeeded: bool,
}

/// Run `program` with `args`, forwarding every output line through
/// `on_output` and enforcing the configured timeout.
///
/// The callback is plain `FnMut(&OutputChunk)`; the runner knows nothing
/// about what callers do with the output. Exit code 0 yields the capture;
/// a non-zero exit yields [`ProcessError::Failed`] carrying the capture.
/// On timeout the child receives a soft stop, then a force kill after
/// [`KILL_GRACE`], and the call fails with [`ProcessError::Timeout`].
pub async fn run<F>(
    program: &str,
    args: &[&str],
    options: &RunOptions,
    mut on_output: F,
) -> Result<CommandCapture, ProcessError>
where
    F: FnMut(&OutputChunk),
{
    let command_line = if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &options.cwd {
        command.current_dir(cwd);
    }
    for (key, value) in &options.env {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        command: command_line.clone(),
        source,
    })?;

    let stdout = child.stdout.take().expect("Failed to capture stdout");
    let stderr = child.stderr.take().expect("Failed to capture stderr");
    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();

    let mut stdout_text = String::new();
    let mut stderr_text = String::new();
    let mut escalation = KillEscalation::new(KILL_GRACE);

    let supervise = async {
        let mut stdout_done = false;
        let mut stderr_done = false;

        while !(stdout_done && stderr_done) {
            tokio::select! {
                line = stdout_lines.next_line(), if !stdout_done => match line {
                    Ok(Some(line)) => {
                        stdout_text.push_str(&line);
                        stdout_text.push('\n');
                        on_output(&OutputChunk {
                            stream: OutputStream::Stdout,
                            data: line,
                        });
                    }
                    Ok(None) | Err(_) => stdout_done = true,
                },
                line = stderr_lines.next_line(), if !stderr_done => match line {
                    Ok(Some(line)) => {
                        stderr_text.push_str(&line);
                        stderr_text.push('\n');
                        on_output(&OutputChunk {
                            stream: OutputStream::Stderr,
                            data: line,
                        });
                    }
                    Ok(None) | Err(_) => stderr_done = true,
                },
            }
        }

        child.wait().await
    };

    match timeout(options.timeout, supervise).await {
        Ok(Ok(status)) => {
            escalation.on_exit();
            let capture = CommandCapture {
                exit_code: status.code().unwrap_or(-1),
                stdout: stdout_text.trim().to_string(),
                stderr: stderr_text.trim().to_string(),
                succeeded: status.success(),
            };
            if capture.succeeded {
                Ok(capture)
            } else {
                Err(ProcessError::Failed {
                    command: command_line,
                    capture,
                })
            }
        }
        Ok(Err(source)) => Err(ProcessError::Io {
            command: command_line,
            source,
        }),
        Err(_) => {
            if escalation.on_timeout() == StopAction::SendSoftStop {
                send_soft_stop(&child);
            }
            match timeout(escalation.grace(), child.wait()).await {
                Ok(_) => escalation.on_exit(),
                Err(_) => {
                    if escalation.on_grace_elapsed() == StopAction::ForceKill {
                        let _ = child.kill().await;
                    }
                }
            }
            Err(ProcessError::Timeout {
                command: command_line,
                timeout_secs: options.timeout.as_secs(),
            })
        }
    }
}

/// Ask the child to terminate without killing it outright.
fn send_soft_stop(child: &Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }
    #[cfg(not(unix))]
    {
        // No portable soft stop; the force kill after the grace window is
        // the only termination path.
        let _ = child;
    }
}
