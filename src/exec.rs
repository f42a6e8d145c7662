// ─── External Process Execution ───
// Pre/post-install hook commands run through the platform shell. One external
// process at a time, process-wide; both output streams are drained
// concurrently so a full OS pipe buffer can never deadlock the wait.

use std::path::Path;
use std::process::Stdio;

use once_cell::sync::Lazy;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::error::{InstallerError, InstallerResult};

static EXEC_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Shell and flag for the host platform.
fn shell_command() -> (&'static str, &'static str) {
    if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("/bin/sh", "-c")
    }
}

/// Run `command` through the platform shell with `run_dir` as the working
/// directory, streaming its output to the log, and return the exit code.
pub async fn run_shell_command(run_dir: &Path, command: &str) -> InstallerResult<i32> {
    if !run_dir.is_dir() {
        return Err(InstallerError::Other(format!(
            "run directory {:?} must exist and be a directory",
            run_dir
        )));
    }
    if command.trim().is_empty() {
        return Err(InstallerError::Other("command must not be blank".into()));
    }

    let (shell, flag) = shell_command();
    let preamble = format!("{}{}{}", run_dir.display(), std::path::MAIN_SEPARATOR, command);
    info!("Command to run: {}", command);

    let _guard = EXEC_LOCK.lock().await;

    let mut child = tokio::process::Command::new(shell)
        .arg(flag)
        .arg(command)
        .current_dir(run_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| InstallerError::Io {
            path: run_dir.to_path_buf(),
            source: e,
        })?;

    let stdout_reader = child.stdout.take().map(|out| {
        let preamble = preamble.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(out).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!("[{}] {}", preamble, line);
            }
        })
    });
    let stderr_reader = child.stderr.take().map(|err| {
        let preamble = preamble.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(err).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                error!("[{}] {}", preamble, line);
            }
        })
    });

    // Both readers drain concurrently; join them before taking the status.
    if let Some(reader) = stdout_reader {
        let _ = reader.await;
    }
    if let Some(reader) = stderr_reader {
        let _ = reader.await;
    }

    let status = child.wait().await.map_err(|e| InstallerError::Io {
        path: run_dir.to_path_buf(),
        source: e,
    })?;

    Ok(status.code().unwrap_or(-1))
}
