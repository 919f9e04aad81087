//! Dumping tool process runner.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::oneshot;

use crate::domain::{DiscForgeError, Result};

/// Result of one tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, -1 when the process was killed by a signal.
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Cancels a running tool; dropping it without calling `cancel` does not.
#[derive(Debug)]
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

/// Run the tool to completion.
pub async fn execute(path: &Path, args: &[String]) -> Result<ToolOutput> {
    let (_handle, rx) = CancelHandle::new();
    execute_cancellable(path, args, rx).await
}

/// Run the tool, killing it if `cancel` fires first.
pub async fn execute_cancellable(
    path: &Path,
    args: &[String],
    mut cancel: oneshot::Receiver<()>,
) -> Result<ToolOutput> {
    let start = Instant::now();
    tracing::info!(tool = %path.display(), args = ?args, "Launching dumping tool");

    let mut child = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DiscForgeError::ToolLaunch(format!("{}: {e}", path.display())))?;

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(out) = stdout.as_mut() {
            let _ = out.read_to_end(&mut buf).await;
        }
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(err) = stderr.as_mut() {
            let _ = err.read_to_end(&mut buf).await;
        }
        buf
    });

    let status = tokio::select! {
        status = child.wait() => status?,
        Ok(()) = &mut cancel => {
            tracing::warn!(tool = %path.display(), "Cancelling dumping tool");
            child.kill().await?;
            return Err(DiscForgeError::Cancelled);
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(ToolOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&stdout).to_string(),
        stderr: String::from_utf8_lossy(&stderr).to_string(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let out = execute(Path::new("echo"), &["hello".to_string()]).await.unwrap();
        assert!(out.success());
        assert!(out.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn failing_tool_reports_exit_code() {
        let out = execute(Path::new("false"), &[]).await.unwrap();
        assert!(!out.success());
        assert_ne!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn missing_tool_is_launch_error() {
        let err = execute(Path::new("/nonexistent/DiscImageCreator"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DiscForgeError::ToolLaunch(_)));
    }

    #[tokio::test]
    async fn cancel_kills_the_process() {
        let (handle, rx) = CancelHandle::new();
        let run = tokio::spawn(async move {
            execute_cancellable(Path::new("sleep"), &["30".to_string()], rx).await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("runner did not stop")
            .unwrap();
        assert!(matches!(result, Err(DiscForgeError::Cancelled)));
    }
}
