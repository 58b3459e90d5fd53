use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
use stagehand_core::{CoreError, StageExecutor, StageExit};
use stagehand_model::{Stage, StageEnv};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    error::ExecError,
    util::{kill_graceful, shell_command},
};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs stage scripts through the platform shell (`sh -c` / `cmd /C`).
///
/// Stdout and stderr are streamed line by line into the log under the
/// `stagehand.exec.out` target. A cancelled token kills the child
/// (SIGTERM first on unix) and reports [`StageExit::Cancelled`].
pub struct ShellExecutor {
    name: &'static str,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self { name: "shell" }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StageExecutor for ShellExecutor {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(
        &self,
        stage: &Stage,
        env: &StageEnv,
        cancel: &CancellationToken,
    ) -> Result<StageExit, CoreError> {
        if stage.script.trim().is_empty() {
            return Err(ExecError::EmptyScript.into());
        }

        let mut cmd = shell_command(&stage.script);
        if let Some(cwd) = &stage.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in env.resolved() {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        trace!(target: "stagehand.exec.shell", stage = %stage.name, script = %stage.script, "spawn");
        let mut child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("{}: {e}", stage.name)))?;

        let readers = [
            child.stdout.take().map(|out| forward(&stage.name, "stdout", out)),
            child.stderr.take().map(|err| forward(&stage.name, "stderr", err)),
        ];

        let exit = tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| ExecError::Wait(e.to_string()))?;
                match status.code() {
                    Some(code) => {
                        debug!(target: "stagehand.exec.shell", stage = %stage.name, code, "exited");
                        StageExit::Code(code)
                    }
                    None => {
                        debug!(target: "stagehand.exec.shell", stage = %stage.name, "terminated by signal");
                        StageExit::Signal
                    }
                }
            }
            _ = cancel.cancelled() => {
                debug!(target: "stagehand.exec.shell", stage = %stage.name, "cancelled; killing child");
                let _ = kill_graceful(&mut child).await;
                StageExit::Cancelled
            }
        };

        // Drain the output tail; background processes left by the script may hold the pipes open.
        for mut reader in readers.into_iter().flatten() {
            if exit == StageExit::Cancelled
                || tokio::time::timeout(DRAIN_TIMEOUT, &mut reader).await.is_err()
            {
                reader.abort();
            }
        }
        Ok(exit)
    }
}

fn forward<R>(stage: &str, stream: &'static str, pipe: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let stage = stage.to_string();
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: "stagehand.exec.out", stage = %stage, stream, "{line}");
        }
    })
}
