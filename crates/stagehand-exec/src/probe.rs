use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use stagehand_core::{CoreError, RevisionProbe};
use tracing::trace;

use crate::{error::ExecError, util::shell_command};

/// Revision probe backed by a shell command, e.g. `git rev-parse HEAD`.
///
/// The trimmed stdout is the revision; a non-zero exit or empty output is an error.
pub struct ShellProbe {
    script: String,
    cwd: Option<PathBuf>,
}

impl ShellProbe {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    async fn output(&self) -> Result<String, ExecError> {
        if self.script.trim().is_empty() {
            return Err(ExecError::EmptyScript);
        }

        let mut cmd = shell_command(&self.script);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        trace!(target: "stagehand.exec.probe", script = %self.script, "probing revision");
        let out = cmd
            .output()
            .await
            .map_err(|e| ExecError::Spawn(e.to_string()))?;

        if !out.status.success() {
            return Err(match out.status.code() {
                Some(code) => ExecError::NonZeroExit { code },
                None => ExecError::KilledBySignal,
            });
        }

        let revision = String::from_utf8_lossy(&out.stdout).trim().to_string();
        if revision.is_empty() {
            return Err(ExecError::EmptyOutput);
        }
        Ok(revision)
    }
}

#[async_trait]
impl RevisionProbe for ShellProbe {
    async fn revision(&self) -> Result<String, CoreError> {
        self.output()
            .await
            .map_err(|e| CoreError::Probe(e.to_string()))
    }
}
