use async_trait::async_trait;
use stagehand_model::{Stage, StageEnv};
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// How a stage process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageExit {
    Code(i32),
    /// Terminated by a signal without an exit code.
    Signal,
    /// Stopped because the run was cancelled.
    Cancelled,
}

impl StageExit {
    #[inline]
    pub fn success(&self) -> bool {
        matches!(self, StageExit::Code(0))
    }

    #[inline]
    pub fn code(&self) -> Option<i32> {
        match self {
            StageExit::Code(code) => Some(*code),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StageExit::Code(code) => format!("exit code: {code}"),
            StageExit::Signal => "terminated by signal".to_string(),
            StageExit::Cancelled => "cancelled".to_string(),
        }
    }
}

/// Executes one stage script.
///
/// `Err` means the stage could not be run at all (e.g. spawn failure);
/// the runner treats it like a failing exit.
#[async_trait]
pub trait StageExecutor: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        stage: &Stage,
        env: &StageEnv,
        cancel: &CancellationToken,
    ) -> Result<StageExit, CoreError>;
}

/// Reports the current source revision for change polling.
#[async_trait]
pub trait RevisionProbe: Send + Sync + 'static {
    async fn revision(&self) -> Result<String, CoreError>;
}
