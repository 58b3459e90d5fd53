use stagehand_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("empty shell script")]
    EmptyScript,
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("non-zero exit code: {code}")]
    NonZeroExit { code: i32 },
    #[error("killed by signal")]
    KilledBySignal,
    #[error("empty output")]
    EmptyOutput,
}

impl From<ExecError> for CoreError {
    fn from(e: ExecError) -> Self {
        CoreError::Exec(e.to_string())
    }
}
