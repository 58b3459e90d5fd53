use stagehand_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid pipeline: {0}")]
    Model(#[from] ModelError),

    #[error("stage execution failed: {0}")]
    Exec(String),

    #[error("revision probe failed: {0}")]
    Probe(String),

    #[error("scheduler is not running")]
    SchedulerClosed,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected notification: {status}: {body}")]
    Rejected { status: u16, body: String },
}
