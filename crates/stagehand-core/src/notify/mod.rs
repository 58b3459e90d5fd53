mod log;
pub use log::LogNotifier;

mod webhook;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use serde::Serialize;
use stagehand_model::{BuildResult, BuildStatus, RunId};

use crate::{error::NotifyError, system};

/// The single message emitted at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub channel: String,
    pub text: String,
    pub status: BuildStatus,
    pub run_id: RunId,
    pub run_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,
    pub host: String,
}

impl Notification {
    pub fn from_result(channel: &str, result: &BuildResult) -> Self {
        let host = system::hostname().to_string();
        let text = format!(
            "{}: pipeline '{}' run #{} ({}) on {} [{}] in {}s",
            result.summary(),
            result.pipeline,
            result.run_number,
            result.run_id,
            host,
            system::platform(),
            result.duration().as_secs(),
        );

        Self {
            channel: channel.to_string(),
            text,
            status: result.status,
            run_id: result.run_id.clone(),
            run_number: result.run_number,
            failed_stage: result.failed_stage.clone(),
            host,
        }
    }
}

/// Delivers the end-of-run notification.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn notify(&self, note: &Notification) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_model::{StageCategory, StageOutcome, StageStatus};
    use std::time::SystemTime;

    fn failed_result() -> BuildResult {
        let now = SystemTime::now();
        BuildResult::from_outcomes(
            RunId::from("run-7"),
            7,
            "stagehand",
            vec![StageOutcome {
                name: "Test".into(),
                category: StageCategory::Test,
                status: StageStatus::Failed,
                exit_code: Some(1),
                duration_ms: 10,
                reason: Some("exit code: 1".into()),
            }],
            now,
            now,
        )
    }

    #[test]
    fn notification_carries_result_and_run_id() {
        let note = Notification::from_result("#deployments", &failed_result());
        assert_eq!(note.channel, "#deployments");
        assert_eq!(note.status, BuildStatus::Failure);
        assert_eq!(note.failed_stage.as_deref(), Some("Test"));
        assert!(note.text.starts_with("FAILURE at stage 'Test' (TestFailure)"));
        assert!(note.text.contains("run #7 (run-7)"));
    }

    #[test]
    fn notification_json_shape() {
        let note = Notification::from_result("#ci", &failed_result());
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["channel"], "#ci");
        assert_eq!(json["status"], "FAILURE");
        assert_eq!(json["run_id"], "run-7");
        assert_eq!(json["run_number"], 7);
        assert_eq!(json["failed_stage"], "Test");
    }
}
