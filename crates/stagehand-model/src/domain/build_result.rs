use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

use crate::{BuildStatus, FailureKind, RunId, StageCategory, StageStatus};

/// What happened to one stage during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOutcome {
    pub name: String,
    pub category: StageCategory,
    pub status: StageStatus,
    /// Process exit code, if the process exited normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    /// Why the stage did not succeed (spawn error, signal, cancellation, exit code).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StageOutcome {
    pub fn skipped(name: impl Into<String>, category: StageCategory) -> Self {
        Self {
            name: name.into(),
            category,
            status: StageStatus::Skipped,
            exit_code: None,
            duration_ms: 0,
            reason: None,
        }
    }
}

/// Result of one run. Produced once, handed to the notifier, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub run_id: RunId,
    /// 1-based run counter within the runner process.
    pub run_number: u64,
    pub pipeline: String,
    pub status: BuildStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub stages: Vec<StageOutcome>,
    #[serde(with = "crate::domain::time_serde")]
    pub started_at: SystemTime,
    #[serde(with = "crate::domain::time_serde")]
    pub finished_at: SystemTime,
}

impl BuildResult {
    /// Derive the verdict from per-stage outcomes.
    ///
    /// The run fails iff some stage has [`StageStatus::Failed`]; the first such stage is reported.
    pub fn from_outcomes(
        run_id: RunId,
        run_number: u64,
        pipeline: impl Into<String>,
        stages: Vec<StageOutcome>,
        started_at: SystemTime,
        finished_at: SystemTime,
    ) -> Self {
        let failed = stages.iter().find(|s| s.status == StageStatus::Failed);
        let status = if failed.is_some() {
            BuildStatus::Failure
        } else {
            BuildStatus::Success
        };
        let failed_stage = failed.map(|s| s.name.clone());
        let failure = failed.map(|s| s.category.failure_kind());

        Self {
            run_id,
            run_number,
            pipeline: pipeline.into(),
            status,
            failed_stage,
            failure,
            stages,
            started_at,
            finished_at,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Success
    }

    pub fn failed_outcome(&self) -> Option<&StageOutcome> {
        self.stages.iter().find(|s| s.status == StageStatus::Failed)
    }

    pub fn duration(&self) -> Duration {
        self.finished_at
            .duration_since(self.started_at)
            .unwrap_or_default()
    }

    /// One-line human summary, e.g. `FAILURE at stage 'Test' (TestFailure)`.
    pub fn summary(&self) -> String {
        match (&self.failed_stage, &self.failure) {
            (Some(stage), Some(kind)) => format!("{} at stage '{}' ({})", self.status, stage, kind),
            (Some(stage), None) => format!("{} at stage '{}'", self.status, stage),
            _ => self.status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, category: StageCategory, status: StageStatus) -> StageOutcome {
        StageOutcome {
            name: name.to_string(),
            category,
            status,
            exit_code: Some(if status == StageStatus::Succeeded { 0 } else { 1 }),
            duration_ms: 5,
            reason: None,
        }
    }

    fn result(stages: Vec<StageOutcome>) -> BuildResult {
        let now = SystemTime::now();
        BuildResult::from_outcomes(RunId::from("r"), 1, "p", stages, now, now)
    }

    #[test]
    fn all_succeeded_is_success() {
        let r = result(vec![
            outcome("Setup", StageCategory::Setup, StageStatus::Succeeded),
            outcome("Test", StageCategory::Test, StageStatus::Succeeded),
        ]);
        assert!(r.is_success());
        assert!(r.failed_stage.is_none());
        assert_eq!(r.summary(), "SUCCESS");
    }

    #[test]
    fn tolerated_failure_keeps_success() {
        let r = result(vec![
            outcome("Status", StageCategory::Start, StageStatus::Tolerated),
            outcome("Test", StageCategory::Test, StageStatus::Succeeded),
        ]);
        assert!(r.is_success());
        assert!(r.failure.is_none());
    }

    #[test]
    fn failure_reports_stage_and_kind() {
        let r = result(vec![
            outcome("Setup", StageCategory::Setup, StageStatus::Succeeded),
            outcome("Test", StageCategory::Test, StageStatus::Failed),
        ]);
        assert_eq!(r.status, BuildStatus::Failure);
        assert_eq!(r.failed_stage.as_deref(), Some("Test"));
        assert_eq!(r.failure, Some(FailureKind::TestFailure));
        assert_eq!(r.summary(), "FAILURE at stage 'Test' (TestFailure)");
        assert_eq!(r.failed_outcome().map(|s| s.exit_code), Some(Some(1)));
    }

    #[test]
    fn skipped_stages_keep_first_failure() {
        let r = result(vec![
            outcome("Deploy", StageCategory::Deploy, StageStatus::Failed),
            StageOutcome::skipped("Test", StageCategory::Test),
        ]);
        assert_eq!(r.stages[1].status, StageStatus::Skipped);
        assert_eq!(r.failed_stage.as_deref(), Some("Deploy"));
        assert_eq!(r.failure, Some(FailureKind::DeployFailure));
    }

    #[test]
    fn serializes_camel_case_without_empty_failure() {
        let r = result(vec![outcome("Setup", StageCategory::Setup, StageStatus::Succeeded)]);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"runNumber\":1"));
        assert!(json.contains("\"status\":\"SUCCESS\""));
        assert!(!json.contains("failedStage"));
    }
}
