use stagehand_model::{BuildStatus, FailureKind, RunId};

/// Lifecycle point reported by the runner and the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // run
    RunStarted,
    RunSucceeded,
    RunFailed,

    // stage
    StageStarting,
    StageSucceeded,
    StageFailed,
    StageTolerated,
    StageSkipped,

    // notification
    NotificationSent,
    NotificationFailed,

    // trigger
    RevisionChanged,
    RevisionUnchanged,
    ProbeFailed,
    ChangeReceived,
}

/// Pipeline event; optional fields are set depending on [`EventKind`].
#[derive(Debug, Clone)]
pub struct RunEvent {
    pub kind: EventKind,
    pub run_id: Option<RunId>,
    pub stage: Option<String>,
    pub reason: Option<String>,
    pub exit_code: Option<i32>,
    pub duration_ms: Option<u64>,
    pub status: Option<BuildStatus>,
    pub failure: Option<FailureKind>,
}

impl RunEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            run_id: None,
            stage: None,
            reason: None,
            exit_code: None,
            duration_ms: None,
            status: None,
            failure: None,
        }
    }

    pub fn with_run(mut self, run_id: &RunId) -> Self {
        self.run_id = Some(run_id.clone());
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_status(mut self, status: BuildStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_failure(mut self, failure: Option<FailureKind>) -> Self {
        self.failure = failure;
        self
    }
}
