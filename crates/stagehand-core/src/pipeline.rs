use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant, SystemTime},
};

use stagehand_model::{
    BuildResult, PipelineDef, RunId, Stage, StageEnv, StageOutcome, StageStatus,
};
use stagehand_observe::{EventKind, RunEvent, Subscribe};
use tokio_util::sync::CancellationToken;
use tracing::{instrument, trace};

use crate::{
    error::CoreError,
    executor::{StageExecutor, StageExit},
    notify::{Notification, Notifier},
};

pub const ENV_RUN_ID: &str = "STAGEHAND_RUN_ID";
pub const ENV_RUN_NUMBER: &str = "STAGEHAND_RUN_NUMBER";

/// Runs a pipeline definition stage by stage and reports each run once.
///
/// Stages execute strictly in declared order. The first failing stage whose
/// policy is `abort` ends the run: every later stage is recorded as skipped
/// and never executed. Nothing is retried.
pub struct PipelineRunner {
    def: Arc<PipelineDef>,
    executor: Arc<dyn StageExecutor>,
    notifier: Arc<dyn Notifier>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    env: StageEnv,
    runs: AtomicU64,
}

impl PipelineRunner {
    pub fn new(
        def: PipelineDef,
        executor: Arc<dyn StageExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        def.validate()?;
        Ok(Self {
            def: Arc::new(def),
            executor,
            notifier,
            subscribers: Vec::new(),
            env: StageEnv::new(),
            runs: AtomicU64::new(0),
        })
    }

    /// Base environment exported to every stage.
    pub fn with_env(mut self, env: StageEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Execute one run and send its notification.
    ///
    /// A cancelled token stops the current stage and fails the run; the
    /// notification is still sent. Delivery errors are reported as events and
    /// never change the result.
    #[instrument(level = "debug", skip_all, fields(pipeline = %self.def.name))]
    pub async fn run(&self, cancel: &CancellationToken) -> BuildResult {
        let result = self.execute(cancel).await;
        self.notify(&result).await;
        result
    }

    async fn execute(&self, cancel: &CancellationToken) -> BuildResult {
        let run_number = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let run_id = RunId::new();
        let started_at = SystemTime::now();
        let clock = Instant::now();

        let env = self
            .env
            .clone()
            .with(ENV_RUN_ID, run_id.as_str())
            .with(ENV_RUN_NUMBER, run_number.to_string());

        self.emit(RunEvent::new(EventKind::RunStarted).with_run(&run_id));

        let mut outcomes = Vec::with_capacity(self.def.stages.len());
        let mut aborted = false;
        for stage in &self.def.stages {
            if aborted {
                self.emit(
                    RunEvent::new(EventKind::StageSkipped)
                        .with_run(&run_id)
                        .with_stage(&stage.name),
                );
                outcomes.push(StageOutcome::skipped(&stage.name, stage.category));
                continue;
            }

            let outcome = self.run_stage(&run_id, stage, &env, cancel).await;
            aborted = outcome.status == StageStatus::Failed;
            outcomes.push(outcome);
        }

        let result = BuildResult::from_outcomes(
            run_id,
            run_number,
            self.def.name.clone(),
            outcomes,
            started_at,
            SystemTime::now(),
        );

        let kind = if result.is_success() {
            EventKind::RunSucceeded
        } else {
            EventKind::RunFailed
        };
        let mut event = RunEvent::new(kind)
            .with_run(&result.run_id)
            .with_status(result.status)
            .with_failure(result.failure)
            .with_duration_ms(as_millis(clock.elapsed()));
        if let Some(stage) = &result.failed_stage {
            event = event.with_stage(stage);
        }
        self.emit(event);

        result
    }

    async fn run_stage(
        &self,
        run_id: &RunId,
        stage: &Stage,
        env: &StageEnv,
        cancel: &CancellationToken,
    ) -> StageOutcome {
        self.emit(
            RunEvent::new(EventKind::StageStarting)
                .with_run(run_id)
                .with_stage(&stage.name),
        );

        let clock = Instant::now();
        let env = env.overlaid(&stage.env);
        let exit = if cancel.is_cancelled() {
            Ok(StageExit::Cancelled)
        } else {
            trace!(executor = self.executor.name(), stage = %stage.name, "executing stage");
            self.executor.execute(stage, &env, cancel).await
        };
        let duration_ms = as_millis(clock.elapsed());

        let (exit_code, reason, cancelled) = match exit {
            Ok(exit) if exit.success() => {
                self.emit(
                    RunEvent::new(EventKind::StageSucceeded)
                        .with_run(run_id)
                        .with_stage(&stage.name)
                        .with_duration_ms(duration_ms),
                );
                return StageOutcome {
                    name: stage.name.clone(),
                    category: stage.category,
                    status: StageStatus::Succeeded,
                    exit_code: Some(0),
                    duration_ms,
                    reason: None,
                };
            }
            Ok(exit) => (exit.code(), exit.describe(), exit == StageExit::Cancelled),
            Err(e) => (None, e.to_string(), false),
        };

        // Cancellation always aborts, whatever the stage policy says.
        let (status, kind) = if stage.is_tolerated() && !cancelled {
            (StageStatus::Tolerated, EventKind::StageTolerated)
        } else {
            (StageStatus::Failed, EventKind::StageFailed)
        };
        self.emit(
            RunEvent::new(kind)
                .with_run(run_id)
                .with_stage(&stage.name)
                .with_exit_code(exit_code)
                .with_reason(reason.clone())
                .with_duration_ms(duration_ms),
        );

        StageOutcome {
            name: stage.name.clone(),
            category: stage.category,
            status,
            exit_code,
            duration_ms,
            reason: Some(reason),
        }
    }

    async fn notify(&self, result: &BuildResult) {
        let note = Notification::from_result(&self.def.channel, result);
        let event = match self.notifier.notify(&note).await {
            Ok(()) => RunEvent::new(EventKind::NotificationSent).with_run(&result.run_id),
            Err(e) => RunEvent::new(EventKind::NotificationFailed)
                .with_run(&result.run_id)
                .with_reason(e.to_string()),
        };
        self.emit(event);
    }

    pub(crate) fn emit(&self, event: RunEvent) {
        for sub in &self.subscribers {
            sub.on_event(&event);
        }
    }
}

fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
