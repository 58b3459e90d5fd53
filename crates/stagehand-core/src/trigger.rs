use std::{sync::Arc, time::Duration};

use stagehand_observe::{EventKind, RunEvent};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{error::CoreError, executor::RevisionProbe, pipeline::PipelineRunner};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);
/// Lower bound for [`Scheduler::with_poll_interval`]; `tokio::time::interval` rejects zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

const CHANGE_QUEUE: usize = 16;

/// Source-control change notification (push hook, manual trigger, ...).
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub source: String,
}

/// Cloneable handle that feeds change events into a [`Scheduler`].
#[derive(Debug, Clone)]
pub struct ChangeSender {
    tx: mpsc::Sender<ChangeEvent>,
}

impl ChangeSender {
    /// Queue a change event.
    ///
    /// A full queue already guarantees a follow-up run, so the event is dropped silently.
    pub fn notify(&self, source: impl Into<String>) -> Result<(), CoreError> {
        let event = ChangeEvent {
            source: source.into(),
        };
        match self.tx.try_send(event) {
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(CoreError::SchedulerClosed),
        }
    }
}

pub fn change_channel() -> (ChangeSender, mpsc::Receiver<ChangeEvent>) {
    let (tx, rx) = mpsc::channel(CHANGE_QUEUE);
    (ChangeSender { tx }, rx)
}

enum Poll {
    Build(Option<String>),
    Idle,
}

/// Starts pipeline runs on change events or on a polling interval, whichever fires first.
///
/// Runs never overlap: the loop awaits each run before selecting again, and
/// change events that arrive during a run collapse into one follow-up run.
/// On a polling tick the revision probe decides whether anything changed; the
/// first tick always builds. Without a probe every tick builds.
pub struct Scheduler {
    runner: Arc<PipelineRunner>,
    probe: Option<Arc<dyn RevisionProbe>>,
    poll_interval: Duration,
    last_revision: Option<String>,
}

impl Scheduler {
    pub fn new(runner: Arc<PipelineRunner>) -> Self {
        Self {
            runner,
            probe: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            last_revision: None,
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn RevisionProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Intervals shorter than [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Drive the schedule until `cancel` fires; returns the number of runs executed.
    pub async fn run(
        mut self,
        mut changes: mpsc::Receiver<ChangeEvent>,
        cancel: CancellationToken,
    ) -> u64 {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut listening = true;
        let mut runs = 0u64;

        'schedule: loop {
            let mut revision = tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'schedule,
                _ = ticker.tick() => match self.poll().await {
                    Poll::Build(revision) => revision,
                    Poll::Idle => continue 'schedule,
                },
                event = changes.recv(), if listening => match event {
                    Some(event) => {
                        self.received(&event);
                        self.probe_revision().await
                    }
                    None => {
                        debug!(target: "stagehand.core.trigger", "change channel closed; polling only");
                        listening = false;
                        continue 'schedule;
                    }
                },
            };

            loop {
                self.runner.run(&cancel).await;
                runs += 1;
                if let Some(rev) = revision.take() {
                    self.last_revision = Some(rev);
                }
                if cancel.is_cancelled() {
                    break 'schedule;
                }

                let mut pending = false;
                while let Ok(event) = changes.try_recv() {
                    self.received(&event);
                    pending = true;
                }
                if !pending {
                    break;
                }
                revision = self.probe_revision().await;
            }
        }

        debug!(target: "stagehand.core.trigger", runs, "scheduler stopped");
        runs
    }

    async fn poll(&mut self) -> Poll {
        let Some(probe) = &self.probe else {
            return Poll::Build(None);
        };

        match probe.revision().await {
            Ok(rev) if self.last_revision.as_deref() == Some(rev.as_str()) => {
                self.runner
                    .emit(RunEvent::new(EventKind::RevisionUnchanged).with_reason(rev));
                Poll::Idle
            }
            Ok(rev) => {
                self.runner
                    .emit(RunEvent::new(EventKind::RevisionChanged).with_reason(rev.clone()));
                Poll::Build(Some(rev))
            }
            Err(e) => {
                self.runner
                    .emit(RunEvent::new(EventKind::ProbeFailed).with_reason(e.to_string()));
                Poll::Idle
            }
        }
    }

    /// Best-effort revision for a change-triggered run.
    async fn probe_revision(&self) -> Option<String> {
        let probe = self.probe.as_ref()?;
        match probe.revision().await {
            Ok(rev) => Some(rev),
            Err(e) => {
                self.runner
                    .emit(RunEvent::new(EventKind::ProbeFailed).with_reason(e.to_string()));
                None
            }
        }
    }

    fn received(&self, event: &ChangeEvent) {
        self.runner
            .emit(RunEvent::new(EventKind::ChangeReceived).with_reason(event.source.clone()));
    }
}
