use std::borrow::Borrow;
use tracing::{debug, error, info, warn};

use crate::subscriber::event::{EventKind, RunEvent};

pub trait View {
    fn as_run(&self) -> &str;
    fn as_stage(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn exit_code(&self) -> i32;
    fn duration_ms(&self) -> u64;
    fn as_status(&self) -> &str;
    fn as_failure(&self) -> String;
    fn kind(&self) -> EventKind;
}

impl<T> View for T
where
    T: Borrow<RunEvent>,
{
    #[inline]
    fn as_run(&self) -> &str {
        self.borrow().run_id.as_ref().map_or("none", |id| id.as_str())
    }
    #[inline]
    fn as_stage(&self) -> &str {
        self.borrow().stage.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn exit_code(&self) -> i32 {
        self.borrow().exit_code.unwrap_or(-1)
    }
    #[inline]
    fn duration_ms(&self) -> u64 {
        self.borrow().duration_ms.unwrap_or(0)
    }
    #[inline]
    fn as_status(&self) -> &str {
        self.borrow().status.map_or("unknown", |s| s.as_str())
    }
    #[inline]
    fn as_failure(&self) -> String {
        self.borrow()
            .failure
            .map_or_else(|| "none".to_string(), |f| f.to_string())
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // run
        EventKind::RunStarted => "pipeline run started",
        EventKind::RunSucceeded => "pipeline run succeeded",
        EventKind::RunFailed => "pipeline run failed",

        // stage
        EventKind::StageStarting => "stage starting",
        EventKind::StageSucceeded => "stage succeeded",
        EventKind::StageFailed => "stage failed; aborting run",
        EventKind::StageTolerated => "stage failed; failure tolerated by policy",
        EventKind::StageSkipped => "stage skipped after earlier failure",

        // notification
        EventKind::NotificationSent => "build notification sent",
        EventKind::NotificationFailed => "build notification could not be delivered",

        // trigger
        EventKind::RevisionChanged => "source revision changed",
        EventKind::RevisionUnchanged => "source revision unchanged; nothing to build",
        EventKind::ProbeFailed => "revision probe failed",
        EventKind::ChangeReceived => "source change event received",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        // run
        EventKind::RunStarted => info!(run = e.as_run(), "{msg}"),
        EventKind::RunSucceeded => info!(
            run = e.as_run(),
            status = e.as_status(),
            duration_ms = e.duration_ms(),
            "{msg}"
        ),
        EventKind::RunFailed => error!(
            run = e.as_run(),
            status = e.as_status(),
            stage = e.as_stage(),
            failure = %e.as_failure(),
            duration_ms = e.duration_ms(),
            "{msg}"
        ),

        // stage
        EventKind::StageStarting => info!(run = e.as_run(), stage = e.as_stage(), "{msg}"),
        EventKind::StageSucceeded => info!(
            run = e.as_run(),
            stage = e.as_stage(),
            duration_ms = e.duration_ms(),
            "{msg}"
        ),
        EventKind::StageFailed => error!(
            run = e.as_run(),
            stage = e.as_stage(),
            exit_code = e.exit_code(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::StageTolerated => warn!(
            run = e.as_run(),
            stage = e.as_stage(),
            exit_code = e.exit_code(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::StageSkipped => debug!(run = e.as_run(), stage = e.as_stage(), "{msg}"),

        // notification
        EventKind::NotificationSent => debug!(run = e.as_run(), "{msg}"),
        EventKind::NotificationFailed => {
            warn!(run = e.as_run(), reason = e.as_reason(), "{msg}")
        }

        // trigger
        EventKind::RevisionChanged => info!(revision = e.as_reason(), "{msg}"),
        EventKind::RevisionUnchanged => debug!(revision = e.as_reason(), "{msg}"),
        EventKind::ProbeFailed => warn!(reason = e.as_reason(), "{msg}"),
        EventKind::ChangeReceived => info!(source = e.as_reason(), "{msg}"),
    }
}
