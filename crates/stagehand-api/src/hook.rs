use axum::{Router, extract::State, http::StatusCode, routing::post};
use stagehand_core::ChangeSender;
use tracing::info;

use crate::error::ApiError;

pub const SCM_HOOK_PATH: &str = "/hooks/scm";

/// Inbound source-control hook that feeds the pipeline scheduler.
pub struct HookApi {
    changes: ChangeSender,
}

impl HookApi {
    pub fn new(changes: ChangeSender) -> Self {
        Self { changes }
    }

    /// Routes:
    /// - POST /hooks/scm - queue a change event, body ignored
    pub fn router(self) -> Router {
        Router::new()
            .route(SCM_HOOK_PATH, post(scm_change))
            .with_state(self.changes)
    }
}

/// POST /hooks/scm
async fn scm_change(State(changes): State<ChangeSender>) -> Result<StatusCode, ApiError> {
    changes.notify("scm-hook")?;
    info!(target: "stagehand.api.hook", "change event queued");
    Ok(StatusCode::ACCEPTED)
}
