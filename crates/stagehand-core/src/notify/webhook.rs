use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::NotifyError,
    notify::{Notification, Notifier},
};

/// Posts the notification as JSON to a chat webhook (Slack-compatible `channel` + `text`).
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, note: &Notification) -> Result<(), NotifyError> {
        debug!(target: "stagehand.notify", url = %self.url, run = %note.run_id, "posting notification");

        let response = self.client.post(&self.url).json(note).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        time::SystemTime,
    };

    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use stagehand_model::{BuildResult, RunId};

    type Inbox = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn spawn_hook(status: StatusCode) -> (String, Inbox) {
        let inbox: Inbox = Arc::default();
        let app = Router::new()
            .route(
                "/hook",
                post(
                    move |State(inbox): State<Inbox>, Json(body): Json<serde_json::Value>| async move {
                        inbox.lock().unwrap().push(body);
                        status
                    },
                ),
            )
            .with_state(Arc::clone(&inbox));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/hook"), inbox)
    }

    fn note() -> Notification {
        let now = SystemTime::now();
        let result = BuildResult::from_outcomes(RunId::from("r-1"), 1, "p", Vec::new(), now, now);
        Notification::from_result("#ci", &result)
    }

    #[tokio::test]
    async fn posts_json_body() {
        let (url, inbox) = spawn_hook(StatusCode::OK).await;
        WebhookNotifier::new(url).notify(&note()).await.unwrap();

        let received = inbox.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["channel"], "#ci");
        assert_eq!(received[0]["status"], "SUCCESS");
        assert_eq!(received[0]["run_id"], "r-1");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (url, _inbox) = spawn_hook(StatusCode::FORBIDDEN).await;
        let err = WebhookNotifier::new(url).notify(&note()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 403, .. }));
    }

    #[tokio::test]
    async fn unreachable_webhook_is_http_error() {
        let err = WebhookNotifier::new("http://127.0.0.1:1/hook")
            .notify(&note())
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)));
    }
}
