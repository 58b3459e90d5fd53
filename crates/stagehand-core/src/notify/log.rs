use async_trait::async_trait;
use tracing::info;

use crate::{
    error::NotifyError,
    notify::{Notification, Notifier},
};

/// Writes the notification to the log instead of sending it anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, note: &Notification) -> Result<(), NotifyError> {
        info!(
            target: "stagehand.notify",
            channel = %note.channel,
            status = %note.status,
            run = %note.run_id,
            "{}",
            note.text
        );
        Ok(())
    }
}
