mod error;
pub use error::{CoreError, NotifyError};

pub mod config;
pub use config::RunnerConfig;

mod executor;
pub use executor::{RevisionProbe, StageExecutor, StageExit};

pub mod notify;
pub use notify::{LogNotifier, Notification, Notifier, WebhookNotifier};

pub mod pipeline;
pub use pipeline::PipelineRunner;

pub mod system;

pub mod trigger;
pub use trigger::{ChangeEvent, ChangeSender, Scheduler, change_channel};
