mod event;
pub use event::{EventKind, RunEvent};

mod view;
pub use view::{View, log_event, message_for};

mod journal;
pub use journal::{Journal, Subscribe};
