mod error;
pub use error::ApiError;

#[cfg(feature = "http")]
mod service;
#[cfg(feature = "http")]
pub use service::{ServiceApi, ServiceConfig, serve, shutdown_signal};

#[cfg(feature = "http")]
mod hook;
#[cfg(feature = "http")]
pub use hook::HookApi;

#[cfg(feature = "client")]
mod verify;
#[cfg(feature = "client")]
pub use verify::{Check, VerifyConfig, VerifyReport, Verifier};

#[cfg(feature = "http")]
pub use axum;
