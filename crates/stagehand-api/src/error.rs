use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] stagehand_core::CoreError),

    #[cfg(feature = "client")]
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ApiError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(stagehand_core::CoreError::SchedulerClosed) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
