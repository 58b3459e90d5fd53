use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("pipeline has no stages")]
    EmptyPipeline,
    #[error("stage #{0} has an empty name")]
    EmptyStageName(usize),
    #[error("duplicate stage name: {0}")]
    DuplicateStage(String),
    #[error("stage '{0}' has an empty script")]
    EmptyScript(String),
    #[error("invalid pipeline definition: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        ModelError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Parse(e.to_string())
    }
}
