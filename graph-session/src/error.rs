use graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a mutation is already running for repository `{0}`")]
    MutationInFlight(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
