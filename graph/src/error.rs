use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("payload error: {0}")]
    Payload(String),
    #[error("unknown transfer direction `{0}`, expected `pull` or `push`")]
    Direction(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
