#[derive(Debug, thiserror::Error)]
pub enum QueryPipelineError {
    #[error("Duplicate word literal: {0}")]
    DuplicateLiteral(String),

    #[error("Word literal must not be empty")]
    EmptyLiteral,

    #[error("Invalid boost score: {0}")]
    InvalidBoost(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QueryPipelineError>;
