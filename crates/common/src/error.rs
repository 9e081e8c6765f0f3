use thiserror::Error;

#[derive(Debug, Error)]
pub enum SprintlensError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("upstream tracker error: {0}")]
    Upstream(String),

    #[error("invalid ticket payload: {0}")]
    InvalidPayload(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type SprintlensResult<T> = Result<T, SprintlensError>;
