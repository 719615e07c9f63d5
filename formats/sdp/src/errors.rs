use thiserror::Error;

#[derive(Debug, Error)]
pub enum SDPError {
    #[error("malformed session description: {0}")]
    Malformed(String),
    #[error("missing mandatory line: {0}")]
    MissingLine(&'static str),
}

pub type SDPResult<T> = Result<T, SDPError>;
