use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnifiedIOError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no bindable port pair at or above {0}")]
    NoAvailablePortPair(u16),
}

pub type UnifiedIOResult<T> = Result<T, UnifiedIOError>;
