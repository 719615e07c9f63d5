use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtpChannelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unified io error: {0}")]
    UnifiedIO(#[from] unified_io::UnifiedIOError),
    #[error("channel is not armed: {0}")]
    NotArmed(String),
    #[error("peer side of the channel is gone: {0}")]
    ChannelClosed(String),
}

pub type RtpChannelResult<T> = Result<T, RtpChannelError>;
