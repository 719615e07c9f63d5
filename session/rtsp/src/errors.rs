use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtspClientError {
    #[error("resolve error: {0}")]
    Resolve(String),
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rtsp message error: {0}")]
    Message(#[from] rtsp_formats::errors::RtspMessageError),
    #[error("sdp error: {0}")]
    Sdp(#[from] sdp_formats::errors::SDPError),
    #[error("rtp channel error: {0}")]
    Channel(#[from] rtp_channel::RtpChannelError),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("session expired")]
    SessionExpired,
    #[error("operation timed out")]
    Timeout,
    #[error("peer closed the session")]
    PeerClosed,
}

pub type RtspClientResult<T> = Result<T, RtspClientError>;
