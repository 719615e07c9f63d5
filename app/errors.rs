use config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("session description error: {0}")]
    SdpError(#[from] sdp_formats::errors::SDPError),
    #[error("rtsp server error: {0}")]
    RtspServerError(#[from] rtsp_server::errors::RtspServerError),
    #[error("rtsp client error: {0}")]
    RtspClientError(#[from] rtsp_client::RtspClientError),
}

pub(crate) type AppResult<T> = Result<T, AppError>;
