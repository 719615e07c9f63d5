use std::net::SocketAddr;

use tokio::net::TcpListener;
use unified_io::tcp::TcpIO;

use crate::{
    config::RtspServerConfig,
    errors::RtspServerResult,
    session::RtspSession,
    source::MediaSource,
};

#[derive(Debug)]
pub struct RtspServer {
    config: RtspServerConfig,
    source: MediaSource,
    listener: TcpListener,
}

impl RtspServer {
    pub async fn bind(config: RtspServerConfig, source: MediaSource) -> RtspServerResult<Self> {
        let listener = TcpListener::bind((config.address, config.port)).await?;
        tracing::info!("rtsp server is listening on {}", listener.local_addr()?);
        Ok(Self {
            config,
            source,
            listener,
        })
    }

    pub fn local_addr(&self) -> RtspServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(&self) -> RtspServerResult<()> {
        loop {
            let (tcp_stream, addr) = self.listener.accept().await?;
            tracing::info!("got new rtsp connection, peer addr: {}", addr);

            let mut session = RtspSession::new(
                Box::pin(TcpIO::new(tcp_stream)),
                addr,
                self.source.clone(),
                self.config.session_timeout_secs,
            );
            tokio::task::spawn(async move {
                match session.run().await {
                    Ok(()) => {
                        tracing::info!("rtsp session gracefully closed, peer addr: {}", addr);
                    }
                    Err(err) => {
                        tracing::error!("rtsp session exit with error: {}", err);
                    }
                }
            });
        }
    }
}
