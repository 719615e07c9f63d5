use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    pin::Pin,
    sync::Arc,
    task::Poll,
};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::UdpSocket,
};

use crate::{
    UnifiedIO,
    errors::{UnifiedIOError, UnifiedIOResult},
};

/// The lowest port considered for RTP receiver allocation. RTP wants an
/// even port with its odd neighbour reserved for RTCP.
pub const RTP_PORT_SEARCH_FLOOR: u16 = 15000;

const ANY_V4: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Clone)]
pub struct UdpIO {
    inner: Arc<UdpSocket>,
}

impl UdpIO {
    pub async fn bind(local_addr: SocketAddr) -> UnifiedIOResult<Self> {
        let socket = UdpSocket::bind(local_addr).await?;
        Ok(Self {
            inner: Arc::new(socket),
        })
    }

    pub async fn new(local_addr: SocketAddr, remote_addr: SocketAddr) -> UnifiedIOResult<Self> {
        let io = Self::bind(local_addr).await?;
        io.inner.connect(remote_addr).await?;
        Ok(io)
    }

    /// Binds the first free port at or above `local_port_start_from` and
    /// connects it to `remote_addr`.
    pub async fn new_with_remote_addr(
        local_port_start_from: u16,
        remote_addr: SocketAddr,
    ) -> UnifiedIOResult<(u16, Self)> {
        for port in local_port_start_from..=u16::MAX {
            let local_addr = SocketAddr::new(ANY_V4, port);
            match Self::new(local_addr, remote_addr).await {
                Ok(io) => return Ok((port, io)),
                Err(err) => {
                    tracing::trace!("failed to bind to port {}: {:?}", port, err);
                }
            }
        }
        Err(UnifiedIOError::NoAvailablePortPair(local_port_start_from))
    }

    /// Binds an even/odd local port pair for an RTP/RTCP flow: the returned
    /// RTP port is the first even `p >= max(search_start, 15000)` for which
    /// both `p` and `p + 1` are bindable. Neither socket is connected yet.
    pub async fn bind_even_pair(search_start: u16) -> UnifiedIOResult<((u16, Self), (u16, Self))> {
        let start = search_start.max(RTP_PORT_SEARCH_FLOOR);
        let start = start.saturating_add(start & 1);
        let mut port = start;
        while port < u16::MAX - 1 {
            let rtp = Self::bind(SocketAddr::new(ANY_V4, port)).await;
            if let Ok(rtp) = rtp {
                match Self::bind(SocketAddr::new(ANY_V4, port + 1)).await {
                    Ok(rtcp) => return Ok(((port, rtp), (port + 1, rtcp))),
                    Err(err) => {
                        tracing::trace!("odd neighbour of port {} is taken: {:?}", port, err);
                    }
                }
            }
            port += 2;
        }
        Err(UnifiedIOError::NoAvailablePortPair(start))
    }

    pub async fn connect_peer(&self, remote_addr: SocketAddr) -> UnifiedIOResult<()> {
        self.inner.connect(remote_addr).await?;
        Ok(())
    }

    pub async fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.recv(buf).await
    }

    pub async fn send(&self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.send(buf).await
    }

    pub fn local_port(&self) -> Option<u16> {
        self.inner.local_addr().ok().map(|addr| addr.port())
    }
}

impl UnifiedIO for UdpIO {
    fn get_underlying_io(&self) -> crate::UnderlyingIO {
        crate::UnderlyingIO::UDP {
            local_addr: self.inner.local_addr().ok(),
            peer_addr: self.inner.peer_addr().ok(),
        }
    }
}

impl AsyncRead for UdpIO {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.inner.poll_recv(cx, buf)
    }
}

impl AsyncWrite for UdpIO {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        self.inner.poll_send(cx, buf)
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::UdpIO;

    #[tokio::test]
    async fn even_pair_is_even_and_consecutive() {
        let ((rtp_port, _rtp), (rtcp_port, _rtcp)) = UdpIO::bind_even_pair(15000).await.unwrap();
        assert_eq!(rtp_port % 2, 0);
        assert!(rtp_port >= 15000);
        assert_eq!(rtcp_port, rtp_port + 1);
    }

    #[tokio::test]
    async fn even_pair_search_start_below_floor_is_clamped() {
        let ((rtp_port, _rtp), (_, _rtcp)) = UdpIO::bind_even_pair(1).await.unwrap();
        assert!(rtp_port >= 15000);
    }

    #[tokio::test]
    async fn concurrent_pairs_do_not_collide() {
        let first = UdpIO::bind_even_pair(15000).await.unwrap();
        let second = UdpIO::bind_even_pair(15000).await.unwrap();
        assert_ne!(first.0.0, second.0.0);
    }
}
