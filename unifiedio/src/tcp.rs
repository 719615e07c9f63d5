use std::{pin::Pin, task::Poll};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

use crate::UnifiedIO;

#[derive(Debug)]
pub struct TcpIO {
    inner: TcpStream,
}

impl TcpIO {
    pub fn new(inner: TcpStream) -> Self {
        Self { inner }
    }
}

impl UnifiedIO for TcpIO {
    fn get_underlying_io(&self) -> crate::UnderlyingIO {
        crate::UnderlyingIO::TCP {
            local_addr: self.inner.local_addr().ok(),
            peer_addr: self.inner.peer_addr().ok(),
        }
    }
}

impl AsyncRead for TcpIO {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for TcpIO {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
