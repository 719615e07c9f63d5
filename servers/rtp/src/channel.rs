use std::{
    net::{IpAddr, SocketAddr},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use rtsp_formats::interleaved::RtspInterleavedPacket;
use tokio::sync::mpsc;
use tokio_util::bytes::Bytes;
use unified_io::udp::UdpIO;

use crate::{
    errors::{RtpChannelError, RtpChannelResult},
    events::{RtpChannelEvent, RtpChannelEventReceiver, RtpChannelEventSender, is_rtcp_bye},
};

const UDP_RECV_BUFFER_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtpChannelKind {
    /// Server side: pushes packets toward the peer's advertised ports.
    UdpSender,
    /// Client side: receives on a locally allocated even/odd pair.
    UdpReceiver,
    /// Either side: rides on the RTSP control connection.
    Interleaved,
}

#[derive(Debug, Default)]
pub struct ChannelStatistics {
    rtp_packets_in: AtomicU64,
    rtp_packets_out: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
}

impl ChannelStatistics {
    fn on_received(&self, bytes: usize) {
        self.rtp_packets_in.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn on_sent(&self, bytes: usize) {
        self.rtp_packets_out.fetch_add(1, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn packets_received(&self) -> u64 {
        self.rtp_packets_in.load(Ordering::Relaxed)
    }

    pub fn packets_sent(&self) -> u64 {
        self.rtp_packets_out.load(Ordering::Relaxed)
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_in.load(Ordering::Relaxed)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_out.load(Ordering::Relaxed)
    }
}

/// The delivery capability a negotiated session owns. One instance serves
/// exactly one media session; it is created at SETUP and torn down with
/// the session.
///
/// The interleaved variant holds no sockets at all: inbound frames are
/// pushed in by the control connection's demultiplexer and outbound
/// packets leave as `$`-framed messages through `out_tx`.
#[derive(Debug)]
pub struct RtpChannel {
    kind: RtpChannelKind,
    ssrc: Option<u32>,

    rtp_io: Option<UdpIO>,
    rtcp_io: Option<UdpIO>,
    local_rtp_port: Option<u16>,
    local_rtcp_port: Option<u16>,

    interleaved_ids: Option<(u8, u8)>,
    interleaved_out: Option<mpsc::UnboundedSender<RtspInterleavedPacket>>,

    event_tx: RtpChannelEventSender,
    event_rx: Option<RtpChannelEventReceiver>,
    read_task: Option<tokio::task::JoinHandle<()>>,

    statistics: Arc<ChannelStatistics>,
}

impl RtpChannel {
    fn new(kind: RtpChannelKind) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            kind,
            ssrc: None,
            rtp_io: None,
            rtcp_io: None,
            local_rtp_port: None,
            local_rtcp_port: None,
            interleaved_ids: None,
            interleaved_out: None,
            event_tx,
            event_rx: Some(event_rx),
            read_task: None,
            statistics: Arc::new(ChannelStatistics::default()),
        }
    }

    /// Server side UDP pair, bound upward from `local_port_start` and
    /// connected to the peer's advertised RTP/RTCP ports.
    pub async fn sender(
        peer_ip: IpAddr,
        peer_rtp_port: u16,
        peer_rtcp_port: u16,
        local_port_start: u16,
    ) -> RtpChannelResult<Self> {
        let (rtp_port, rtp_io) = UdpIO::new_with_remote_addr(
            local_port_start,
            SocketAddr::new(peer_ip, peer_rtp_port),
        )
        .await?;
        let (rtcp_port, rtcp_io) = UdpIO::new_with_remote_addr(
            rtp_port + 1,
            SocketAddr::new(peer_ip, peer_rtcp_port),
        )
        .await?;
        tracing::info!(
            "created udp sender pair, rtp port: {}, rtcp port: {}",
            rtp_port,
            rtcp_port
        );

        let mut channel = Self::new(RtpChannelKind::UdpSender);
        channel.rtp_io = Some(rtp_io);
        channel.rtcp_io = Some(rtcp_io);
        channel.local_rtp_port = Some(rtp_port);
        channel.local_rtcp_port = Some(rtcp_port);
        Ok(channel)
    }

    /// Client side UDP pair on a free even port at or above
    /// `search_start`; the peer address is armed later with
    /// [`connect_peer`](Self::connect_peer) once SETUP has negotiated it.
    pub async fn receiver(search_start: u16) -> RtpChannelResult<Self> {
        let ((rtp_port, rtp_io), (rtcp_port, rtcp_io)) =
            UdpIO::bind_even_pair(search_start).await?;
        tracing::info!(
            "created udp receiver pair, rtp port: {}, rtcp port: {}",
            rtp_port,
            rtcp_port
        );

        let mut channel = Self::new(RtpChannelKind::UdpReceiver);
        channel.rtp_io = Some(rtp_io);
        channel.rtcp_io = Some(rtcp_io);
        channel.local_rtp_port = Some(rtp_port);
        channel.local_rtcp_port = Some(rtcp_port);
        Ok(channel)
    }

    /// Interleaved variant over the control connection. `out_tx` is
    /// drained by the connection's owning task, which writes each packet
    /// as a `$`-framed message.
    pub fn interleaved(
        rtp_channel_id: u8,
        rtcp_channel_id: u8,
        out_tx: mpsc::UnboundedSender<RtspInterleavedPacket>,
    ) -> Self {
        let mut channel = Self::new(RtpChannelKind::Interleaved);
        channel.interleaved_ids = Some((rtp_channel_id, rtcp_channel_id));
        channel.interleaved_out = Some(out_tx);
        channel
    }

    pub fn kind(&self) -> RtpChannelKind {
        self.kind
    }

    pub fn local_ports(&self) -> Option<(u16, u16)> {
        Some((self.local_rtp_port?, self.local_rtcp_port?))
    }

    pub fn interleaved_ids(&self) -> Option<(u8, u8)> {
        self.interleaved_ids
    }

    /// Adopts a server override of the proposed channel id pair.
    pub fn set_interleaved_ids(&mut self, rtp_channel_id: u8, rtcp_channel_id: u8) {
        self.interleaved_ids = Some((rtp_channel_id, rtcp_channel_id));
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.ssrc
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        self.ssrc = Some(ssrc);
    }

    pub fn statistics(&self) -> Arc<ChannelStatistics> {
        self.statistics.clone()
    }

    /// Hands the event stream to the owning session; may be taken once.
    pub fn take_events(&mut self) -> Option<RtpChannelEventReceiver> {
        self.event_rx.take()
    }

    /// Arms a receiver with the peer ports negotiated by SETUP.
    pub async fn connect_peer(
        &self,
        peer_ip: IpAddr,
        peer_rtp_port: u16,
        peer_rtcp_port: u16,
    ) -> RtpChannelResult<()> {
        let rtp_io = self.rtp_io.as_ref().ok_or(RtpChannelError::NotArmed(
            "no udp socket to connect".to_owned(),
        ))?;
        let rtcp_io = self.rtcp_io.as_ref().ok_or(RtpChannelError::NotArmed(
            "no udp rtcp socket to connect".to_owned(),
        ))?;
        rtp_io
            .connect_peer(SocketAddr::new(peer_ip, peer_rtp_port))
            .await?;
        rtcp_io
            .connect_peer(SocketAddr::new(peer_ip, peer_rtcp_port))
            .await?;
        Ok(())
    }

    /// Starts delivery: for the UDP variants this spawns the background
    /// read task; the interleaved variant is fed by the control
    /// connection and needs none.
    pub fn connect(&mut self) -> RtpChannelResult<()> {
        if self.kind == RtpChannelKind::Interleaved || self.read_task.is_some() {
            return Ok(());
        }
        let rtp_io = self
            .rtp_io
            .clone()
            .ok_or(RtpChannelError::NotArmed("no udp rtp socket".to_owned()))?;
        let rtcp_io = self
            .rtcp_io
            .clone()
            .ok_or(RtpChannelError::NotArmed("no udp rtcp socket".to_owned()))?;
        let event_tx = self.event_tx.clone();
        let statistics = self.statistics.clone();

        self.read_task = Some(tokio::task::spawn(async move {
            let mut rtp_buffer = vec![0_u8; UDP_RECV_BUFFER_BYTES];
            let mut rtcp_buffer = vec![0_u8; UDP_RECV_BUFFER_BYTES];
            loop {
                tokio::select! {
                    received = rtp_io.recv(&mut rtp_buffer) => match received {
                        Ok(length) => {
                            statistics.on_received(length);
                            let payload = Bytes::copy_from_slice(&rtp_buffer[..length]);
                            if event_tx.send(RtpChannelEvent::Rtp(payload)).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            tracing::warn!("rtp socket read failed: {}", err);
                            return;
                        }
                    },
                    received = rtcp_io.recv(&mut rtcp_buffer) => match received {
                        Ok(length) => {
                            let payload = Bytes::copy_from_slice(&rtcp_buffer[..length]);
                            let bye = is_rtcp_bye(&payload);
                            if event_tx.send(RtpChannelEvent::Rtcp(payload)).is_err() {
                                return;
                            }
                            if bye && event_tx.send(RtpChannelEvent::Bye).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            tracing::warn!("rtcp socket read failed: {}", err);
                            return;
                        }
                    },
                }
            }
        }));
        Ok(())
    }

    /// Stops delivery and drops the sockets. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        self.rtp_io = None;
        self.rtcp_io = None;
    }

    /// Queues one RTP packet toward the peer.
    pub async fn enqueue(&self, payload: Bytes) -> RtpChannelResult<()> {
        self.statistics.on_sent(payload.len());
        match self.kind {
            RtpChannelKind::Interleaved => {
                let (rtp_id, _) = self.interleaved_ids.ok_or(RtpChannelError::NotArmed(
                    "interleaved channel ids are not set".to_owned(),
                ))?;
                self.send_interleaved(rtp_id, payload)
            }
            _ => {
                let io = self.rtp_io.as_ref().ok_or(RtpChannelError::NotArmed(
                    "udp rtp socket is gone".to_owned(),
                ))?;
                io.send(&payload).await?;
                Ok(())
            }
        }
    }

    /// Queues one RTCP packet toward the peer.
    pub async fn enqueue_rtcp(&self, payload: Bytes) -> RtpChannelResult<()> {
        match self.kind {
            RtpChannelKind::Interleaved => {
                let (_, rtcp_id) = self.interleaved_ids.ok_or(RtpChannelError::NotArmed(
                    "interleaved channel ids are not set".to_owned(),
                ))?;
                self.send_interleaved(rtcp_id, payload)
            }
            _ => {
                let io = self.rtcp_io.as_ref().ok_or(RtpChannelError::NotArmed(
                    "udp rtcp socket is gone".to_owned(),
                ))?;
                io.send(&payload).await?;
                Ok(())
            }
        }
    }

    fn send_interleaved(&self, channel_id: u8, payload: Bytes) -> RtpChannelResult<()> {
        let out = self.interleaved_out.as_ref().ok_or(RtpChannelError::NotArmed(
            "interleaved outbound queue is not set".to_owned(),
        ))?;
        out.send(RtspInterleavedPacket {
            channel_id,
            payload,
        })
        .map_err(|err| RtpChannelError::ChannelClosed(format!("{}", err)))
    }

    /// Inbound path of the interleaved variant, called by the control
    /// connection when a `$`-framed packet for this session arrives.
    pub fn deliver_interleaved(&self, packet: RtspInterleavedPacket) {
        let Some((rtp_id, rtcp_id)) = self.interleaved_ids else {
            return;
        };
        if packet.channel_id == rtp_id {
            self.statistics.on_received(packet.payload.len());
            let _ = self.event_tx.send(RtpChannelEvent::Rtp(packet.payload));
        } else if packet.channel_id == rtcp_id {
            let bye = is_rtcp_bye(&packet.payload);
            let _ = self.event_tx.send(RtpChannelEvent::Rtcp(packet.payload));
            if bye {
                let _ = self.event_tx.send(RtpChannelEvent::Bye);
            }
        } else {
            tracing::warn!("unknown interleaved channel id: {}", packet.channel_id);
        }
    }

    /// True while the channel holds any UDP socket; the interleaved
    /// variant never does.
    pub fn owns_udp_sockets(&self) -> bool {
        self.rtp_io.is_some() || self.rtcp_io.is_some()
    }
}

impl Drop for RtpChannel {
    fn drop(&mut self) {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use tokio::sync::mpsc;
    use tokio_util::bytes::Bytes;

    use crate::events::RtpChannelEvent;

    use super::{RtpChannel, RtpChannelKind};

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn interleaved_channel_owns_no_sockets() {
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let channel = RtpChannel::interleaved(0, 1, out_tx);
        assert_eq!(channel.kind(), RtpChannelKind::Interleaved);
        assert!(!channel.owns_udp_sockets());
        assert!(channel.local_ports().is_none());
    }

    #[tokio::test]
    async fn interleaved_enqueue_wraps_into_frames() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let channel = RtpChannel::interleaved(2, 3, out_tx);
        channel.enqueue(Bytes::from_static(b"rtp")).await.unwrap();
        channel
            .enqueue_rtcp(Bytes::from_static(b"rtcp"))
            .await
            .unwrap();

        let rtp = out_rx.recv().await.unwrap();
        assert_eq!(rtp.channel_id, 2);
        assert_eq!(rtp.payload.as_ref(), b"rtp");
        let rtcp = out_rx.recv().await.unwrap();
        assert_eq!(rtcp.channel_id, 3);
        assert_eq!(rtcp.payload.as_ref(), b"rtcp");

        assert_eq!(channel.statistics().packets_sent(), 1);
        assert_eq!(channel.statistics().bytes_sent(), 3);
    }

    #[tokio::test]
    async fn interleaved_delivery_routes_by_channel_id() {
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let mut channel = RtpChannel::interleaved(0, 1, out_tx);
        let mut events = channel.take_events().unwrap();

        channel.deliver_interleaved(rtsp_formats::interleaved::RtspInterleavedPacket {
            channel_id: 0,
            payload: Bytes::from_static(b"\xDE\xAD\xBE\xEF"),
        });
        match events.recv().await.unwrap() {
            RtpChannelEvent::Rtp(payload) => assert_eq!(payload.as_ref(), b"\xDE\xAD\xBE\xEF"),
            other => panic!("expected rtp, got {:?}", other),
        }

        // RTCP BYE on the odd channel raises both events
        channel.deliver_interleaved(rtsp_formats::interleaved::RtspInterleavedPacket {
            channel_id: 1,
            payload: Bytes::from_static(&[0x81, 203, 0x00, 0x01, 0x12, 0x34, 0x56, 0x78]),
        });
        assert!(matches!(
            events.recv().await.unwrap(),
            RtpChannelEvent::Rtcp(_)
        ));
        assert!(matches!(events.recv().await.unwrap(), RtpChannelEvent::Bye));

        assert_eq!(channel.statistics().packets_received(), 1);
    }

    #[tokio::test]
    async fn udp_sender_reaches_udp_receiver() {
        let mut receiver = RtpChannel::receiver(15000).await.unwrap();
        let (receiver_rtp_port, receiver_rtcp_port) = receiver.local_ports().unwrap();

        let sender = RtpChannel::sender(LOCALHOST, receiver_rtp_port, receiver_rtcp_port, 6970)
            .await
            .unwrap();
        let (sender_rtp_port, sender_rtcp_port) = sender.local_ports().unwrap();

        receiver
            .connect_peer(LOCALHOST, sender_rtp_port, sender_rtcp_port)
            .await
            .unwrap();
        receiver.connect().unwrap();
        let mut events = receiver.take_events().unwrap();

        sender.enqueue(Bytes::from_static(b"media")).await.unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            RtpChannelEvent::Rtp(payload) => assert_eq!(payload.as_ref(), b"media"),
            other => panic!("expected rtp, got {:?}", other),
        }
        assert_eq!(receiver.statistics().packets_received(), 1);
        assert_eq!(sender.statistics().packets_sent(), 1);
    }

    #[tokio::test]
    async fn rtcp_bye_over_udp_raises_bye_event() {
        let mut receiver = RtpChannel::receiver(15000).await.unwrap();
        let (receiver_rtp_port, receiver_rtcp_port) = receiver.local_ports().unwrap();
        let sender = RtpChannel::sender(LOCALHOST, receiver_rtp_port, receiver_rtcp_port, 6970)
            .await
            .unwrap();
        let (sender_rtp_port, sender_rtcp_port) = sender.local_ports().unwrap();
        receiver
            .connect_peer(LOCALHOST, sender_rtp_port, sender_rtcp_port)
            .await
            .unwrap();
        receiver.connect().unwrap();
        let mut events = receiver.take_events().unwrap();

        sender
            .enqueue_rtcp(Bytes::from_static(&[
                0x81, 203, 0x00, 0x01, 0x12, 0x34, 0x56, 0x78,
            ]))
            .await
            .unwrap();

        let mut saw_bye = false;
        for _ in 0..2 {
            let event = tokio::time::timeout(std::time::Duration::from_secs(5), events.recv())
                .await
                .unwrap()
                .unwrap();
            if matches!(event, RtpChannelEvent::Bye) {
                saw_bye = true;
            }
        }
        assert!(saw_bye);
    }

    #[tokio::test]
    async fn disconnect_drops_the_sockets() {
        let mut receiver = RtpChannel::receiver(15000).await.unwrap();
        assert!(receiver.owns_udp_sockets());
        receiver.connect().unwrap();
        receiver.disconnect();
        assert!(!receiver.owns_udp_sockets());
    }
}
