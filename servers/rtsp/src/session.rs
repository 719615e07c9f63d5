use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    pin::Pin,
    time::SystemTime,
};

use futures::{SinkExt, StreamExt};
use rtp_channel::{RtpChannel, RtpChannelEvent, events::RtpChannelEventReceiver, is_rtcp_bye};
use rtsp_formats::{
    RtspMessage, RtspMessageFramed,
    consts::{methods::RtspMethod, status::RtspStatus},
    errors::RtspMessageError,
    header::{RtspHeader, session::SessionHeader},
    interleaved::RtspInterleavedPacket,
    request::RtspRequest,
    response::{RtspResponse, builder::RtspResponseBuilder},
};
use sdp_formats::session::{SDPOrigin, SessionDescription};
use tokio::sync::{broadcast, mpsc};
use tokio_util::{bytes::Bytes, codec::Framed};
use tracing::Instrument;
use unified_io::UnifiedIO;
use utils::system::time::ntp_timestamp_halves;
use uuid::Uuid;

use crate::{
    SERVER_AGENT,
    errors::RtspServerResult,
    source::MediaSource,
};

/// Where the sender side UDP port scan starts.
const SERVER_RTP_PORT_START: u16 = 6970;

const SUPPORTED_METHODS: [RtspMethod; 8] = [
    RtspMethod::Options,
    RtspMethod::Describe,
    RtspMethod::Setup,
    RtspMethod::Play,
    RtspMethod::Pause,
    RtspMethod::TearDown,
    RtspMethod::GetParameter,
    RtspMethod::SetParameter,
];

/// Rewrites the upstream description for one peer: the origin becomes
/// `o=- <ntp-seconds> <ntp-fraction> IN IP4 <local-ip>`, the session
/// name the server identifier; every other line is carried verbatim.
pub fn rewrite_session_description(
    upstream: &SessionDescription,
    local_ip: IpAddr,
) -> SessionDescription {
    let (seconds, fraction) = ntp_timestamp_halves(SystemTime::now()).unwrap_or((0, 0));
    let mut description = upstream.clone();
    description.origin = SDPOrigin {
        user_name: "-".to_owned(),
        session_id: seconds as u64,
        session_version: fraction as u64,
        net_type: "IN".to_owned(),
        addr_type: "IP4".to_owned(),
        unicast_address: local_ip.to_string(),
    };
    description.session_name = SERVER_AGENT.to_owned();
    description
}

#[derive(Debug, Default)]
struct SessionStatistics {
    rtp_packets: u64,
    rtp_bytes: u64,
    rtcp_packets: u64,
}

impl SessionStatistics {
    fn on_rtp(&mut self, bytes: usize) {
        self.rtp_packets += 1;
        self.rtp_bytes += bytes as u64;
    }

    fn on_rtcp(&mut self, _bytes: usize) {
        self.rtcp_packets += 1;
    }
}

enum Step {
    Io(Option<Result<RtspMessage, RtspMessageError>>),
    SourceRtp(Result<Bytes, broadcast::error::RecvError>),
    SourceRtcp(Result<Bytes, broadcast::error::RecvError>),
    Channel(Option<RtpChannelEvent>),
    Outgoing(Option<RtspInterleavedPacket>),
}

async fn recv_source(
    rx: &mut Option<broadcast::Receiver<Bytes>>,
) -> Result<Bytes, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn recv_channel_event(rx: &mut Option<RtpChannelEventReceiver>) -> Option<RtpChannelEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn recv_outgoing(
    rx: &mut Option<mpsc::UnboundedReceiver<RtspInterleavedPacket>>,
) -> Option<RtspInterleavedPacket> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// One connected peer: owns the control connection, the session
/// identity allocated at SETUP, the negotiated delivery channel, and the
/// subscription to the upstream source while playing.
pub struct RtspSession {
    io: Framed<Pin<Box<dyn UnifiedIO + Send>>, RtspMessageFramed>,
    peer_addr: SocketAddr,
    source: MediaSource,
    session_timeout_secs: u64,

    session_id: Option<Uuid>,
    last_cseq: Option<u32>,
    ssrc: u32,

    channel: Option<RtpChannel>,
    channel_events: Option<RtpChannelEventReceiver>,
    interleaved_out_rx: Option<mpsc::UnboundedReceiver<RtspInterleavedPacket>>,

    rtp_source_rx: Option<broadcast::Receiver<Bytes>>,
    rtcp_source_rx: Option<broadcast::Receiver<Bytes>>,
    playing: bool,

    statistics: SessionStatistics,
}

impl RtspSession {
    pub fn new(
        io: Pin<Box<dyn UnifiedIO + Send>>,
        peer_addr: SocketAddr,
        source: MediaSource,
        session_timeout_secs: u64,
    ) -> Self {
        Self {
            io: Framed::new(io, RtspMessageFramed::default()),
            peer_addr,
            source,
            session_timeout_secs,
            session_id: None,
            last_cseq: None,
            ssrc: utils::random::random_u32(),
            channel: None,
            channel_events: None,
            interleaved_out_rx: None,
            rtp_source_rx: None,
            rtcp_source_rx: None,
            playing: false,
            statistics: SessionStatistics::default(),
        }
    }

    pub async fn run(&mut self) -> RtspServerResult<()> {
        tracing::info!("rtsp session is running");
        loop {
            let step = tokio::select! {
                message = self.io.next() => Step::Io(message),
                payload = recv_source(&mut self.rtp_source_rx) => Step::SourceRtp(payload),
                payload = recv_source(&mut self.rtcp_source_rx) => Step::SourceRtcp(payload),
                event = recv_channel_event(&mut self.channel_events) => Step::Channel(event),
                packet = recv_outgoing(&mut self.interleaved_out_rx) => Step::Outgoing(packet),
            };
            match step {
                Step::Io(Some(Ok(RtspMessage::Request(request)))) => {
                    self.last_cseq = request.headers().cseq().or(self.last_cseq);
                    let span = tracing::debug_span!(
                        "handle_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        cseq = self.last_cseq,
                    );
                    self.handle_request(request).instrument(span).await?;
                }
                Step::Io(Some(Ok(RtspMessage::Interleaved(packet)))) => {
                    if let Some(channel) = &self.channel {
                        channel.deliver_interleaved(packet);
                    }
                }
                Step::Io(Some(Ok(RtspMessage::Response(response)))) => {
                    tracing::debug!("ignoring response from peer: {}", response.status());
                }
                Step::Io(Some(Err(RtspMessageError::Io(err))))
                    if err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    tracing::info!("connection reset by peer");
                    self.stop_media();
                    return Ok(());
                }
                Step::Io(Some(Err(err))) => {
                    tracing::error!("error receiving rtsp message: {:?}", err);
                    self.stop_media();
                    return Err(err.into());
                }
                Step::Io(None) => {
                    tracing::info!("connection closed by peer");
                    self.stop_media();
                    return Ok(());
                }
                Step::SourceRtp(Ok(payload)) => self.on_source_rtp(payload).await,
                Step::SourceRtp(Err(broadcast::error::RecvError::Lagged(count))) => {
                    tracing::warn!("dropped {} source rtp packets", count);
                }
                Step::SourceRtp(Err(broadcast::error::RecvError::Closed)) => {
                    tracing::warn!("upstream rtp feed is gone");
                    self.rtp_source_rx = None;
                }
                Step::SourceRtcp(Ok(payload)) => {
                    if self.on_source_rtcp(payload).await {
                        self.stop_media();
                        return Ok(());
                    }
                }
                Step::SourceRtcp(Err(broadcast::error::RecvError::Lagged(count))) => {
                    tracing::warn!("dropped {} source rtcp packets", count);
                }
                Step::SourceRtcp(Err(broadcast::error::RecvError::Closed)) => {
                    self.rtcp_source_rx = None;
                }
                Step::Channel(Some(RtpChannelEvent::Bye)) => {
                    tracing::info!("peer said goodbye over rtcp, closing the session");
                    self.stop_media();
                    return Ok(());
                }
                Step::Channel(Some(_)) => {
                    // receiver reports and peer media are liveness only
                }
                Step::Channel(None) => {
                    self.channel_events = None;
                }
                Step::Outgoing(Some(packet)) => {
                    self.io.send(RtspMessage::Interleaved(packet)).await?;
                }
                Step::Outgoing(None) => {
                    self.interleaved_out_rx = None;
                }
            }
        }
    }

    /// Forwarding path of the upstream feed. The statistics update is
    /// the synthetic receive accounting that keeps later sender reports
    /// consistent with what was actually relayed.
    async fn on_source_rtp(&mut self, payload: Bytes) {
        if !self.playing {
            return;
        }
        self.statistics.on_rtp(payload.len());
        if let Some(channel) = &self.channel
            && let Err(err) = channel.enqueue(payload).await
        {
            tracing::warn!("forwarding rtp to the peer failed: {}", err);
        }
    }

    /// Returns true when the session should terminate.
    async fn on_source_rtcp(&mut self, payload: Bytes) -> bool {
        if is_rtcp_bye(&payload) {
            tracing::info!("upstream source said goodbye");
            return true;
        }
        self.statistics.on_rtcp(payload.len());
        if self.playing
            && let Some(channel) = &self.channel
            && let Err(err) = channel.enqueue_rtcp(payload).await
        {
            tracing::warn!("forwarding rtcp to the peer failed: {}", err);
        }
        false
    }

    fn stop_media(&mut self) {
        if let Some(channel) = &mut self.channel {
            channel.disconnect();
        }
        self.channel = None;
        self.channel_events = None;
        self.interleaved_out_rx = None;
        self.rtp_source_rx = None;
        self.rtcp_source_rx = None;
        self.playing = false;
        tracing::info!("session statistics: {:?}", self.statistics);
    }

    fn local_ip(&self) -> IpAddr {
        self.io
            .get_ref()
            .get_local_addr()
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    fn session_matches(&self, request: &RtspRequest) -> bool {
        match (request.headers().session(), &self.session_id) {
            (Some(header), Some(session_id)) => header.id == session_id.to_string(),
            _ => false,
        }
    }

    fn base_response(&self, status: RtspStatus) -> RtspResponseBuilder {
        let mut builder = RtspResponse::builder()
            .status(status)
            .header(RtspHeader::Server, SERVER_AGENT);
        if let Some(cseq) = self.last_cseq {
            builder = builder.header(RtspHeader::CSeq, cseq.to_string());
        }
        if let Some(session_id) = &self.session_id {
            let session = SessionHeader {
                id: session_id.to_string(),
                timeout_secs: self.session_timeout_secs,
            };
            builder = builder.header(RtspHeader::Session, format!("{}", session));
        }
        builder
    }

    async fn send_response(&mut self, response: RtspResponse) -> RtspServerResult<()> {
        tracing::debug!("sending rtsp response: {}", response.status());
        self.io.send(RtspMessage::Response(response)).await?;
        Ok(())
    }

    async fn send_status(&mut self, status: RtspStatus) -> RtspServerResult<()> {
        let response = self.base_response(status).build()?;
        self.send_response(response).await
    }
}

trait RtspRequestHandler {
    async fn handle_request(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        match request.method() {
            RtspMethod::Options => self.handle_options(request).await,
            RtspMethod::Describe => self.handle_describe(request).await,
            RtspMethod::Setup => self.handle_setup(request).await,
            RtspMethod::Play => self.handle_play(request).await,
            RtspMethod::Pause => self.handle_pause(request).await,
            RtspMethod::TearDown => self.handle_teardown(request).await,
            RtspMethod::GetParameter => self.handle_get_parameter(request).await,
            RtspMethod::SetParameter => self.handle_set_parameter(request).await,
            RtspMethod::Announce | RtspMethod::Record | RtspMethod::Redirect => {
                self.handle_not_implemented(request).await
            }
        }
    }
    async fn handle_options(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_describe(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_setup(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_play(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_pause(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_teardown(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_get_parameter(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_set_parameter(&mut self, request: RtspRequest) -> RtspServerResult<()>;
    async fn handle_not_implemented(&mut self, request: RtspRequest) -> RtspServerResult<()>;
}

impl RtspRequestHandler for RtspSession {
    async fn handle_options(&mut self, _request: RtspRequest) -> RtspServerResult<()> {
        let advertised: Vec<&str> = SUPPORTED_METHODS
            .iter()
            .map(|method| method.into())
            .collect();
        let response = self
            .base_response(RtspStatus::OK)
            .header(RtspHeader::Public, advertised.join(", "))
            .build()?;
        self.send_response(response).await
    }

    async fn handle_describe(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        let description = rewrite_session_description(self.source.description(), self.local_ip());
        let response = self
            .base_response(RtspStatus::OK)
            .header(RtspHeader::ContentBase, request.uri().to_string())
            .header(RtspHeader::ContentType, "application/sdp")
            .body(format!("{}", description))
            .build()?;
        self.send_response(response).await
    }

    async fn handle_setup(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        let Some(transport) = request.headers().transport() else {
            tracing::warn!("SETUP without a usable transport header");
            return self.send_status(RtspStatus::BadRequest).await;
        };
        tracing::debug!("got SETUP request with transport: {:?}", transport);

        // a SETUP naming a session this connection does not hold is gone
        if let Some(peer_session) = request.headers().session()
            && let Some(session_id) = &self.session_id
            && peer_session.id != session_id.to_string()
        {
            return self.send_status(RtspStatus::SessionNotFound).await;
        }

        let mut echo = transport.clone();
        echo.ssrc = Some(self.ssrc);

        let mut channel = if transport.wants_interleaved() {
            let (rtp_id, rtcp_id) = transport.interleaved.unwrap_or((0, 1));
            let (out_tx, out_rx) = mpsc::unbounded_channel();
            self.interleaved_out_rx = Some(out_rx);
            echo.interleaved = Some((rtp_id, rtcp_id));
            RtpChannel::interleaved(rtp_id, rtcp_id, out_tx)
        } else {
            let Some((client_rtp_port, client_rtcp_port)) = transport.client_port else {
                tracing::warn!("udp SETUP without client_port");
                return self.send_status(RtspStatus::UnsupportedTransport).await;
            };
            let channel = match RtpChannel::sender(
                self.peer_addr.ip(),
                client_rtp_port,
                client_rtcp_port,
                SERVER_RTP_PORT_START,
            )
            .await
            {
                Ok(channel) => channel,
                Err(err) => {
                    tracing::error!("failed to create the delivery channel: {}", err);
                    return self.send_status(RtspStatus::InternalServerError).await;
                }
            };
            echo.server_port = channel.local_ports();
            channel
        };
        channel.set_ssrc(self.ssrc);
        channel.connect()?;
        self.channel_events = channel.take_events();
        self.channel = Some(channel);

        let session_id = self.session_id.unwrap_or_else(Uuid::now_v7);
        self.session_id = Some(session_id);
        tracing::info!("session created, session id: {}", session_id);

        let response = self
            .base_response(RtspStatus::OK)
            .header(RtspHeader::Transport, format!("{}", echo))
            .build()?;
        self.send_response(response).await
    }

    async fn handle_play(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        if !self.session_matches(&request) {
            return self.send_status(RtspStatus::SessionNotFound).await;
        }
        if self.channel.is_none() {
            return self.send_status(RtspStatus::MethodNotValidInThisState).await;
        }
        self.rtp_source_rx = Some(self.source.subscribe_rtp());
        self.rtcp_source_rx = Some(self.source.subscribe_rtcp());
        self.playing = true;

        let range = request
            .headers()
            .get_unique(RtspHeader::Range)
            .cloned()
            .unwrap_or_else(|| "npt=0-".to_owned());
        let response = self
            .base_response(RtspStatus::OK)
            .header(RtspHeader::Range, range)
            .header(RtspHeader::RtpInfo, format!("url={}", request.uri()))
            .build()?;
        self.send_response(response).await
    }

    async fn handle_pause(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        if !self.session_matches(&request) {
            return self.send_status(RtspStatus::SessionNotFound).await;
        }
        self.rtp_source_rx = None;
        self.rtcp_source_rx = None;
        self.playing = false;
        self.send_status(RtspStatus::OK).await
    }

    async fn handle_teardown(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        if !self.session_matches(&request) {
            return self.send_status(RtspStatus::SessionNotFound).await;
        }
        tracing::info!("got teardown request, closing the session");
        self.stop_media();
        self.session_id = None;
        self.send_status(RtspStatus::OK).await
    }

    async fn handle_get_parameter(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        // the empty-body form is the keep-alive
        if request.headers().session().is_some() && !self.session_matches(&request) {
            return self.send_status(RtspStatus::SessionNotFound).await;
        }
        if request.body().is_some() {
            return self.send_status(RtspStatus::ParameterNotUnderstood).await;
        }
        self.send_status(RtspStatus::OK).await
    }

    async fn handle_set_parameter(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        if request.body().is_some() {
            return self.send_status(RtspStatus::ParameterNotUnderstood).await;
        }
        self.send_status(RtspStatus::OK).await
    }

    async fn handle_not_implemented(&mut self, request: RtspRequest) -> RtspServerResult<()> {
        tracing::debug!("{} is not served here", request.method());
        self.send_status(RtspStatus::NotImplemented).await
    }
}
