use std::{net::IpAddr, pin::Pin, time::Duration};

use futures::{SinkExt, StreamExt};
use rtp_channel::{
    RtpChannel, RtpChannelEvent, RtpChannelKind, events::RtpChannelEventReceiver,
};
use rtsp_formats::{
    RtspMessage, RtspMessageFramed,
    consts::{methods::RtspMethod, status::RtspStatus},
    header::{
        RtspHeader,
        auth::{WwwAuthenticateHeader, basic_authorization},
        session::SessionHeader,
        transport::TransportHeader,
    },
    interleaved::RtspInterleavedPacket,
    request::RtspRequest,
    response::RtspResponse,
};
use sdp_formats::session::SessionDescription;
use tokio::{
    net::TcpStream,
    sync::mpsc,
    time::{Interval, MissedTickBehavior},
};
use tokio_util::{bytes::Bytes, codec::Framed};
use unified_io::{UnifiedIO, tcp::TcpIO};
use url::Url;

use crate::{
    config::{PreferredTransport, RtspClientConfig},
    errors::{RtspClientError, RtspClientResult},
};

pub const DEFAULT_RTSP_PORT: u16 = 554;

/// Deadline for the best-effort final TEARDOWN exchange.
const TEARDOWN_TIMEOUT_MS: u64 = 1000;

type ControlIo = Framed<Pin<Box<dyn UnifiedIO + Send>>, RtspMessageFramed>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connected,
    Described,
    Ready,
    Playing,
    Terminating,
    Closed,
}

#[derive(Debug)]
pub enum RtspClientEvent {
    Rtp(Bytes),
    Rtcp(Bytes),
    Closed,
}

enum Step {
    Channel(Option<RtpChannelEvent>),
    Io(Option<Result<RtspMessage, rtsp_formats::errors::RtspMessageError>>),
    Outgoing(Option<RtspInterleavedPacket>),
    KeepAlive,
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

async fn keepalive_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// The peer side of one RTSP presentation: drives
/// OPTIONS → DESCRIBE → SETUP → PLAY, keeps the session alive, and feeds
/// received media to the caller through [`next_event`](Self::next_event).
pub struct RtspClient {
    url: Url,
    config: RtspClientConfig,
    state: SessionState,

    io: Option<ControlIo>,
    next_cseq: u32,
    session: Option<SessionHeader>,
    supported: Vec<RtspMethod>,
    description: Option<SessionDescription>,
    base_url: Option<Url>,

    channel: Option<RtpChannel>,
    channel_events: Option<RtpChannelEventReceiver>,
    interleaved_out_rx: Option<mpsc::UnboundedReceiver<RtspInterleavedPacket>>,

    keepalive: Option<Interval>,
    keepalive_cseq: Option<u32>,

    resume_point: Option<f64>,
    initial_seq: Option<u16>,
    initial_rtptime: Option<u32>,
    ssrc: Option<u32>,
}

impl RtspClient {
    pub fn new(url: Url, config: RtspClientConfig) -> Self {
        Self {
            url,
            config,
            state: SessionState::Idle,
            io: None,
            next_cseq: 0,
            session: None,
            supported: Vec::new(),
            description: None,
            base_url: None,
            channel: None,
            channel_events: None,
            interleaved_out_rx: None,
            keepalive: None,
            keepalive_cseq: None,
            resume_point: None,
            initial_seq: None,
            initial_rtptime: None,
            ssrc: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.id.as_str())
    }

    pub fn supported_methods(&self) -> &[RtspMethod] {
        &self.supported
    }

    pub fn ssrc(&self) -> Option<u32> {
        self.ssrc
    }

    pub fn initial_seq(&self) -> Option<u16> {
        self.initial_seq
    }

    pub fn initial_rtptime(&self) -> Option<u32> {
        self.initial_rtptime
    }

    pub fn resume_point(&self) -> Option<f64> {
        self.resume_point
    }

    pub fn channel_kind(&self) -> Option<RtpChannelKind> {
        self.channel.as_ref().map(RtpChannel::kind)
    }

    pub fn channel_owns_udp_sockets(&self) -> bool {
        self.channel
            .as_ref()
            .is_some_and(RtpChannel::owns_udp_sockets)
    }

    pub fn keepalive_period(&self) -> Option<Duration> {
        self.keepalive.as_ref().map(Interval::period)
    }

    /// Resolves the host, opens the control connection, leaves the
    /// session in `Connected`.
    pub async fn connect(&mut self) -> RtspClientResult<()> {
        if !matches!(self.state, SessionState::Idle | SessionState::Closed) {
            return Err(RtspClientError::Protocol(
                "control connection is already open".to_owned(),
            ));
        }
        match self.url.scheme() {
            "rtsp" => {}
            "rtspu" => {
                return Err(RtspClientError::Protocol(
                    "rtspu control channels are not supported".to_owned(),
                ));
            }
            other => {
                return Err(RtspClientError::Protocol(format!(
                    "unsupported control scheme: {}",
                    other
                )));
            }
        }
        let host = self
            .url
            .host_str()
            .ok_or_else(|| RtspClientError::Resolve(format!("no host in {}", self.url)))?
            .to_owned();
        let port = self.url.port().unwrap_or(DEFAULT_RTSP_PORT);

        let stream = tokio::time::timeout(
            self.read_timeout(),
            TcpStream::connect((host.as_str(), port)),
        )
        .await
        .map_err(|_| RtspClientError::Timeout)?
        .map_err(|err| RtspClientError::Resolve(format!("{}:{}: {}", host, port, err)))?;

        let io: Pin<Box<dyn UnifiedIO + Send>> = Box::pin(TcpIO::new(stream));
        self.io = Some(Framed::new(
            io,
            RtspMessageFramed::new(self.config.max_message_bytes),
        ));
        self.state = SessionState::Connected;
        tracing::info!("control connection established to {}:{}", host, port);
        Ok(())
    }

    pub async fn options(&mut self) -> RtspClientResult<()> {
        let request = RtspRequest::builder()
            .method(RtspMethod::Options)
            .uri(self.url.clone())
            .build()?;
        let response = self.send_request(request).await?;
        if response.status() != RtspStatus::OK {
            return Err(RtspClientError::Protocol(format!(
                "OPTIONS returned {}",
                response.status()
            )));
        }
        self.supported = response
            .headers()
            .get_unique(RtspHeader::Public)
            .map(|value| {
                value
                    .split(',')
                    .filter_map(|method| method.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();
        tracing::debug!("peer advertises: {:?}", self.supported);
        Ok(())
    }

    pub async fn describe(&mut self) -> RtspClientResult<()> {
        let request = RtspRequest::builder()
            .method(RtspMethod::Describe)
            .uri(self.url.clone())
            .header(RtspHeader::Accept, "application/sdp")
            .build()?;
        let response = self.send_request(request).await?;
        if response.status() != RtspStatus::OK {
            return Err(RtspClientError::Protocol(format!(
                "DESCRIBE returned {}",
                response.status()
            )));
        }
        let body = response.body().ok_or_else(|| {
            RtspClientError::Protocol("DESCRIBE response carries no body".to_owned())
        })?;
        let description: SessionDescription = body
            .parse()
            .map_err(|_| RtspClientError::Protocol("invalid session description".to_owned()))?;

        self.base_url = response
            .headers()
            .get_unique(RtspHeader::ContentBase)
            .or_else(|| response.headers().get_unique(RtspHeader::ContentLocation))
            .and_then(|value| value.parse().ok());
        self.description = Some(description);
        self.state = SessionState::Described;
        Ok(())
    }

    /// Negotiates delivery. The transport preference comes from the
    /// configuration; two bounded retries live inside the loop: one redo
    /// from DESCRIBE after a 454, and one re-issued SETUP when the peer
    /// steers a UDP request onto the control connection.
    pub async fn setup(&mut self) -> RtspClientResult<()> {
        if !matches!(self.state, SessionState::Described | SessionState::Ready) {
            return Err(RtspClientError::Protocol(
                "SETUP requires a described session".to_owned(),
            ));
        }
        let mut use_tcp = self.config.preferred_transport == PreferredTransport::Tcp;
        let mut recovered_session = false;
        let mut fell_back_to_tcp = false;
        loop {
            let uri = self.setup_uri()?;
            let (channel, transport_value) = self.prepare_channel(use_tcp).await?;
            let request = RtspRequest::builder()
                .method(RtspMethod::Setup)
                .uri(uri)
                .header(RtspHeader::Transport, transport_value)
                .build()?;
            let response = self.send_request(request).await?;
            match response.status() {
                RtspStatus::SessionNotFound => {
                    if recovered_session {
                        return Err(RtspClientError::SessionExpired);
                    }
                    recovered_session = true;
                    tracing::warn!("peer lost the session, redoing DESCRIBE before SETUP");
                    self.session = None;
                    self.interleaved_out_rx = None;
                    self.describe().await?;
                }
                RtspStatus::OK => {
                    let session = response.headers().session().ok_or_else(|| {
                        RtspClientError::Protocol(
                            "SETUP response is missing the Session header".to_owned(),
                        )
                    })?;
                    let transport = response.headers().transport().ok_or_else(|| {
                        RtspClientError::Protocol(
                            "SETUP response is missing the Transport header".to_owned(),
                        )
                    })?;

                    if !use_tcp
                        && (transport.is_tcp_fallback() || transport.wants_interleaved())
                    {
                        if fell_back_to_tcp {
                            return Err(RtspClientError::Protocol(
                                "peer demanded interleaved transport twice".to_owned(),
                            ));
                        }
                        fell_back_to_tcp = true;
                        use_tcp = true;
                        // the UDP channel and its sockets drop here
                        self.session = Some(session);
                        tracing::info!(
                            "peer steered delivery onto the control connection, re-issuing SETUP"
                        );
                        continue;
                    }

                    self.arm_channel(channel, &transport).await?;
                    self.session = Some(session);
                    self.state = SessionState::Ready;
                    return Ok(());
                }
                other => {
                    return Err(RtspClientError::Protocol(format!(
                        "SETUP returned {}",
                        other
                    )));
                }
            }
        }
    }

    /// Starts or resumes delivery. A 454 is recovered from exactly once
    /// by redoing DESCRIBE and SETUP, then retrying the original PLAY.
    pub async fn play(&mut self) -> RtspClientResult<()> {
        match self.play_once().await {
            Err(RtspClientError::SessionExpired) => {
                tracing::warn!("session expired at PLAY, redoing DESCRIBE and SETUP once");
                self.drop_channel();
                self.describe().await?;
                self.setup().await?;
                self.play_once().await
            }
            other => other,
        }
    }

    async fn play_once(&mut self) -> RtspClientResult<()> {
        if !matches!(self.state, SessionState::Ready | SessionState::Playing) {
            return Err(RtspClientError::Protocol(
                "PLAY requires a set-up session".to_owned(),
            ));
        }
        let resume = self
            .resume_point
            .map(|seconds| seconds.to_string())
            .unwrap_or_else(|| "0".to_owned());
        let request = RtspRequest::builder()
            .method(RtspMethod::Play)
            .uri(self.control_base().clone())
            .header(RtspHeader::Range, format!("npt={}-", resume))
            .build()?;
        let response = self.send_request(request).await?;
        match response.status() {
            RtspStatus::SessionNotFound => {
                self.session = None;
                Err(RtspClientError::SessionExpired)
            }
            RtspStatus::OK => {
                if let Some(info) = response.headers().rtp_info()
                    && let Some(entry) = info.0.first()
                {
                    self.initial_seq = entry.seq.or(self.initial_seq);
                    self.initial_rtptime = entry.rtptime.or(self.initial_rtptime);
                }
                if let Some(range) = response.headers().range() {
                    self.resume_point = Some(range.start_seconds());
                }
                self.arm_keepalive();
                self.state = SessionState::Playing;
                tracing::info!(
                    "playing, start seq: {:?}, rtptime: {:?}",
                    self.initial_seq,
                    self.initial_rtptime
                );
                Ok(())
            }
            other => Err(RtspClientError::Protocol(format!(
                "PLAY returned {}",
                other
            ))),
        }
    }

    pub async fn pause(&mut self) -> RtspClientResult<()> {
        if self.state != SessionState::Playing {
            return Err(RtspClientError::Protocol(
                "PAUSE is only valid while playing".to_owned(),
            ));
        }
        let request = RtspRequest::builder()
            .method(RtspMethod::Pause)
            .uri(self.control_base().clone())
            .build()?;
        let response = self.send_request(request).await?;
        if response.status() != RtspStatus::OK {
            return Err(RtspClientError::Protocol(format!(
                "PAUSE returned {}",
                response.status()
            )));
        }
        self.state = SessionState::Ready;
        Ok(())
    }

    /// With a value, queries that parameter; with `None` this is the
    /// keep-alive form carrying an empty body.
    pub async fn get_parameter(
        &mut self,
        parameter: Option<&str>,
    ) -> RtspClientResult<Option<String>> {
        let mut builder = RtspRequest::builder()
            .method(RtspMethod::GetParameter)
            .uri(self.control_base().clone());
        if let Some(parameter) = parameter
            && !parameter.is_empty()
        {
            builder = builder
                .header(RtspHeader::ContentType, "text/parameters")
                .body(parameter.to_owned());
        }
        let response = self.send_request(builder.build()?).await?;
        if response.status() != RtspStatus::OK {
            return Err(RtspClientError::Protocol(format!(
                "GET_PARAMETER returned {}",
                response.status()
            )));
        }
        Ok(response.body().cloned())
    }

    /// Runs the whole negotiation: connect, OPTIONS, DESCRIBE, SETUP,
    /// PLAY.
    pub async fn start_listening(&mut self) -> RtspClientResult<()> {
        if matches!(self.state, SessionState::Idle | SessionState::Closed) {
            self.connect().await?;
        }
        self.options().await?;
        self.describe().await?;
        self.setup().await?;
        self.play().await
    }

    /// Tears the session down and closes the control connection. Safe to
    /// call from any state, repeatedly.
    pub async fn stop_listening(&mut self) -> RtspClientResult<()> {
        self.shutdown().await;
        Ok(())
    }

    /// Awaits the next thing that happens to the session: received
    /// media, or its end. Keep-alive and interleaved plumbing run inside
    /// this loop.
    pub async fn next_event(&mut self) -> RtspClientResult<RtspClientEvent> {
        loop {
            if self.state == SessionState::Closed {
                return Ok(RtspClientEvent::Closed);
            }
            let step = {
                let io = self.io.as_mut().ok_or_else(|| {
                    RtspClientError::Protocol("control connection is not open".to_owned())
                })?;
                tokio::select! {
                    event = recv_channel_event(&mut self.channel_events) => Step::Channel(event),
                    message = io.next() => Step::Io(message),
                    packet = recv_outgoing(&mut self.interleaved_out_rx) => Step::Outgoing(packet),
                    _ = keepalive_tick(&mut self.keepalive) => Step::KeepAlive,
                }
            };
            match step {
                Step::Channel(Some(RtpChannelEvent::Rtp(payload))) => {
                    return Ok(RtspClientEvent::Rtp(payload));
                }
                Step::Channel(Some(RtpChannelEvent::Rtcp(payload))) => {
                    return Ok(RtspClientEvent::Rtcp(payload));
                }
                Step::Channel(Some(RtpChannelEvent::Bye)) => {
                    tracing::info!("peer said goodbye over rtcp, tearing the session down");
                    self.state = SessionState::Terminating;
                    self.shutdown().await;
                    return Ok(RtspClientEvent::Closed);
                }
                Step::Channel(None) => {
                    self.channel_events = None;
                }
                Step::Io(Some(Ok(RtspMessage::Interleaved(packet)))) => {
                    if let Some(channel) = &self.channel {
                        channel.deliver_interleaved(packet);
                    }
                }
                Step::Io(Some(Ok(RtspMessage::Response(response)))) => {
                    self.on_unsolicited_response(response);
                }
                Step::Io(Some(Ok(RtspMessage::Request(request)))) => {
                    self.answer_peer_request(request).await?;
                }
                Step::Io(Some(Err(err))) => {
                    self.close_local();
                    return Err(err.into());
                }
                Step::Io(None) => {
                    tracing::info!("control connection closed by peer");
                    self.close_local();
                    return Ok(RtspClientEvent::Closed);
                }
                Step::Outgoing(Some(packet)) => {
                    self.send_message(RtspMessage::Interleaved(packet)).await?;
                }
                Step::Outgoing(None) => {
                    self.interleaved_out_rx = None;
                }
                Step::KeepAlive => {
                    if self.keepalive_cseq.is_some() {
                        tracing::warn!(
                            "keep-alive went unanswered for a full period, stopping the timer"
                        );
                        self.keepalive = None;
                        self.keepalive_cseq = None;
                    } else {
                        self.send_keepalive().await;
                    }
                }
            }
        }
    }

    fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.config.read_timeout_ms)
    }

    fn control_base(&self) -> &Url {
        self.base_url.as_ref().unwrap_or(&self.url)
    }

    fn setup_uri(&self) -> RtspClientResult<Url> {
        let description = self.description.as_ref().ok_or_else(|| {
            RtspClientError::Protocol("no session description, DESCRIBE first".to_owned())
        })?;
        let media = description.media_description.first().ok_or_else(|| {
            RtspClientError::Protocol("session description carries no media".to_owned())
        })?;
        let base = self.control_base();
        match media.control() {
            None | Some("") | Some("*") => Ok(base.clone()),
            Some(control) if control.contains("://") => Ok(control.parse()?),
            Some(control) => {
                let base = base.as_str();
                let joined = if base.ends_with('/') {
                    format!("{}{}", base, control)
                } else {
                    format!("{}/{}", base, control)
                };
                Ok(joined.parse()?)
            }
        }
    }

    async fn prepare_channel(&mut self, use_tcp: bool) -> RtspClientResult<(RtpChannel, String)> {
        if use_tcp {
            let (out_tx, out_rx) = mpsc::unbounded_channel();
            self.interleaved_out_rx = Some(out_rx);
            let channel = RtpChannel::interleaved(0, 1, out_tx);
            Ok((channel, "RTP/AVP/TCP;unicast;interleaved=0-1".to_owned()))
        } else {
            let channel = RtpChannel::receiver(self.config.rtp_port_start).await?;
            let (rtp_port, rtcp_port) = channel.local_ports().ok_or_else(|| {
                RtspClientError::Protocol("receiver channel has no local ports".to_owned())
            })?;
            let transport = format!("RTP/AVP;unicast;client_port={}-{}", rtp_port, rtcp_port);
            Ok((channel, transport))
        }
    }

    async fn arm_channel(
        &mut self,
        mut channel: RtpChannel,
        transport: &TransportHeader,
    ) -> RtspClientResult<()> {
        if channel.kind() == RtpChannelKind::Interleaved {
            if let Some((rtp_id, rtcp_id)) = transport.interleaved {
                channel.set_interleaved_ids(rtp_id, rtcp_id);
            }
        } else if let Some((server_rtp, server_rtcp)) = transport.server_port {
            let peer_ip = self.peer_ip()?;
            channel
                .connect_peer(peer_ip, server_rtp, server_rtcp)
                .await?;
        }
        if let Some(ssrc) = transport.ssrc {
            channel.set_ssrc(ssrc);
            self.ssrc = Some(ssrc);
        }
        channel.connect()?;
        self.channel_events = channel.take_events();
        self.channel = Some(channel);
        Ok(())
    }

    fn peer_ip(&self) -> RtspClientResult<IpAddr> {
        self.io
            .as_ref()
            .and_then(|io| io.get_ref().get_peer_addr())
            .map(|addr| addr.ip())
            .ok_or_else(|| {
                RtspClientError::Protocol("control connection has no peer address".to_owned())
            })
    }

    fn arm_keepalive(&mut self) {
        self.keepalive = None;
        self.keepalive_cseq = None;
        let timeout_secs = self
            .session
            .as_ref()
            .map(|session| session.timeout_secs)
            .unwrap_or(0);
        if timeout_secs == 0 {
            return;
        }
        let period = Duration::from_secs((timeout_secs / 2).max(1));
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.keepalive = Some(interval);
    }

    async fn send_keepalive(&mut self) {
        let method = match self.config.keepalive_method {
            crate::config::KeepAliveMethod::GetParameter => RtspMethod::GetParameter,
            crate::config::KeepAliveMethod::Options => RtspMethod::Options,
        };
        self.next_cseq += 1;
        let cseq = self.next_cseq;
        let mut builder = RtspRequest::builder()
            .method(method)
            .uri(self.control_base().clone())
            .header(RtspHeader::CSeq, cseq.to_string())
            .header(RtspHeader::UserAgent, self.config.user_agent.clone());
        if let Some(session) = &self.session {
            builder = builder.header(RtspHeader::Session, session.id.clone());
        }
        let request = match builder.build() {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("keep-alive request could not be built: {}", err);
                self.keepalive = None;
                return;
            }
        };
        // fire and forget, the answer is matched in the event loop
        match self.send_message(RtspMessage::Request(request)).await {
            Ok(()) => self.keepalive_cseq = Some(cseq),
            Err(err) => {
                tracing::warn!("keep-alive send failed, stopping the timer: {}", err);
                self.keepalive = None;
            }
        }
    }

    fn on_unsolicited_response(&mut self, response: RtspResponse) {
        if self.keepalive_cseq.is_some() && response.headers().cseq() == self.keepalive_cseq {
            self.keepalive_cseq = None;
            if response.status() != RtspStatus::OK {
                tracing::warn!(
                    "keep-alive was refused ({}), stopping the timer",
                    response.status()
                );
                self.keepalive = None;
            }
        } else {
            tracing::debug!("dropping unsolicited response: {}", response.status());
        }
    }

    async fn answer_peer_request(&mut self, request: RtspRequest) -> RtspClientResult<()> {
        tracing::debug!("peer issued {} mid-session", request.method());
        let mut builder = RtspResponse::builder().status(RtspStatus::NotImplemented);
        if let Some(cseq) = request.headers().cseq() {
            builder = builder.header(RtspHeader::CSeq, cseq.to_string());
        }
        self.send_message(RtspMessage::Response(builder.build()?)).await
    }

    /// One request, one response, matched by CSeq. A Basic 401 challenge
    /// is answered once when credentials are configured.
    async fn send_request(&mut self, mut request: RtspRequest) -> RtspClientResult<RtspResponse> {
        let mut auth_retried = false;
        loop {
            self.next_cseq += 1;
            let cseq = self.next_cseq;
            request
                .headers_mut()
                .set(RtspHeader::CSeq, cseq.to_string());
            request
                .headers_mut()
                .set(RtspHeader::UserAgent, self.config.user_agent.clone());
            match &self.session {
                Some(session) => request
                    .headers_mut()
                    .set(RtspHeader::Session, session.id.clone()),
                None => request.headers_mut().remove(RtspHeader::Session),
            }

            self.send_message(RtspMessage::Request(request.clone())).await?;
            let response = self.read_response(cseq).await?;

            if response.status() == RtspStatus::Unauthorized && !auth_retried {
                let Some(credential) = &self.config.credential else {
                    return Err(RtspClientError::Protocol(
                        "peer requires authentication but no credential is configured".to_owned(),
                    ));
                };
                let challenge = response
                    .headers()
                    .get_unique(RtspHeader::WWWAuthenticate)
                    .and_then(|value| value.parse::<WwwAuthenticateHeader>().ok())
                    .ok_or_else(|| {
                        RtspClientError::Protocol(
                            "401 without a WWW-Authenticate challenge".to_owned(),
                        )
                    })?;
                if !challenge.is_basic() {
                    return Err(RtspClientError::Protocol(format!(
                        "unsupported authentication scheme: {}",
                        challenge.scheme
                    )));
                }
                request.headers_mut().set(
                    RtspHeader::Authorization,
                    basic_authorization(&credential.username, &credential.password),
                );
                auth_retried = true;
                continue;
            }
            return Ok(response);
        }
    }

    async fn send_message(&mut self, message: RtspMessage) -> RtspClientResult<()> {
        let write_timeout = Duration::from_millis(self.config.write_timeout_ms);
        let io = self.io.as_mut().ok_or_else(|| {
            RtspClientError::Protocol("control connection is not open".to_owned())
        })?;
        tokio::time::timeout(write_timeout, io.send(message))
            .await
            .map_err(|_| RtspClientError::Timeout)??;
        Ok(())
    }

    /// Reads until the response matching `cseq` arrives; interleaved
    /// frames and peer requests seen meanwhile are routed, late
    /// keep-alive answers are absorbed.
    async fn read_response(&mut self, cseq: u32) -> RtspClientResult<RtspResponse> {
        let read_timeout = self.read_timeout();
        loop {
            let message = {
                let io = self.io.as_mut().ok_or_else(|| {
                    RtspClientError::Protocol("control connection is not open".to_owned())
                })?;
                tokio::time::timeout(read_timeout, io.next())
                    .await
                    .map_err(|_| RtspClientError::Timeout)?
            };
            let message = message.ok_or(RtspClientError::PeerClosed)??;
            match message {
                RtspMessage::Response(response) => match response.headers().cseq() {
                    Some(received) if received == cseq => return Ok(response),
                    received
                        if self.keepalive_cseq.is_some()
                            && received == self.keepalive_cseq =>
                    {
                        self.keepalive_cseq = None;
                    }
                    received => {
                        return Err(RtspClientError::Protocol(format!(
                            "response cseq {:?} does not match request cseq {}",
                            received, cseq
                        )));
                    }
                },
                RtspMessage::Interleaved(packet) => {
                    if let Some(channel) = &self.channel {
                        channel.deliver_interleaved(packet);
                    }
                }
                RtspMessage::Request(peer_request) => {
                    self.answer_peer_request(peer_request).await?;
                }
            }
        }
    }

    fn drop_channel(&mut self) {
        if let Some(channel) = &mut self.channel {
            channel.disconnect();
        }
        self.channel = None;
        self.channel_events = None;
        self.interleaved_out_rx = None;
    }

    /// Local cleanup for a connection that is already gone.
    fn close_local(&mut self) {
        self.keepalive = None;
        self.keepalive_cseq = None;
        self.drop_channel();
        self.io = None;
        self.session = None;
        self.next_cseq = 0;
        self.state = SessionState::Closed;
    }

    /// Full teardown: cancel the timer, disconnect the channel, send
    /// TEARDOWN best-effort, reset the local identity. Every failure on
    /// the way is swallowed.
    async fn shutdown(&mut self) {
        self.keepalive = None;
        self.keepalive_cseq = None;
        self.drop_channel();

        let teardown_applies = matches!(
            self.state,
            SessionState::Described
                | SessionState::Ready
                | SessionState::Playing
                | SessionState::Terminating
        );
        if teardown_applies && self.io.is_some() {
            self.next_cseq += 1;
            let cseq = self.next_cseq;
            let mut builder = RtspRequest::builder()
                .method(RtspMethod::TearDown)
                .uri(self.control_base().clone())
                .header(RtspHeader::CSeq, cseq.to_string())
                .header(RtspHeader::UserAgent, self.config.user_agent.clone());
            if let Some(session) = &self.session {
                builder = builder.header(RtspHeader::Session, session.id.clone());
            }
            if let Ok(request) = builder.build()
                && let Some(io) = self.io.as_mut()
            {
                let deadline =
                    Duration::from_millis(self.config.read_timeout_ms.min(TEARDOWN_TIMEOUT_MS));
                let attempt = async {
                    if io.send(RtspMessage::Request(request)).await.is_err() {
                        return;
                    }
                    loop {
                        match io.next().await {
                            Some(Ok(RtspMessage::Response(_))) | None => return,
                            Some(Ok(_)) => continue,
                            Some(Err(_)) => return,
                        }
                    }
                };
                if tokio::time::timeout(deadline, attempt).await.is_err() {
                    tracing::debug!("teardown got no answer before the internal deadline");
                }
            }
        }

        self.io = None;
        self.session = None;
        self.next_cseq = 0;
        self.state = SessionState::Closed;
        tracing::info!("session closed");
    }
}
