use rtsp_formats::MAX_MESSAGE_BYTES;

pub const DEFAULT_USER_AGENT: &str = "rill/rtsp";
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_RTP_PORT_START: u16 = 15000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferredTransport {
    #[default]
    Udp,
    Tcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepAliveMethod {
    #[default]
    GetParameter,
    Options,
}

#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RtspClientConfig {
    pub user_agent: String,
    pub credential: Option<Credential>,
    pub preferred_transport: PreferredTransport,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub max_message_bytes: usize,
    pub keepalive_method: KeepAliveMethod,
    /// Where the even/odd local port search starts for UDP reception.
    pub rtp_port_start: u16,
}

impl Default for RtspClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            credential: None,
            preferred_transport: PreferredTransport::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            max_message_bytes: MAX_MESSAGE_BYTES,
            keepalive_method: KeepAliveMethod::default(),
            rtp_port_start: DEFAULT_RTP_PORT_START,
        }
    }
}
