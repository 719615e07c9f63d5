pub mod auth;
pub mod header_names;
pub mod rtp_info;
pub mod session;
pub mod transport;

use std::{fmt, io};

use rtp_info::RtpInfoHeader;
use session::SessionHeader;
use tokio_util::bytes::Buf;
use transport::TransportHeader;
use utils::traits::reader::TryReadFrom;

use crate::{consts::common::CRLF_STR, errors::RtspMessageError, time::TimeRange, util::TextReader};

/// Header names are matched case-insensitively; unrecognized names are
/// kept as `Extension` with a lower-cased key so lookups stay uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtspHeader {
    Accept,
    AcceptEncoding,
    AcceptLanguage,
    Allow,
    Authorization,

    Bandwidth,
    Blocksize,

    CacheControl,
    Conference,
    Connection,
    ContentBase,
    ContentEncoding,
    ContentLanguage,
    ContentLength,
    ContentLocation,
    ContentType,
    CSeq,

    Date,

    Expires,

    From,

    IfModifiedSince,

    LastModified,
    Location,

    ProxyAuthenticate,
    ProxyRequire,
    Public,

    Range,
    Referer,
    Require,
    RetryAfter,
    RtpInfo,

    Scale,
    Server,
    Session,
    Speed,

    Timestamp,
    Transport,

    Unsupported,
    UserAgent,

    Vary,
    Via,

    WWWAuthenticate,

    Extension(String),
}

impl<'a> From<&'a RtspHeader> for &'a str {
    fn from(value: &'a RtspHeader) -> Self {
        match value {
            RtspHeader::Accept => header_names::ACCEPT,
            RtspHeader::AcceptEncoding => header_names::ACCEPT_ENCODING,
            RtspHeader::AcceptLanguage => header_names::ACCEPT_LANGUAGE,
            RtspHeader::Allow => header_names::ALLOW,
            RtspHeader::Authorization => header_names::AUTHORIZATION,

            RtspHeader::Bandwidth => header_names::BANDWIDTH,
            RtspHeader::Blocksize => header_names::BLOCKSIZE,

            RtspHeader::CacheControl => header_names::CACHE_CONTROL,
            RtspHeader::Conference => header_names::CONFERENCE,
            RtspHeader::Connection => header_names::CONNECTION,
            RtspHeader::ContentBase => header_names::CONTENT_BASE,
            RtspHeader::ContentEncoding => header_names::CONTENT_ENCODING,
            RtspHeader::ContentLanguage => header_names::CONTENT_LANGUAGE,
            RtspHeader::ContentLength => header_names::CONTENT_LENGTH,
            RtspHeader::ContentLocation => header_names::CONTENT_LOCATION,
            RtspHeader::ContentType => header_names::CONTENT_TYPE,
            RtspHeader::CSeq => header_names::C_SEQ,

            RtspHeader::Date => header_names::DATE,

            RtspHeader::Expires => header_names::EXPIRES,

            RtspHeader::From => header_names::FROM,

            RtspHeader::IfModifiedSince => header_names::IF_MODIFIED_SINCE,

            RtspHeader::LastModified => header_names::LAST_MODIFIED,
            RtspHeader::Location => header_names::LOCATION,

            RtspHeader::ProxyAuthenticate => header_names::PROXY_AUTHENTICATE,
            RtspHeader::ProxyRequire => header_names::PROXY_REQUIRE,
            RtspHeader::Public => header_names::PUBLIC,

            RtspHeader::Range => header_names::RANGE,
            RtspHeader::Referer => header_names::REFERER,
            RtspHeader::Require => header_names::REQUIRE,
            RtspHeader::RetryAfter => header_names::RETRY_AFTER,
            RtspHeader::RtpInfo => header_names::RTP_INFO,

            RtspHeader::Scale => header_names::SCALE,
            RtspHeader::Server => header_names::SERVER,
            RtspHeader::Session => header_names::SESSION,
            RtspHeader::Speed => header_names::SPEED,

            RtspHeader::Timestamp => header_names::TIMESTAMP,
            RtspHeader::Transport => header_names::TRANSPORT,

            RtspHeader::Unsupported => header_names::UNSUPPORTED,
            RtspHeader::UserAgent => header_names::USER_AGENT,

            RtspHeader::Vary => header_names::VARY,
            RtspHeader::Via => header_names::VIA,

            RtspHeader::WWWAuthenticate => header_names::WWW_AUTHENTICATE,

            RtspHeader::Extension(name) => name.as_str(),
        }
    }
}

impl From<&str> for RtspHeader {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "accept" => Self::Accept,
            "accept-encoding" => Self::AcceptEncoding,
            "accept-language" => Self::AcceptLanguage,
            "allow" => Self::Allow,
            "authorization" => Self::Authorization,

            "bandwidth" => Self::Bandwidth,
            "blocksize" => Self::Blocksize,

            "cache-control" => Self::CacheControl,
            "conference" => Self::Conference,
            "connection" => Self::Connection,
            "content-base" => Self::ContentBase,
            "content-encoding" => Self::ContentEncoding,
            "content-language" => Self::ContentLanguage,
            "content-length" => Self::ContentLength,
            "content-location" => Self::ContentLocation,
            "content-type" => Self::ContentType,
            "cseq" => Self::CSeq,

            "date" => Self::Date,

            "expires" => Self::Expires,

            "from" => Self::From,

            "if-modified-since" => Self::IfModifiedSince,

            "last-modified" => Self::LastModified,
            "location" => Self::Location,

            "proxy-authenticate" => Self::ProxyAuthenticate,
            "proxy-require" => Self::ProxyRequire,
            "public" => Self::Public,

            "range" => Self::Range,
            "referer" => Self::Referer,
            "require" => Self::Require,
            "retry-after" => Self::RetryAfter,
            "rtp-info" => Self::RtpInfo,

            "scale" => Self::Scale,
            "server" => Self::Server,
            "session" => Self::Session,
            "speed" => Self::Speed,

            "timestamp" => Self::Timestamp,
            "transport" => Self::Transport,

            "unsupported" => Self::Unsupported,
            "user-agent" => Self::UserAgent,

            "vary" => Self::Vary,
            "via" => Self::Via,

            "www-authenticate" => Self::WWWAuthenticate,

            other => Self::Extension(other.to_owned()),
        }
    }
}

impl fmt::Display for RtspHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str: &str = self.into();
        f.write_str(str)
    }
}

/// Insertion ordered header multimap.
#[derive(Debug, Default, Clone)]
pub struct RtspHeaders(Vec<(RtspHeader, String)>);

impl RtspHeaders {
    pub fn new(items: Vec<(RtspHeader, String)>) -> Self {
        Self(items)
    }

    pub fn push<S: Into<String>>(&mut self, key: RtspHeader, value: S) {
        self.0.push((key, value.into()));
    }

    pub fn append(&mut self, mut items: Vec<(RtspHeader, String)>) {
        self.0.append(&mut items);
    }

    pub fn get(&self, key: RtspHeader) -> Vec<&String> {
        self.0
            .iter()
            .filter(|(k, _)| k.eq(&key))
            .map(|(_, value)| value)
            .collect()
    }

    pub fn get_unique(&self, key: RtspHeader) -> Option<&String> {
        self.get(key).first().copied()
    }

    pub fn contains(&self, key: RtspHeader) -> bool {
        self.0.iter().any(|(k, _)| k.eq(&key))
    }

    pub fn remove(&mut self, key: RtspHeader) {
        self.0.retain(|(k, _)| k.ne(&key));
    }

    pub fn set<S: Into<String>>(&mut self, key: RtspHeader, value: S) {
        self.remove(key.clone());
        self.push(key, value.into());
    }

    pub fn entries(&self) -> &Vec<(RtspHeader, String)> {
        &self.0
    }

    pub fn cseq(&self) -> Option<u32> {
        self.get_unique(RtspHeader::CSeq)
            .and_then(|cseq| cseq.parse().ok())
    }

    pub fn transport(&self) -> Option<TransportHeader> {
        self.get_unique(RtspHeader::Transport)
            .and_then(|value| value.parse().ok())
    }

    pub fn session(&self) -> Option<SessionHeader> {
        self.get_unique(RtspHeader::Session)
            .and_then(|value| value.parse().ok())
    }

    pub fn rtp_info(&self) -> Option<RtpInfoHeader> {
        self.get_unique(RtspHeader::RtpInfo)
            .and_then(|value| value.parse().ok())
    }

    pub fn range(&self) -> Option<TimeRange> {
        self.get_unique(RtspHeader::Range)
            .and_then(|value| value.parse().ok())
    }
}

impl fmt::Display for RtspHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entries().iter().try_for_each(|(key, value)| {
            f.write_fmt(format_args!("{}: {}{}", key, value, CRLF_STR))
        })
    }
}

impl<R: AsRef<[u8]>> TryReadFrom<R> for RtspHeaders {
    type Error = RtspMessageError;
    fn try_read_from(reader: &mut io::Cursor<R>) -> Result<Option<Self>, Self::Error> {
        if !reader.has_remaining() {
            return Ok(None);
        }
        let mut text_reader = TextReader::new(reader);
        let mut headers = vec![];
        loop {
            let line = text_reader.read_line()?;
            if line.is_none() {
                // at least the terminating CRLF should be there
                return Ok(None);
            }

            let line = line.unwrap();
            if !line.ends_with('\n') {
                // a header line split mid-way is incomplete input, not a
                // malformed message
                return Ok(None);
            }
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() {
                break;
            }
            let (key, value) =
                trimmed_line
                    .split_once(':')
                    .ok_or(RtspMessageError::InvalidRtspMessageFormat(format!(
                        "invalid header line: {}",
                        line
                    )))?;

            headers.push((RtspHeader::from(key.trim()), value.trim().to_owned()));
        }

        Ok(Some(Self(headers)))
    }
}
