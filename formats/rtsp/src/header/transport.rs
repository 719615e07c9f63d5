use std::{fmt, str::FromStr};

use num::Integer;

use crate::errors::RtspMessageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    RtpAvpUdp,
    RtpAvpTcp,
}

impl TransportProtocol {
    pub fn is_udp(&self) -> bool {
        matches!(self, Self::RtpAvpUdp)
    }

    pub fn is_tcp(&self) -> bool {
        matches!(self, Self::RtpAvpTcp)
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RtpAvpUdp => write!(f, "RTP/AVP"),
            Self::RtpAvpTcp => write!(f, "RTP/AVP/TCP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCast {
    Unicast,
    Multicast,
}

impl fmt::Display for TransportCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicast => write!(f, "unicast"),
            Self::Multicast => write!(f, "multicast"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    Play,
    Record,
    Other(String),
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play => write!(f, "PLAY"),
            Self::Record => write!(f, "RECORD"),
            Self::Other(str) => write!(f, "{}", str),
        }
    }
}

fn parse_number_range<T: FromStr + Integer + Copy>(s: &str) -> Result<(T, T), T::Err> {
    if !s.contains('-') {
        let value: T = s.parse::<T>()?;
        return Ok((value, value));
    }

    let (first, second) = s.split_once('-').unwrap();
    Ok((first.parse()?, second.parse()?))
}

/// The SETUP `Transport` header. The grammar is total over unknown
/// parameters: they are collected into `extensions` and re-emitted, never
/// rejected.
#[derive(Debug, Default, Clone)]
pub struct TransportHeader {
    pub protocol: Option<TransportProtocol>,
    pub cast: Option<TransportCast>,
    pub client_port: Option<(u16, u16)>,
    pub server_port: Option<(u16, u16)>,
    pub interleaved: Option<(u8, u8)>,
    pub ssrc: Option<u32>,
    pub mode: Option<TransportMode>,
    pub destination: Option<String>,
    pub ttl: Option<u8>,
    pub extensions: Vec<String>,

    server_port_single: bool,
}

impl TransportHeader {
    /// A single-valued `server_port` with no echoed `client_port` pair is
    /// how some peers redirect a UDP SETUP onto the control connection.
    pub fn is_tcp_fallback(&self) -> bool {
        self.server_port_single && self.client_port.is_none()
    }

    /// Whether the negotiated delivery rides on the control connection.
    pub fn wants_interleaved(&self) -> bool {
        self.interleaved.is_some() || matches!(self.protocol, Some(protocol) if protocol.is_tcp())
    }
}

impl fmt::Display for TransportHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Vec::new();
        if let Some(protocol) = &self.protocol {
            result.push(format!("{}", protocol));
        }
        if let Some(cast) = &self.cast {
            result.push(format!("{}", cast));
        }
        if let Some(destination) = &self.destination {
            result.push(format!("destination={}", destination));
        }
        if let Some(ttl) = &self.ttl {
            result.push(format!("ttl={}", ttl));
        }
        if let Some(interleaved) = &self.interleaved {
            result.push(format!("interleaved={}-{}", interleaved.0, interleaved.1));
        }
        if let Some(client_port) = &self.client_port {
            result.push(format!("client_port={}-{}", client_port.0, client_port.1));
        }
        if let Some(server_port) = &self.server_port {
            result.push(format!("server_port={}-{}", server_port.0, server_port.1));
        }
        if let Some(ssrc) = &self.ssrc {
            result.push(format!("ssrc={:08X}", ssrc));
        }
        if let Some(mode) = &self.mode {
            result.push(format!("mode={}", mode));
        }
        result.extend(self.extensions.iter().cloned());
        write!(f, "{}", result.join(";"))
    }
}

impl FromStr for TransportHeader {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Self::default();
        for param in s.split(';') {
            let param = param.trim();
            let (k, v) = param.split_once('=').unwrap_or((param, ""));
            match k {
                "RTP/AVP" | "RTP/AVP/UDP" => result.protocol = Some(TransportProtocol::RtpAvpUdp),
                "RTP/AVP/TCP" => result.protocol = Some(TransportProtocol::RtpAvpTcp),
                "unicast" => result.cast = Some(TransportCast::Unicast),
                "multicast" => result.cast = Some(TransportCast::Multicast),
                "client_port" => {
                    result.client_port = Some(parse_number_range::<u16>(v).map_err(|err| {
                        RtspMessageError::InvalidRtspMessageFormat(format!(
                            "[transport header] parse client_port failed: {}, {}",
                            v, err
                        ))
                    })?)
                }
                "server_port" => {
                    result.server_port_single = !v.contains('-');
                    result.server_port = Some(parse_number_range::<u16>(v).map_err(|err| {
                        RtspMessageError::InvalidRtspMessageFormat(format!(
                            "[transport header] parse server_port failed: {}, {}",
                            v, err
                        ))
                    })?)
                }
                "interleaved" => {
                    result.interleaved = Some(parse_number_range::<u8>(v).map_err(|err| {
                        RtspMessageError::InvalidRtspMessageFormat(format!(
                            "[transport header] parse interleaved failed: {}, {}",
                            v, err
                        ))
                    })?)
                }
                "ssrc" => {
                    // decimal first, hexadecimal when that fails
                    let ssrc = v
                        .parse::<u32>()
                        .or_else(|_| u32::from_str_radix(v, 16))
                        .map_err(|err| {
                            RtspMessageError::InvalidRtspMessageFormat(format!(
                                "[transport header] parse ssrc failed: {}, {}",
                                v, err
                            ))
                        })?;
                    result.ssrc = Some(ssrc);
                }
                "mode" => {
                    result.mode = Some(match v.trim_matches('"').to_uppercase().as_str() {
                        "PLAY" => TransportMode::Play,
                        "RECORD" => TransportMode::Record,
                        _ => TransportMode::Other(v.to_owned()),
                    })
                }
                "destination" => {
                    if !v.is_empty() {
                        result.destination = Some(v.to_owned());
                    }
                }
                "ttl" => {
                    result.ttl = Some(v.parse().map_err(|err| {
                        RtspMessageError::InvalidRtspMessageFormat(format!(
                            "[transport header] parse ttl failed: {}, {}",
                            v, err
                        ))
                    })?)
                }
                _ if !param.is_empty() => result.extensions.push(param.to_owned()),
                _ => {}
            }
        }
        Ok(result)
    }
}
