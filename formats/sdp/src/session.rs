//! @see: RFC 8866 SDP: Session Description Protocol
//!
//! Only the lines this engine reads or rewrites are modelled (`v=`, `o=`,
//! `s=`, `m=` and the `a=control` attribute); every other line is kept
//! verbatim so a rewritten description stays byte compatible with its
//! upstream.
use std::{fmt, str::FromStr};

use crate::{CRLF, errors::SDPError};

/// 5.2. Origin ("o=")
/// o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>
#[derive(Debug, Default, Clone)]
pub struct SDPOrigin {
    pub user_name: String,
    pub session_id: u64,
    pub session_version: u64,
    pub net_type: String,
    pub addr_type: String,
    pub unicast_address: String,
}

impl fmt::Display for SDPOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "o={} {} {} {} {} {}",
            self.user_name,
            self.session_id,
            self.session_version,
            self.net_type,
            self.addr_type,
            self.unicast_address
        )
    }
}

impl FromStr for SDPOrigin {
    type Err = SDPError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(SDPError::Malformed(format!("origin line: {}", s)));
        }
        let session_id = parts[1]
            .parse()
            .map_err(|_| SDPError::Malformed(format!("origin session id: {}", parts[1])))?;
        let session_version = parts[2]
            .parse()
            .map_err(|_| SDPError::Malformed(format!("origin session version: {}", parts[2])))?;
        Ok(Self {
            user_name: parts[0].to_owned(),
            session_id,
            session_version,
            net_type: parts[3].to_owned(),
            addr_type: parts[4].to_owned(),
            unicast_address: parts[5].to_owned(),
        })
    }
}

/// 5.14. Media Descriptions ("m=")
/// m=<media> <port> <proto> <fmt> ...
#[derive(Debug, Clone)]
pub struct SDPMediaLine {
    pub media_type: String,
    pub port: u16,
    pub protocol: String,
    pub formats: Vec<String>,
}

impl fmt::Display for SDPMediaLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m={} {} {} {}",
            self.media_type,
            self.port,
            self.protocol,
            self.formats.join(" ")
        )
    }
}

impl FromStr for SDPMediaLine {
    type Err = SDPError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(SDPError::Malformed(format!("media line: {}", s)));
        }
        let port = parts[1]
            .parse()
            .map_err(|_| SDPError::Malformed(format!("media port: {}", parts[1])))?;
        Ok(Self {
            media_type: parts[0].to_owned(),
            port,
            protocol: parts[2].to_owned(),
            formats: parts[3..].iter().map(|s| (*s).to_owned()).collect(),
        })
    }
}

/// One media section: the parsed `m=` line plus its following lines kept
/// verbatim (without line terminators).
#[derive(Debug, Clone)]
pub struct SDPMediaDescription {
    pub media_line: SDPMediaLine,
    pub lines: Vec<String>,
}

impl SDPMediaDescription {
    /// Value of an `a=<name>:<value>` attribute, `Some("")` for a bare
    /// `a=<name>` flag.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let attr = line.strip_prefix("a=")?;
            match attr.split_once(':') {
                Some((key, value)) if key == name => Some(value),
                None if attr == name => Some(""),
                _ => None,
            }
        })
    }

    pub fn control(&self) -> Option<&str> {
        self.attribute("control")
    }
}

impl fmt::Display for SDPMediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.media_line, CRLF)?;
        self.lines
            .iter()
            .try_for_each(|line| write!(f, "{}{}", line, CRLF))
    }
}

#[derive(Debug, Clone)]
pub struct SessionDescription {
    pub version: u32,
    pub origin: SDPOrigin,
    pub session_name: String,
    /// Session level lines between `s=` and the first media section,
    /// verbatim.
    pub session_lines: Vec<String>,
    pub media_description: Vec<SDPMediaDescription>,
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}{}", self.version, CRLF)?;
        write!(f, "{}{}", self.origin, CRLF)?;
        write!(f, "s={}{}", self.session_name, CRLF)?;
        self.session_lines
            .iter()
            .try_for_each(|line| write!(f, "{}{}", line, CRLF))?;
        self.media_description
            .iter()
            .try_for_each(|media| write!(f, "{}", media))
    }
}
