use std::{fmt, str::FromStr};

use crate::errors::RtspMessageError;

pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 60;

/// `Session: id[;timeout=N]`, timeout defaulting to 60 seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader {
    pub id: String,
    pub timeout_secs: u64,
}

impl SessionHeader {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
        }
    }
}

impl FromStr for SessionHeader {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, params) = s.split_once(';').unwrap_or((s, ""));
        let id = id.trim();
        if id.is_empty() {
            return Err(RtspMessageError::InvalidRtspMessageFormat(
                "session header carries no id".to_owned(),
            ));
        }

        let mut timeout_secs = DEFAULT_SESSION_TIMEOUT_SECS;
        for param in params.split(';') {
            if let Some(value) = param.trim().strip_prefix("timeout=") {
                timeout_secs = value.parse().map_err(|err| {
                    RtspMessageError::InvalidRtspMessageFormat(format!(
                        "[session header] parse timeout failed: {}, {}",
                        value, err
                    ))
                })?;
            }
        }

        Ok(Self {
            id: id.to_owned(),
            timeout_secs,
        })
    }
}

impl fmt::Display for SessionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};timeout={}", self.id, self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_SESSION_TIMEOUT_SECS, SessionHeader};

    #[test]
    fn id_with_timeout() {
        let session: SessionHeader = "12345678;timeout=30".parse().unwrap();
        assert_eq!(session.id, "12345678");
        assert_eq!(session.timeout_secs, 30);
    }

    #[test]
    fn timeout_defaults_to_sixty() {
        let session: SessionHeader = "ULExwZCXh2pd0xuFgkgZJW".parse().unwrap();
        assert_eq!(session.timeout_secs, DEFAULT_SESSION_TIMEOUT_SECS);
    }

    #[test]
    fn zero_timeout_is_preserved() {
        let session: SessionHeader = "abc;timeout=0".parse().unwrap();
        assert_eq!(session.timeout_secs, 0);
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(";timeout=60".parse::<SessionHeader>().is_err());
    }
}
