use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::errors::RtspMessageError;

/// `Authorization` value for HTTP Basic credentials.
pub fn basic_authorization(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}

/// A parsed `WWW-Authenticate` challenge. Only the scheme and realm are
/// interpreted; everything else stays opaque.
#[derive(Debug, Clone)]
pub struct WwwAuthenticateHeader {
    pub scheme: String,
    pub realm: Option<String>,
}

impl WwwAuthenticateHeader {
    pub fn is_basic(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("Basic")
    }
}

impl FromStr for WwwAuthenticateHeader {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (scheme, params) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        if scheme.is_empty() {
            return Err(RtspMessageError::InvalidAuthentication(
                "challenge carries no scheme".to_owned(),
            ));
        }
        let realm = params.split(',').find_map(|param| {
            param
                .trim()
                .strip_prefix("realm=")
                .map(|value| value.trim_matches('"').to_owned())
        });
        Ok(Self {
            scheme: scheme.to_owned(),
            realm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{WwwAuthenticateHeader, basic_authorization};

    #[test]
    fn basic_credential_encoding() {
        // RFC 7617's Aladdin example
        assert_eq!(
            basic_authorization("Aladdin", "open sesame"),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn basic_challenge() {
        let challenge: WwwAuthenticateHeader = "Basic realm=\"Streaming Server\"".parse().unwrap();
        assert!(challenge.is_basic());
        assert_eq!(challenge.realm.as_deref(), Some("Streaming Server"));
    }

    #[test]
    fn digest_challenge_is_recognized_but_not_basic() {
        let challenge: WwwAuthenticateHeader =
            "Digest realm=\"cam\", nonce=\"0042\"".parse().unwrap();
        assert!(!challenge.is_basic());
        assert_eq!(challenge.realm.as_deref(), Some("cam"));
    }
}
