use std::str::FromStr;

use crate::{
    errors::SDPError,
    session::{SDPMediaDescription, SessionDescription},
};

impl FromStr for SessionDescription {
    type Err = SDPError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty());

        let version_line = lines.next().ok_or(SDPError::MissingLine("v="))?;
        let version = version_line
            .strip_prefix("v=")
            .ok_or_else(|| SDPError::Malformed(format!("expected v=, got: {}", version_line)))?
            .parse()
            .map_err(|_| SDPError::Malformed(format!("version: {}", version_line)))?;

        let origin_line = lines.next().ok_or(SDPError::MissingLine("o="))?;
        let origin = origin_line
            .strip_prefix("o=")
            .ok_or_else(|| SDPError::Malformed(format!("expected o=, got: {}", origin_line)))?
            .parse()?;

        let name_line = lines.next().ok_or(SDPError::MissingLine("s="))?;
        let session_name = name_line
            .strip_prefix("s=")
            .ok_or_else(|| SDPError::Malformed(format!("expected s=, got: {}", name_line)))?
            .to_owned();

        let mut session_lines = Vec::new();
        let mut media_description: Vec<SDPMediaDescription> = Vec::new();
        for line in lines {
            if let Some(media_line) = line.strip_prefix("m=") {
                media_description.push(SDPMediaDescription {
                    media_line: media_line.parse()?,
                    lines: Vec::new(),
                });
            } else if let Some(media) = media_description.last_mut() {
                media.lines.push(line.to_owned());
            } else {
                session_lines.push(line.to_owned());
            }
        }

        Ok(Self {
            version,
            origin,
            session_name,
            session_lines,
            media_description,
        })
    }
}
