use std::{fmt, str::FromStr};

use crate::errors::RtspMessageError;

/// One `RTP-Info` track entry. Peers spell the sequence field both as
/// `seq` (RFC 2326) and `seqno`; both are accepted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RtpInfoEntry {
    pub url: Option<String>,
    pub seq: Option<u16>,
    pub rtptime: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RtpInfoHeader(pub Vec<RtpInfoEntry>);

impl FromStr for RtpInfoHeader {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for track in s.split(',') {
            let track = track.trim();
            if track.is_empty() {
                continue;
            }
            let mut entry = RtpInfoEntry::default();
            for field in track.split(';') {
                let (k, v) = field.trim().split_once('=').unwrap_or((field, ""));
                match k {
                    "url" => entry.url = Some(v.trim_matches('"').to_owned()),
                    "seq" | "seqno" => {
                        entry.seq = Some(v.parse().map_err(|err| {
                            RtspMessageError::InvalidRtspMessageFormat(format!(
                                "[rtp-info header] parse seq failed: {}, {}",
                                v, err
                            ))
                        })?)
                    }
                    "rtptime" => {
                        entry.rtptime = Some(v.parse().map_err(|err| {
                            RtspMessageError::InvalidRtspMessageFormat(format!(
                                "[rtp-info header] parse rtptime failed: {}, {}",
                                v, err
                            ))
                        })?)
                    }
                    _ => {}
                }
            }
            entries.push(entry);
        }
        Ok(Self(entries))
    }
}

impl fmt::Display for RtpInfoHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracks: Vec<String> = self
            .0
            .iter()
            .map(|entry| {
                let mut fields = Vec::new();
                if let Some(url) = &entry.url {
                    fields.push(format!("url={}", url));
                }
                if let Some(seq) = &entry.seq {
                    fields.push(format!("seq={}", seq));
                }
                if let Some(rtptime) = &entry.rtptime {
                    fields.push(format!("rtptime={}", rtptime));
                }
                fields.join(";")
            })
            .collect();
        write!(f, "{}", tracks.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::RtpInfoHeader;

    #[test]
    fn single_track_with_seqno_spelling() {
        let info: RtpInfoHeader = "url=rtsp://h/track1;seqno=17;rtptime=900000".parse().unwrap();
        assert_eq!(info.0.len(), 1);
        assert_eq!(info.0[0].url.as_deref(), Some("rtsp://h/track1"));
        assert_eq!(info.0[0].seq, Some(17));
        assert_eq!(info.0[0].rtptime, Some(900000));
    }

    #[test]
    fn multiple_tracks() {
        let info: RtpInfoHeader =
            "url=rtsp://h/audio;seq=45102,url=rtsp://h/video;seq=30211;rtptime=1234567890"
                .parse()
                .unwrap();
        assert_eq!(info.0.len(), 2);
        assert_eq!(info.0[0].seq, Some(45102));
        assert_eq!(info.0[1].rtptime, Some(1234567890));
    }

    #[test]
    fn quoted_urls_are_unwrapped() {
        let info: RtpInfoHeader = "url=\"rtsp://example.com/audio\";seq=14783".parse().unwrap();
        assert_eq!(info.0[0].url.as_deref(), Some("rtsp://example.com/audio"));
    }

    #[test]
    fn bad_sequence_number_is_rejected() {
        assert!("url=rtsp://h/a;seq=banana".parse::<RtpInfoHeader>().is_err());
    }
}
