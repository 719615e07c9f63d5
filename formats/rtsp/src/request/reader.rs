use std::{
    io::{self, BufRead, Read},
    str::FromStr,
};

use tokio_util::bytes::Buf;
use url::Url;
use utils::traits::reader::{ReadFrom, TryReadFrom, TryReadRemainingFrom};

use crate::{
    consts::{
        common::{LF, SPACE, SPACE_STR},
        methods::RtspMethod,
        version::RtspVersion,
    },
    errors::RtspMessageError,
    header::{RtspHeader, RtspHeaders},
    util::TextReader,
};

use super::RtspRequest;

impl<R: io::BufRead> ReadFrom<R> for RtspRequest {
    type Error = RtspMessageError;
    fn read_from(mut reader: R) -> Result<Self, Self::Error> {
        let buffer = reader.fill_buf()?;
        let (res, position) = {
            let mut cursor = io::Cursor::new(&buffer);
            (
                Self::try_read_from(&mut cursor)?.ok_or(
                    RtspMessageError::InvalidRtspMessageFormat(format!(
                        "rtsp request is not complete: {}",
                        String::from_utf8_lossy(buffer)
                    )),
                ),
                cursor.position(),
            )
        };
        if res.is_ok() {
            reader.consume(position as usize);
        }
        res
    }
}

impl FromStr for RtspRequest {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::read_from(s.as_bytes())
    }
}

impl<R: AsRef<[u8]>> TryReadRemainingFrom<RtspMethod, R> for RtspRequest {
    type Error = RtspMessageError;
    fn try_read_remaining_from(
        header: RtspMethod,
        reader: &mut io::Cursor<R>,
    ) -> Result<Option<Self>, Self::Error> {
        if !reader.has_remaining() {
            return Ok(None);
        }
        if !TextReader::new(reader.by_ref()).expect(&[SPACE])? {
            return Err(RtspMessageError::InvalidRtspMessageFormat(
                "rtsp request first line expects a space".to_string(),
            ));
        }
        let line = TextReader::new(reader.by_ref()).read_line()?;
        if line.is_none() {
            return Ok(None);
        }
        let line = line.unwrap();
        if !line.ends_with('\n') {
            return Ok(None);
        }
        let trimmed_line_parts: Vec<_> = line.trim().split(SPACE_STR).collect();
        if trimmed_line_parts.len() != 2 {
            return Err(RtspMessageError::InvalidRtspMessageFormat(line));
        }

        let uri = trimmed_line_parts[0].parse::<Url>()?;
        let version: RtspVersion = trimmed_line_parts[1].parse()?;
        let headers = RtspHeaders::try_read_from(reader)?;
        if headers.is_none() {
            return Ok(None);
        }
        let headers = headers.unwrap();

        let content_length = headers
            .get_unique(RtspHeader::ContentLength)
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(0);

        let body = if content_length > 0 {
            let body = TextReader::new(reader.by_ref()).try_read_exact(content_length)?;
            if body.is_none() {
                return Ok(None);
            }
            body
        } else {
            None
        };

        Ok(Some(Self {
            method: header,
            uri,
            version,
            headers,
            body,
        }))
    }
}

impl<R: AsRef<[u8]>> TryReadFrom<R> for RtspRequest {
    type Error = RtspMessageError;
    fn try_read_from(reader: &mut io::Cursor<R>) -> Result<Option<Self>, Self::Error> {
        if !reader.fill_buf()?.contains(&LF) {
            return Ok(None);
        }
        let mut first_line = String::new();
        reader.fill_buf()?.read_line(&mut first_line)?;

        if let Some((first_word, _)) = first_line.split_once(SPACE_STR)
            && let Ok(method) = RtspMethod::from_str(first_word)
        {
            reader.consume(first_word.len());
            return Self::try_read_remaining_from(method, reader);
        }
        Err(RtspMessageError::InvalidRtspMessageFormat(format!(
            "message is not an rtsp request, first line: {}",
            first_line
        )))
    }
}
