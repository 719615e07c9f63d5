use std::{
    fmt::Write,
    io::{self, BufRead, Seek},
    str::FromStr,
};

use byteorder::ReadBytesExt;
use consts::{
    common::{LF, SPACE_STR},
    methods::RtspMethod,
    version::RtspVersion,
};
use errors::RtspMessageError;
use interleaved::{DOLLAR_SIGN, RtspInterleavedPacket};
use request::RtspRequest;
use response::RtspResponse;
use tokio_util::{
    bytes::Buf,
    codec::{Decoder, Encoder},
};
use utils::traits::{
    WriteTo, dynamic_sized_packet::DynamicSizedPacket, reader::TryReadFrom,
    reader::TryReadRemainingFrom,
};

pub mod consts;
pub mod errors;
pub mod header;
pub mod interleaved;
pub mod request;
pub mod response;
pub mod time;
mod util;

/// Hard cap for a single control message; interleaved frames are bounded
/// by their 16 bit length field and are not affected.
pub const MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// One unit of the control channel stream: an RTSP request, an RTSP
/// response, or a `$`-framed binary packet interleaved between them.
#[derive(Debug)]
pub enum RtspMessage {
    Request(RtspRequest),
    Response(RtspResponse),
    Interleaved(RtspInterleavedPacket),
}

impl<R: AsRef<[u8]>> TryReadFrom<R> for RtspMessage {
    type Error = RtspMessageError;
    fn try_read_from(reader: &mut io::Cursor<R>) -> Result<Option<Self>, Self::Error> {
        if !reader.has_remaining() {
            return Ok(None);
        }

        let first_byte = reader.read_u8().unwrap();
        if first_byte == DOLLAR_SIGN {
            return RtspInterleavedPacket::try_read_remaining_from(first_byte, reader)
                .map(|interleaved| interleaved.map(Self::Interleaved));
        }
        reader.seek_relative(-1).unwrap();

        if !reader.fill_buf()?.contains(&LF) {
            return Ok(None);
        }
        let mut first_line = String::new();
        reader.fill_buf()?.read_line(&mut first_line)?;
        if let Some((first_word, _)) = first_line.split_once(SPACE_STR) {
            if let Ok(method) = RtspMethod::from_str(first_word) {
                reader.consume(first_word.len());
                return RtspRequest::try_read_remaining_from(method, reader)
                    .map(|request| request.map(Self::Request));
            }

            if let Ok(version) = RtspVersion::from_str(first_word) {
                reader.consume(first_word.len());
                return RtspResponse::try_read_remaining_from(version, reader)
                    .map(|response| response.map(Self::Response));
            }
        }

        Err(RtspMessageError::InvalidRtspMessageFormat(format!(
            "not an rtsp message: {}",
            first_line.trim_end()
        )))
    }
}

impl<W: io::Write> WriteTo<W> for RtspMessage {
    type Error = RtspMessageError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        match self {
            Self::Request(request) => write!(writer, "{}", request)?,
            Self::Response(response) => write!(writer, "{}", response)?,
            Self::Interleaved(interleaved) => interleaved.write_to(writer)?,
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RtspMessageFramed {
    max_message_bytes: usize,
}

impl RtspMessageFramed {
    pub fn new(max_message_bytes: usize) -> Self {
        Self { max_message_bytes }
    }
}

impl Default for RtspMessageFramed {
    fn default() -> Self {
        Self::new(MAX_MESSAGE_BYTES)
    }
}

impl Encoder<RtspMessage> for RtspMessageFramed {
    type Error = RtspMessageError;

    fn encode(
        &mut self,
        item: RtspMessage,
        dst: &mut tokio_util::bytes::BytesMut,
    ) -> Result<(), Self::Error> {
        match &item {
            RtspMessage::Request(request) => dst.write_fmt(format_args!("{}", request))?,
            RtspMessage::Response(response) => dst.write_fmt(format_args!("{}", response))?,
            RtspMessage::Interleaved(interleaved) => {
                let mut bytes = Vec::with_capacity(interleaved.get_packet_bytes_count());
                interleaved.write_to(&mut bytes)?;
                dst.extend_from_slice(&bytes);
            }
        }
        Ok(())
    }
}

impl Decoder for RtspMessageFramed {
    type Error = RtspMessageError;
    type Item = RtspMessage;

    fn decode(
        &mut self,
        src: &mut tokio_util::bytes::BytesMut,
    ) -> Result<Option<Self::Item>, Self::Error> {
        let (res, position) = {
            let mut cursor = io::Cursor::new(&src);
            let res = RtspMessage::try_read_from(&mut cursor);
            (res, cursor.position())
        };
        match res {
            Ok(Some(message)) => {
                src.advance(position as usize);
                Ok(Some(message))
            }
            Ok(None) if src.len() > self.max_message_bytes => {
                Err(RtspMessageError::MessageTooLarge(src.len()))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod test;
