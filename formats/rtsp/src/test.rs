use std::io::Cursor;

use tokio_util::{
    bytes::{BufMut, BytesMut},
    codec::{Decoder, Encoder},
};
use utils::traits::reader::TryReadFrom;

use crate::{
    RtspMessage, RtspMessageFramed,
    consts::{methods::RtspMethod, status::RtspStatus},
    header::RtspHeader,
    request::RtspRequest,
};

#[test]
fn response_then_interleaved_frame_demultiplex() {
    let mut src = BytesMut::new();
    src.extend_from_slice(b"RTSP/1.0 200 OK\r\nCSeq: 4\r\n\r\n");
    src.extend_from_slice(b"$\x00\x00\x04\xDE\xAD\xBE\xEF");

    let mut codec = RtspMessageFramed::default();
    let first = codec.decode(&mut src).unwrap().unwrap();
    match first {
        RtspMessage::Response(response) => {
            assert_eq!(response.status(), RtspStatus::OK);
            assert_eq!(response.headers().cseq(), Some(4));
        }
        other => panic!("expected a response, got {:?}", other),
    }

    let second = codec.decode(&mut src).unwrap().unwrap();
    match second {
        RtspMessage::Interleaved(packet) => {
            assert_eq!(packet.channel_id, 0);
            assert_eq!(packet.payload.as_ref(), b"\xDE\xAD\xBE\xEF");
        }
        other => panic!("expected an interleaved frame, got {:?}", other),
    }

    assert!(src.is_empty());
    assert!(codec.decode(&mut src).unwrap().is_none());
}

#[test]
fn partial_input_waits_for_more() {
    let mut codec = RtspMessageFramed::default();

    let mut src = BytesMut::from(&b"RTSP/1.0 200 OK\r\nCSeq:"[..]);
    assert!(codec.decode(&mut src).unwrap().is_none());
    // nothing may be consumed while waiting
    assert!(src.starts_with(b"RTSP/1.0"));

    src.extend_from_slice(b" 4\r\n\r\n");
    assert!(codec.decode(&mut src).unwrap().is_some());
}

#[test]
fn partial_interleaved_frame_waits_for_more() {
    let mut codec = RtspMessageFramed::default();
    let mut src = BytesMut::from(&b"$\x00\x00\x10\xDE\xAD"[..]);
    assert!(codec.decode(&mut src).unwrap().is_none());
    assert_eq!(src.len(), 6);
}

#[test]
fn garbage_is_rejected() {
    let mut codec = RtspMessageFramed::default();
    let mut src = BytesMut::from(&b"HTTP/1.1 200 OK\r\n\r\n"[..]);
    assert!(codec.decode(&mut src).is_err());
}

#[test]
fn oversize_message_is_rejected() {
    let mut codec = RtspMessageFramed::new(64);
    let mut src = BytesMut::new();
    src.extend_from_slice(b"DESCRIBE rtsp://example.com/ RTSP/1.0\r\nX-Filler: ");
    src.put_bytes(b'a', 128);
    let err = codec.decode(&mut src).unwrap_err();
    assert!(matches!(
        err,
        crate::errors::RtspMessageError::MessageTooLarge(_)
    ));
}

#[test]
fn encode_then_decode_request_round_trip() {
    let request = RtspRequest::builder()
        .method(RtspMethod::Setup)
        .uri("rtsp://example.com/stream/track1".parse().unwrap())
        .header(RtspHeader::CSeq, "3")
        .header(
            RtspHeader::Transport,
            "RTP/AVP;unicast;client_port=15000-15001",
        )
        .build()
        .unwrap();
    let original = format!("{}", request);

    let mut codec = RtspMessageFramed::default();
    let mut buffer = BytesMut::new();
    codec.encode(RtspMessage::Request(request), &mut buffer).unwrap();
    let decoded = codec.decode(&mut buffer).unwrap().unwrap();
    match decoded {
        RtspMessage::Request(decoded) => assert_eq!(format!("{}", decoded), original),
        other => panic!("expected a request, got {:?}", other),
    }
}

#[test]
fn interleaved_marker_routes_away_from_text_grammar() {
    let mut cursor = Cursor::new(b"$\x07\x00\x02ab".as_ref());
    let message = RtspMessage::try_read_from(&mut cursor).unwrap().unwrap();
    match message {
        RtspMessage::Interleaved(packet) => {
            assert_eq!(packet.channel_id, 7);
            assert_eq!(packet.payload.as_ref(), b"ab");
        }
        other => panic!("expected an interleaved frame, got {:?}", other),
    }
}
