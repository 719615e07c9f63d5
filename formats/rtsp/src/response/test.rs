#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use utils::traits::reader::{ReadFrom, TryReadFrom};

    use crate::{
        consts::status::RtspStatus,
        header::RtspHeader,
        response::RtspResponse,
    };

    #[test]
    fn options() {
        let response = RtspResponse::builder()
            .status(RtspStatus::OK)
            .header(RtspHeader::CSeq, "1")
            .header(
                RtspHeader::Public,
                "OPTIONS, DESCRIBE, SETUP, PLAY, PAUSE, TEARDOWN",
            )
            .header(RtspHeader::Server, "PhonyServer/1.1")
            .build();
        assert!(response.is_ok());
        let text = "RTSP/1.0 200 OK\r\n\
CSeq: 1\r\n\
Public: OPTIONS, DESCRIBE, SETUP, PLAY, PAUSE, TEARDOWN\r\n\
Server: PhonyServer/1.1\r\n\r\n";
        assert_eq!(text.trim_end(), format!("{}", response.unwrap()).trim_end());
        let parsed = RtspResponse::read_from(text.as_bytes());
        assert!(parsed.is_ok());
        assert_eq!(text.trim_end(), format!("{}", parsed.unwrap()).trim_end());
    }

    #[test]
    fn describe_with_sdp_body() {
        let body = "v=0\r\n\
o=- 2890844526 2890842807 IN IP4 192.0.2.46\r\n\
s=SDP Seminar\r\n\
m=video 0 RTP/AVP 96\r\n\
a=control:track1\r\n";

        let response = RtspResponse::builder()
            .status(RtspStatus::OK)
            .header(RtspHeader::CSeq, "312")
            .header(
                RtspHeader::ContentBase,
                "rtsp://server.example.com/fizzle/foo/",
            )
            .header(RtspHeader::ContentType, "application/sdp")
            .body(body.to_owned())
            .build();

        assert!(response.is_ok());
        let response = response.unwrap();

        let text = format!(
            "RTSP/1.0 200 OK\r\n\
CSeq: 312\r\n\
Content-Base: rtsp://server.example.com/fizzle/foo/\r\n\
Content-Type: application/sdp\r\n\
Content-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        assert_eq!(text, format!("{}", response));
        assert_eq!(response.body().unwrap(), body);

        let parsed = RtspResponse::read_from(text.as_bytes());
        assert!(parsed.is_ok());
        let parsed = parsed.unwrap();
        assert_eq!(text, format!("{}", parsed));
        assert_eq!(parsed.body().unwrap(), body);
    }

    #[test]
    fn setup() {
        let text = "RTSP/1.0 200 OK\r\n\
CSeq: 302\r\n\
Session: 12345678;timeout=60\r\n\
Transport: RTP/AVP;unicast;client_port=15000-15001;server_port=30000-30001;ssrc=1A2B3C4D\r\n\r\n";
        let parsed = RtspResponse::read_from(text.as_bytes()).unwrap();
        assert_eq!(parsed.status(), RtspStatus::OK);

        let session = parsed.headers().session().unwrap();
        assert_eq!(session.id, "12345678");
        assert_eq!(session.timeout_secs, 60);

        let transport = parsed.headers().transport().unwrap();
        assert_eq!(transport.server_port, Some((30000, 30001)));
        assert_eq!(transport.ssrc, Some(0x1A2B3C4D));
    }

    #[test]
    fn play_with_rtp_info() {
        let text = "RTSP/1.0 200 OK\r\n\
CSeq: 5\r\n\
Session: 12345678\r\n\
RTP-Info: url=rtsp://h/track1;seqno=17;rtptime=900000\r\n\
Range: npt=0-\r\n\r\n";
        let parsed = RtspResponse::read_from(text.as_bytes()).unwrap();
        let info = parsed.headers().rtp_info().unwrap();
        assert_eq!(info.0[0].seq, Some(17));
        assert_eq!(info.0[0].rtptime, Some(900000));
        let range = parsed.headers().range().unwrap();
        assert_eq!(range.start_seconds(), 0.0);
    }

    #[test]
    fn session_not_found() {
        let text = "RTSP/1.0 454 Session Not Found\r\nCSeq: 6\r\n\r\n";
        let parsed = RtspResponse::read_from(text.as_bytes()).unwrap();
        assert_eq!(parsed.status(), RtspStatus::SessionNotFound);
        assert_eq!(text.trim_end(), format!("{}", parsed).trim_end());
    }

    #[test]
    fn reason_phrase_is_derived_from_the_code() {
        // peers may send any reason text, the code alone is authoritative
        let text = "RTSP/1.0 454 Whatever\r\nCSeq: 6\r\n\r\n";
        let parsed = RtspResponse::read_from(text.as_bytes()).unwrap();
        assert_eq!(parsed.status(), RtspStatus::SessionNotFound);
    }

    #[test]
    fn incomplete_response() {
        let text = "RTSP/1.0 200 OK\r\n\
CSeq: 732\r\n\
Session: uZ3ci0K+Ld-M";

        let mut cursor = io::Cursor::new(text.as_bytes());
        let parsed = RtspResponse::try_read_from(cursor.by_ref());
        assert!(parsed.is_ok());
        assert!(parsed.unwrap().is_none());
    }

    #[test]
    fn incomplete_body() {
        let text = "RTSP/1.0 200 OK\r\n\
CSeq: 431\r\n\
Content-Type: text/parameters\r\n\
Content-Length: 36\r\n\r\npackets_received: 10\r\njitter: ";
        let mut cursor = io::Cursor::new(text.as_bytes());
        let parsed = RtspResponse::try_read_from(cursor.by_ref());
        assert!(parsed.is_ok());
        assert!(parsed.unwrap().is_none());
    }

    #[test]
    fn unauthorized_with_basic_challenge() {
        let text = "RTSP/1.0 401 Unauthorized\r\n\
CSeq: 2\r\n\
WWW-Authenticate: Basic realm=\"Streaming Server\"\r\n\r\n";
        let parsed = RtspResponse::read_from(text.as_bytes()).unwrap();
        assert_eq!(parsed.status(), RtspStatus::Unauthorized);
        let challenge: crate::header::auth::WwwAuthenticateHeader = parsed
            .headers()
            .get_unique(RtspHeader::WWWAuthenticate)
            .unwrap()
            .parse()
            .unwrap();
        assert!(challenge.is_basic());
    }
}
