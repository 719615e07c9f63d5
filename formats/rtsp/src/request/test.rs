#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use url::Url;
    use utils::traits::reader::{ReadFrom, TryReadFrom};

    use crate::{
        consts::methods::RtspMethod,
        header::RtspHeader,
        request::RtspRequest,
    };

    #[test]
    fn options() {
        let request = RtspRequest::builder()
            .method(RtspMethod::Options)
            .uri("rtsp://server.example.com".parse::<Url>().unwrap())
            .header(RtspHeader::CSeq, "1")
            .header(RtspHeader::UserAgent, "PhonyClient/1.2")
            .build();
        assert!(request.is_ok());

        let text = "OPTIONS rtsp://server.example.com RTSP/1.0\r\n\
CSeq: 1\r\n\
User-Agent: PhonyClient/1.2\r\n\r\n";

        assert_eq!(format!("{}", request.unwrap()).trim_end(), text.trim_end());
        let parsed = RtspRequest::read_from(&mut text.as_bytes());
        assert!(parsed.is_ok());
        assert_eq!(text.trim_end(), format!("{}", parsed.unwrap()).trim_end());
    }

    #[test]
    fn describe() {
        let request = RtspRequest::builder()
            .method(RtspMethod::Describe)
            .uri(
                "rtsp://server.example.com/fizzle/foo"
                    .parse::<Url>()
                    .unwrap(),
            )
            .header(RtspHeader::CSeq, "312")
            .header(RtspHeader::UserAgent, "PhonyClient/1.2")
            .header(RtspHeader::Accept, "application/sdp")
            .build();
        assert!(request.is_ok());
        let text = "DESCRIBE rtsp://server.example.com/fizzle/foo RTSP/1.0\r\n\
CSeq: 312\r\n\
User-Agent: PhonyClient/1.2\r\n\
Accept: application/sdp\r\n\r\n";
        assert_eq!(text.trim_end(), format!("{}", request.unwrap()).trim_end());
        let parsed = RtspRequest::read_from(&mut text.as_bytes());
        assert!(parsed.is_ok());
        assert_eq!(text.trim_end(), format!("{}", parsed.unwrap()).trim_end());
    }

    #[test]
    fn setup() {
        let request = RtspRequest::builder()
            .method(RtspMethod::Setup)
            .uri("rtsp://example.com/foo/bar/baz.rm".parse::<Url>().unwrap())
            .header(RtspHeader::CSeq, "302")
            .header(
                RtspHeader::Transport,
                "RTP/AVP;unicast;client_port=4588-4589",
            )
            .header(RtspHeader::UserAgent, "PhonyClient/1.2")
            .build();

        assert!(request.is_ok());
        let request = request.unwrap();

        let text = "SETUP rtsp://example.com/foo/bar/baz.rm RTSP/1.0\r\n\
CSeq: 302\r\n\
Transport: RTP/AVP;unicast;client_port=4588-4589\r\n\
User-Agent: PhonyClient/1.2\r\n\r\n";
        assert_eq!(text.trim_end(), format!("{}", request).trim_end());
        let parsed = RtspRequest::read_from(&mut text.as_bytes());
        assert!(parsed.is_ok());
        assert_eq!(text.trim_end(), format!("{}", parsed.unwrap()).trim_end());
    }

    #[test]
    fn play() {
        let request = RtspRequest::builder()
            .method(RtspMethod::Play)
            .uri("rtsp://example.com/audio".parse::<Url>().unwrap())
            .header(RtspHeader::CSeq, "836")
            .header(RtspHeader::Session, "ULExwZCXh2pd0xuFgkgZJW")
            .header(RtspHeader::Range, "npt=3.52-")
            .header(RtspHeader::UserAgent, "PhonyClient/1.2")
            .build();
        assert!(request.is_ok());
        let request = request.unwrap();
        let text = "PLAY rtsp://example.com/audio RTSP/1.0\r\n\
CSeq: 836\r\n\
Session: ULExwZCXh2pd0xuFgkgZJW\r\n\
Range: npt=3.52-\r\n\
User-Agent: PhonyClient/1.2\r\n\r\n";
        assert_eq!(text.trim_end(), format!("{}", request).trim_end());
        let parsed = RtspRequest::read_from(&mut text.as_bytes());
        assert!(parsed.is_ok());
        assert_eq!(text.trim_end(), format!("{}", parsed.unwrap()).trim_end());
    }

    #[test]
    fn teardown() {
        let request = RtspRequest::builder()
            .method(RtspMethod::TearDown)
            .uri("rtsp://example.com/fizzle/foo".parse::<Url>().unwrap())
            .header(RtspHeader::CSeq, "892")
            .header(RtspHeader::Session, "OccldOFFq23KwjYpAnBbUr")
            .header(RtspHeader::UserAgent, "PhonyClient/1.2")
            .build();
        assert!(request.is_ok());
        let request = request.unwrap();
        let text = "TEARDOWN rtsp://example.com/fizzle/foo RTSP/1.0\r\n\
CSeq: 892\r\n\
Session: OccldOFFq23KwjYpAnBbUr\r\n\
User-Agent: PhonyClient/1.2\r\n\r\n";
        assert_eq!(text.trim_end(), format!("{}", request).trim_end());
        let parsed = RtspRequest::read_from(&mut text.as_bytes());
        assert!(parsed.is_ok());
        assert_eq!(text.trim_end(), format!("{}", parsed.unwrap()).trim_end());
    }

    #[test]
    fn get_parameter() {
        let request = RtspRequest::builder()
            .method(RtspMethod::GetParameter)
            .uri("rtsp://example.com/fizzle/foo".parse::<Url>().unwrap())
            .header(RtspHeader::CSeq, "431")
            .header(RtspHeader::UserAgent, "PhonyClient/1.2")
            .header(RtspHeader::Session, "OccldOFFq23KwjYpAnBbUr")
            .header(RtspHeader::ContentType, "text/parameters")
            .body("packets_received\r\njitter".to_owned())
            .build();
        assert!(request.is_ok());
        let request = request.unwrap();
        let body = "packets_received\r\njitter";
        let text = format!(
            "GET_PARAMETER rtsp://example.com/fizzle/foo RTSP/1.0\r\n\
CSeq: 431\r\n\
User-Agent: PhonyClient/1.2\r\n\
Session: OccldOFFq23KwjYpAnBbUr\r\n\
Content-Type: text/parameters\r\n\
Content-Length: 24\r\n\r\n{}",
            body
        );
        assert_eq!(text, format!("{}", request));
        assert_eq!(request.body().unwrap(), body);

        let parsed = RtspRequest::read_from(&mut text.as_bytes());
        assert!(parsed.is_ok());
        let parsed = parsed.unwrap();
        assert_eq!(text, format!("{}", parsed));
        assert_eq!(parsed.body().unwrap(), body);
    }

    #[test]
    fn get_parameter_incomplete_body() {
        let text = "GET_PARAMETER rtsp://example.com/fizzle/foo RTSP/1.0\r\n\
CSeq: 431\r\n\
Content-Type: text/parameters\r\n\
Content-Length: 24\r\n\r\npackets_received\r\njitt";

        let mut cursor = io::Cursor::new(text.as_bytes());
        let parsed = RtspRequest::try_read_from(cursor.by_ref());
        assert!(parsed.is_ok());
        assert!(parsed.unwrap().is_none());
    }

    #[test]
    fn incomplete_headers() {
        let text = "SETUP rtsp://example.com/foo RTSP/1.0\r\n\
CSeq: 302\r\n\
Transport: RTP/AVP;unicast";

        let mut cursor = io::Cursor::new(text.as_bytes());
        let parsed = RtspRequest::try_read_from(cursor.by_ref());
        assert!(parsed.is_ok());
        assert!(parsed.unwrap().is_none());
    }

    #[test]
    fn extension_headers_are_preserved() {
        let text = "OPTIONS rtsp://server.example.com RTSP/1.0\r\n\
CSeq: 1\r\n\
X-Dynamic-Rate: 1\r\n\r\n";
        let parsed = RtspRequest::read_from(&mut text.as_bytes()).unwrap();
        assert_eq!(
            parsed
                .headers()
                .get_unique(RtspHeader::Extension("x-dynamic-rate".to_owned()))
                .map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn header_names_match_case_insensitively() {
        let text = "PLAY rtsp://example.com/audio RTSP/1.0\r\n\
cseq: 7\r\n\
SESSION: abc\r\n\r\n";
        let parsed = RtspRequest::read_from(&mut text.as_bytes()).unwrap();
        assert_eq!(parsed.headers().cseq(), Some(7));
        assert_eq!(
            parsed
                .headers()
                .get_unique(RtspHeader::Session)
                .map(String::as_str),
            Some("abc")
        );
    }
}
