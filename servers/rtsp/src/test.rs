use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use rtsp_client::{PreferredTransport, RtspClient, RtspClientConfig, RtspClientEvent, SessionState};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tokio_util::bytes::Bytes;
use url::Url;

use crate::{
    RtspServer, RtspServerConfig, SERVER_AGENT,
    session::rewrite_session_description,
    source::MediaSource,
};

const TEST_DEADLINE: Duration = Duration::from_secs(15);

const FEED_SDP: &str = "v=0\r\n\
o=upstream 2890844526 2890842807 IN IP4 203.0.113.7\r\n\
s=upstream feed\r\n\
t=0 0\r\n\
m=video 0 RTP/AVP 96\r\n\
a=rtpmap:96 H264/90000\r\n\
a=control:track1\r\n";

fn feed_source() -> MediaSource {
    MediaSource::new(FEED_SDP.parse().unwrap())
}

async fn start_server() -> (MediaSource, Url, tokio::task::JoinHandle<()>) {
    let source = feed_source();
    let config = RtspServerConfig {
        address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        session_timeout_secs: 60,
    };
    let server = RtspServer::bind(config, source.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = server.run().await;
    });
    let url = format!("rtsp://{}/stream", addr).parse().unwrap();
    (source, url, handle)
}

#[test]
fn describe_rewrite_replaces_origin_and_name_only() {
    let upstream: sdp_formats::session::SessionDescription = FEED_SDP.parse().unwrap();
    let local_ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
    let rewritten = rewrite_session_description(&upstream, local_ip);

    assert_eq!(rewritten.origin.user_name, "-");
    assert_eq!(rewritten.origin.net_type, "IN");
    assert_eq!(rewritten.origin.addr_type, "IP4");
    assert_eq!(rewritten.origin.unicast_address, "192.0.2.1");
    // ntp seconds since 1900 are far past the upstream's epoch value
    assert!(rewritten.origin.session_id > 2_208_988_800);
    assert_eq!(rewritten.session_name, SERVER_AGENT);

    // everything else is carried verbatim
    assert_eq!(rewritten.session_lines, upstream.session_lines);
    assert_eq!(
        rewritten.media_description[0].lines,
        upstream.media_description[0].lines
    );
    assert_eq!(format!("{}", rewritten.media_description[0].media_line), "m=video 0 RTP/AVP 96");

    // and the result is still a parseable description
    let emitted = format!("{}", rewritten);
    assert!(emitted.parse::<sdp_formats::session::SessionDescription>().is_ok());
}

#[tokio::test]
async fn interleaved_end_to_end() {
    tokio::time::timeout(TEST_DEADLINE, async {
        let (source, url, server) = start_server().await;

        let config = RtspClientConfig {
            preferred_transport: PreferredTransport::Tcp,
            ..Default::default()
        };
        let mut client = RtspClient::new(url, config);
        client.start_listening().await.unwrap();
        assert_eq!(client.state(), SessionState::Playing);
        assert!(client.session_id().is_some());
        assert!(client.ssrc().is_some());

        source.publish_rtp(Bytes::from_static(b"frame-1"));
        match client.next_event().await.unwrap() {
            RtspClientEvent::Rtp(payload) => assert_eq!(payload.as_ref(), b"frame-1"),
            other => panic!("expected media, got {:?}", other),
        }

        // keep-alive round trip against the live server
        let body = client.get_parameter(None).await.unwrap();
        assert!(body.is_none());

        client.stop_listening().await.unwrap();
        assert_eq!(client.state(), SessionState::Closed);
        server.abort();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn udp_end_to_end() {
    tokio::time::timeout(TEST_DEADLINE, async {
        let (source, url, server) = start_server().await;

        let mut client = RtspClient::new(url, RtspClientConfig::default());
        client.start_listening().await.unwrap();
        assert_eq!(client.state(), SessionState::Playing);

        // delivery subscription races the PLAY response by a hair, so
        // publish until the first packet lands
        let received = loop {
            source.publish_rtp(Bytes::from_static(b"frame-udp"));
            match tokio::time::timeout(Duration::from_millis(200), client.next_event()).await {
                Ok(event) => break event.unwrap(),
                Err(_) => continue,
            }
        };
        match received {
            RtspClientEvent::Rtp(payload) => assert_eq!(payload.as_ref(), b"frame-udp"),
            other => panic!("expected media, got {:?}", other),
        }

        client.stop_listening().await.unwrap();
        server.abort();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn upstream_bye_closes_the_peer_session() {
    tokio::time::timeout(TEST_DEADLINE, async {
        let (source, url, server) = start_server().await;

        let config = RtspClientConfig {
            preferred_transport: PreferredTransport::Tcp,
            ..Default::default()
        };
        let mut client = RtspClient::new(url, config);
        client.start_listening().await.unwrap();

        // an upstream goodbye terminates the peer session, which drops
        // the control connection
        source.publish_rtcp(Bytes::from_static(&[
            0x81, 203, 0x00, 0x01, 0x12, 0x34, 0x56, 0x78,
        ]));

        loop {
            match client.next_event().await {
                Ok(RtspClientEvent::Closed) => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        server.abort();
    })
    .await
    .unwrap();
}

async fn read_response_text(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 2048];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "server closed mid-response");
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8(buffer).unwrap()
}

#[tokio::test]
async fn cseq_is_echoed_and_sessions_are_gated() {
    tokio::time::timeout(TEST_DEADLINE, async {
        let (_source, url, server) = start_server().await;
        let authority = format!(
            "{}:{}",
            url.host_str().unwrap(),
            url.port().unwrap()
        );
        let mut stream = TcpStream::connect(authority).await.unwrap();

        stream
            .write_all(format!("OPTIONS {} RTSP/1.0\r\nCSeq: 7\r\n\r\n", url).as_bytes())
            .await
            .unwrap();
        let response = read_response_text(&mut stream).await;
        assert!(response.starts_with("RTSP/1.0 200 OK\r\n"), "{}", response);
        assert!(response.contains("CSeq: 7\r\n"), "{}", response);
        assert!(response.contains("SETUP"), "{}", response);

        // PLAY against a session this connection never set up
        stream
            .write_all(
                format!(
                    "PLAY {} RTSP/1.0\r\nCSeq: 8\r\nSession: no-such-session\r\n\r\n",
                    url
                )
                .as_bytes(),
            )
            .await
            .unwrap();
        let response = read_response_text(&mut stream).await;
        assert!(
            response.starts_with("RTSP/1.0 454 Session Not Found\r\n"),
            "{}",
            response
        );
        assert!(response.contains("CSeq: 8\r\n"), "{}", response);

        server.abort();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn describe_returns_the_rewritten_description() {
    tokio::time::timeout(TEST_DEADLINE, async {
        let (_source, url, server) = start_server().await;
        let authority = format!("{}:{}", url.host_str().unwrap(), url.port().unwrap());
        let mut stream = TcpStream::connect(authority).await.unwrap();

        stream
            .write_all(
                format!(
                    "DESCRIBE {} RTSP/1.0\r\nCSeq: 1\r\nAccept: application/sdp\r\n\r\n",
                    url
                )
                .as_bytes(),
            )
            .await
            .unwrap();

        // read until the full body is in
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 4096];
        let text = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0);
            buffer.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buffer).to_string();
            if text.contains("a=control:track1") {
                break text;
            }
        };

        assert!(text.contains("Content-Type: application/sdp\r\n"), "{}", text);
        assert!(text.contains("\r\no=- "), "{}", text);
        assert!(text.contains(&format!("\r\ns={}\r\n", SERVER_AGENT)), "{}", text);
        // upstream media section is untouched
        assert!(text.contains("m=video 0 RTP/AVP 96\r\n"), "{}", text);
        assert!(text.contains("a=rtpmap:96 H264/90000\r\n"), "{}", text);
        // the upstream origin must not leak through
        assert!(!text.contains("203.0.113.7"), "{}", text);

        server.abort();
    })
    .await
    .unwrap();
}
