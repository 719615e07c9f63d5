use crate::session::SessionDescription;

const SEMINAR: &str = "v=0\r\n\
o=MNobody 2890844526 2890842807 IN IP4 192.0.2.46\r\n\
s=SDP Seminar\r\n\
i=A Seminar on the session description protocol\r\n\
c=IN IP4 0.0.0.0\r\n\
a=control:*\r\n\
t=2873397496 2873404696\r\n\
m=audio 3456 RTP/AVP 0\r\n\
a=control:audio\r\n\
m=video 2232 RTP/AVP 31\r\n\
a=fmtp:31 foo=bar\r\n\
a=control:video\r\n";

#[test]
fn parse_and_emit_round_trip() {
    let sdp: SessionDescription = SEMINAR.parse().unwrap();
    assert_eq!(sdp.version, 0);
    assert_eq!(sdp.origin.user_name, "MNobody");
    assert_eq!(sdp.origin.session_id, 2890844526);
    assert_eq!(sdp.origin.session_version, 2890842807);
    assert_eq!(sdp.origin.unicast_address, "192.0.2.46");
    assert_eq!(sdp.session_name, "SDP Seminar");
    assert_eq!(sdp.session_lines.len(), 4);
    assert_eq!(sdp.media_description.len(), 2);
    assert_eq!(format!("{}", sdp), SEMINAR);
}

#[test]
fn media_line_fields() {
    let sdp: SessionDescription = SEMINAR.parse().unwrap();
    let video = &sdp.media_description[1];
    assert_eq!(video.media_line.media_type, "video");
    assert_eq!(video.media_line.port, 2232);
    assert_eq!(video.media_line.protocol, "RTP/AVP");
    assert_eq!(video.media_line.formats, vec!["31"]);
}

#[test]
fn control_attribute_lookup() {
    let sdp: SessionDescription = SEMINAR.parse().unwrap();
    assert_eq!(sdp.media_description[0].control(), Some("audio"));
    assert_eq!(sdp.media_description[1].control(), Some("video"));
    assert_eq!(sdp.media_description[1].attribute("fmtp"), Some("31 foo=bar"));
    assert_eq!(sdp.media_description[1].attribute("rtpmap"), None);
}

#[test]
fn unknown_lines_survive_verbatim() {
    let text = "v=0\r\n\
o=- 1 2 IN IP4 10.0.0.1\r\n\
s=feed\r\n\
x-extension: opaque\r\n\
m=video 0 RTP/AVP 96\r\n\
b=AS:500\r\n\
a=rtpmap:96 H264/90000\r\n";
    let sdp: SessionDescription = text.parse().unwrap();
    assert_eq!(sdp.session_lines, vec!["x-extension: opaque"]);
    assert_eq!(
        sdp.media_description[0].lines,
        vec!["b=AS:500", "a=rtpmap:96 H264/90000"]
    );
    assert_eq!(format!("{}", sdp), text);
}

#[test]
fn rejects_text_that_is_not_a_description() {
    assert!("not an sdp".parse::<SessionDescription>().is_err());
    assert!("v=0\r\no=broken\r\ns=x\r\n".parse::<SessionDescription>().is_err());
}

#[test]
fn bare_lf_line_endings_are_accepted() {
    let text = "v=0\no=- 1 2 IN IP4 10.0.0.1\ns=feed\nm=audio 0 RTP/AVP 0\na=control:trackID=1\n";
    let sdp: SessionDescription = text.parse().unwrap();
    assert_eq!(sdp.media_description[0].control(), Some("trackID=1"));
}
