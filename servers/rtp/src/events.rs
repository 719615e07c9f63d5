use tokio::sync::mpsc;
use tokio_util::bytes::Bytes;

/// RTCP packet type of a Goodbye packet, RFC 3550 Section 6.6.
pub const RTCP_PAYLOAD_TYPE_BYE: u8 = 203;

#[derive(Debug, Clone)]
pub enum RtpChannelEvent {
    Rtp(Bytes),
    Rtcp(Bytes),
    /// Emitted in addition to `Rtcp` when the packet is a BYE; the session
    /// owning the channel transitions to its terminating state.
    Bye,
}

pub type RtpChannelEventSender = mpsc::UnboundedSender<RtpChannelEvent>;
pub type RtpChannelEventReceiver = mpsc::UnboundedReceiver<RtpChannelEvent>;

/// Checks the fixed RTCP header without fully parsing the packet; the
/// packet type lives in the second octet.
pub fn is_rtcp_bye(payload: &[u8]) -> bool {
    payload.len() >= 2 && payload[1] == RTCP_PAYLOAD_TYPE_BYE
}
