use std::sync::Arc;

use sdp_formats::session::SessionDescription;
use tokio::sync::broadcast;
use tokio_util::bytes::Bytes;

const SOURCE_QUEUE_DEPTH: usize = 1024;

/// Handle to the upstream feed a server hands out to its peer sessions:
/// the source description plus fan-out queues for its RTP and RTCP
/// packets. Cloning shares the same feed.
#[derive(Debug, Clone)]
pub struct MediaSource {
    description: Arc<SessionDescription>,
    rtp_tx: broadcast::Sender<Bytes>,
    rtcp_tx: broadcast::Sender<Bytes>,
}

impl MediaSource {
    pub fn new(description: SessionDescription) -> Self {
        let (rtp_tx, _) = broadcast::channel(SOURCE_QUEUE_DEPTH);
        let (rtcp_tx, _) = broadcast::channel(SOURCE_QUEUE_DEPTH);
        Self {
            description: Arc::new(description),
            rtp_tx,
            rtcp_tx,
        }
    }

    pub fn description(&self) -> &SessionDescription {
        &self.description
    }

    /// Ingest side: queues one RTP packet toward every playing session.
    pub fn publish_rtp(&self, payload: Bytes) {
        // an error only means nobody is playing right now
        let _ = self.rtp_tx.send(payload);
    }

    pub fn publish_rtcp(&self, payload: Bytes) {
        let _ = self.rtcp_tx.send(payload);
    }

    pub(crate) fn subscribe_rtp(&self) -> broadcast::Receiver<Bytes> {
        self.rtp_tx.subscribe()
    }

    pub(crate) fn subscribe_rtcp(&self) -> broadcast::Receiver<Bytes> {
        self.rtcp_tx.subscribe()
    }
}
