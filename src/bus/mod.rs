pub mod frame;
pub mod loopback;

use tokio::sync::mpsc;

/// One frame on the shared bus: a numeric identifier plus eight data bytes.
/// Remote frames carry no payload; they request the peer that owns the
/// identifier to respond with a data frame on the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFrame {
    pub id: u16,
    pub data: [u8; 8],
    pub remote: bool,
}

impl BusFrame {
    pub fn data(id: u16, data: [u8; 8]) -> Self {
        Self {
            id,
            data,
            remote: false,
        }
    }

    pub fn remote(id: u16) -> Self {
        Self {
            id,
            data: [0u8; 8],
            remote: true,
        }
    }
}

/// Shared bus transport. Sends are fire-and-forget: there is no
/// acknowledgement or retry at this layer. Incoming frames are demultiplexed
/// by identifier to the subscribed senders.
#[async_trait::async_trait]
pub trait BusTransport: Send + Sync {
    async fn send(&self, frame: BusFrame) -> anyhow::Result<()>;

    async fn subscribe(&self, id: u16, tx: mpsc::UnboundedSender<BusFrame>);
}
