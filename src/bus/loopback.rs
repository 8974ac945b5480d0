use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::trace;

use super::{BusFrame, BusTransport};

/// In-process bus used by simulations and tests. Frames sent to an
/// identifier are delivered, in send order, to every sender subscribed to
/// that identifier; identifiers without subscribers drop frames silently,
/// like an unfiltered bus with nobody listening.
#[derive(Default)]
pub struct LoopbackBus {
    subscribers: RwLock<HashMap<u16, Vec<mpsc::UnboundedSender<BusFrame>>>>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BusTransport for LoopbackBus {
    async fn send(&self, frame: BusFrame) -> anyhow::Result<()> {
        trace!("loopback send: id={:#05x} remote={}", frame.id, frame.remote);
        let subs = self.subscribers.read().await;
        if let Some(senders) = subs.get(&frame.id) {
            for tx in senders {
                // A dropped receiver just means that subscriber went away.
                let _ = tx.send(frame);
            }
        }
        Ok(())
    }

    async fn subscribe(&self, id: u16, tx: mpsc::UnboundedSender<BusFrame>) {
        let mut subs = self.subscribers.write().await;
        subs.entry(id).or_default().push(tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delivers_to_matching_subscriber_only() {
        let bus = LoopbackBus::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        bus.subscribe(0x17, tx_a).await;
        bus.subscribe(0x19, tx_b).await;

        bus.send(BusFrame::data(0x17, [8, 0, 0, 0, 0, 0, 0, 0]))
            .await
            .unwrap();

        assert_eq!(
            rx_a.try_recv().unwrap(),
            BusFrame::data(0x17, [8, 0, 0, 0, 0, 0, 0, 0])
        );
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribed_id_is_dropped() {
        let bus = LoopbackBus::new();
        bus.send(BusFrame::remote(0x19)).await.unwrap();
    }
}
