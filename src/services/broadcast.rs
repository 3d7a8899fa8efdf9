//! Live scan-count fan-out
//!
//! Every committed scan is published once to all connected subscribers.
//! Delivery is best effort: nothing is persisted or replayed, and a
//! subscriber that falls behind the channel capacity skips to newer updates.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::storage::models::TS_EXPORT_PATH;

/// 推送给订阅者的计数变更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct ScanUpdate {
    pub code_id: String,
    #[ts(type = "number")]
    pub scan_count: u64,
}

/// Publishes count updates after a scan commits
pub trait UpdateBroadcaster: Send + Sync {
    /// Fire-and-forget; must not fail when nobody is listening
    fn publish(&self, update: ScanUpdate);

    fn subscriber_count(&self) -> usize {
        0
    }
}

/// Process-wide subscriber group backed by a tokio broadcast channel
pub struct LiveHub {
    sender: broadcast::Sender<ScanUpdate>,
    subscribers: Arc<AtomicUsize>,
    next_id: AtomicU64,
}

impl LiveHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscribers: Arc::new(AtomicUsize::new(0)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Join the group; dropping the returned handle leaves it
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = self.subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Live subscriber #{} connected ({} active)", id, active);

        Subscription {
            id,
            receiver: self.sender.subscribe(),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl UpdateBroadcaster for LiveHub {
    fn publish(&self, update: ScanUpdate) {
        match self.sender.send(update) {
            Ok(receivers) => debug!("Scan update delivered to {} subscribers", receivers),
            Err(broadcast::error::SendError(update)) => {
                debug!("No live subscribers for update on {}", update.code_id)
            }
        }
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }
}

/// A live subscriber's membership in the hub
pub struct Subscription {
    id: u64,
    receiver: broadcast::Receiver<ScanUpdate>,
    subscribers: Arc<AtomicUsize>,
}

impl Subscription {
    /// Wait for the next update; `None` once the hub is gone
    pub async fn recv(&mut self) -> Option<ScanUpdate> {
        loop {
            match self.receiver.recv().await {
                Ok(update) => return Some(update),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Live subscriber #{} lagged, skipped {} updates",
                        self.id, skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let remaining = self.subscribers.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        info!(
            "Live subscriber #{} disconnected ({} active)",
            self.id, remaining
        );
    }
}
