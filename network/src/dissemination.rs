//! Dissemination facade — the broadcast and pull API used by the rest of
//! the node.
//!
//! Broadcasts snapshot the pool and enqueue on every peer, best-effort:
//! one peer's rejection never aborts the fan-out, and delivery failures are
//! reported per peer. Pull requests target one named peer and fail fast when
//! it is unknown.

use std::sync::Arc;

use cinder_messages::{BlockAnnouncement, PeerAddress};
use cinder_types::{BlockHash, BlockWithTransactions, Transaction};

use crate::error::NetworkError;
use crate::peer::{DeliveryCallback, Peer};
use crate::pool::PeerPool;

/// Aggregate outcome of one broadcast fan-out.
///
/// `sent` counts peers that accepted the item onto their queue; `rejected`
/// names the peers whose enqueue was refused (queue full or peer stopping).
/// Each rejected peer's failure detail has already been delivered through
/// the item's callback and logged.
#[derive(Clone, Debug, Default)]
pub struct BroadcastReport {
    pub sent: usize,
    pub rejected: Vec<String>,
}

impl BroadcastReport {
    /// Whether every peer in the snapshot accepted the item.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Facade over the peer pool used by sync and consensus code.
pub struct Disseminator {
    pool: Arc<PeerPool>,
}

impl Disseminator {
    pub fn new(pool: Arc<PeerPool>) -> Self {
        Self { pool }
    }

    // ── Broadcast (push) ───────────────────────────────────────────────

    /// Queue a full block on every connected peer. Never suspends the
    /// caller and never fails as a whole.
    pub fn broadcast_block(&self, block: &BlockWithTransactions) -> BroadcastReport {
        self.broadcast("block", |peer, on_delivery| {
            peer.enqueue_block(block.clone(), on_delivery)
        })
    }

    /// Queue a transaction on every connected peer.
    pub fn broadcast_transaction(&self, tx: &Transaction) -> BroadcastReport {
        self.broadcast("transaction", |peer, on_delivery| {
            peer.enqueue_transaction(tx.clone(), on_delivery)
        })
    }

    /// Queue a block announcement on every connected peer.
    pub fn broadcast_announcement(&self, announcement: &BlockAnnouncement) -> BroadcastReport {
        self.broadcast("announcement", |peer, on_delivery| {
            peer.enqueue_announcement(announcement.clone(), on_delivery)
        })
    }

    fn broadcast(
        &self,
        kind: &'static str,
        mut enqueue: impl FnMut(&Peer, DeliveryCallback) -> bool,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for peer in self.pool.snapshot() {
            let endpoint = peer.endpoint().to_string();
            let callback_endpoint = endpoint.clone();
            let accepted = enqueue(
                &peer,
                Box::new(move |outcome| {
                    if let Err(e) = outcome {
                        tracing::warn!(
                            peer = %callback_endpoint,
                            kind,
                            error = %e,
                            "broadcast delivery failed"
                        );
                    }
                }),
            );
            if accepted {
                report.sent += 1;
            } else {
                report.rejected.push(endpoint);
            }
        }
        if !report.is_complete() {
            tracing::debug!(
                kind,
                sent = report.sent,
                rejected = report.rejected.len(),
                "broadcast partially rejected"
            );
        }
        report
    }

    // ── Pull (request/response) ────────────────────────────────────────

    /// Ask one named peer for a block by hash.
    pub async fn request_block_from(
        &self,
        endpoint: &str,
        hash: BlockHash,
    ) -> Result<Option<BlockWithTransactions>, NetworkError> {
        self.lookup(endpoint)?.get_block_by_hash(hash).await
    }

    /// Ask one named peer for up to `count` blocks strictly after `after`.
    pub async fn request_blocks_from(
        &self,
        endpoint: &str,
        after: BlockHash,
        count: u32,
    ) -> Result<Vec<BlockWithTransactions>, NetworkError> {
        self.lookup(endpoint)?.get_blocks(after, count).await
    }

    /// Ask one named peer for its known-node list.
    pub async fn request_nodes_from(
        &self,
        endpoint: &str,
    ) -> Result<Vec<PeerAddress>, NetworkError> {
        self.lookup(endpoint)?.get_nodes().await
    }

    fn lookup(&self, endpoint: &str) -> Result<Arc<Peer>, NetworkError> {
        self.pool
            .get(endpoint)
            .ok_or_else(|| NetworkError::PeerUnknown(endpoint.to_string()))
    }
}
