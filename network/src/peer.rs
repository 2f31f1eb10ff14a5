//! A connected remote peer — typed outbound queues, delivery workers, and
//! pull-style requests.
//!
//! Each peer owns three bounded queues (blocks, transactions, announcements),
//! each drained by its own worker task. Enqueueing never blocks the caller:
//! a full queue rejects the item immediately through its completion callback.
//! Pull requests bypass the queues and call the transport directly under a
//! per-call deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};

use cinder_messages::{BlockAnnouncement, PeerAddress, PeerRequest, PeerResponse};
use cinder_types::{BlockHash, BlockWithTransactions, Transaction};

use crate::config::NetworkConfig;
use crate::error::NetworkError;
use crate::metrics::{MetricsSnapshot, MetricsTracker};
use crate::transport::PeerTransport;

/// Completion callback for an enqueued outbound item. Invoked exactly once
/// with the delivery outcome, either synchronously at enqueue time (rejection)
/// or later from the delivery worker.
pub type DeliveryCallback = Box<dyn FnOnce(Result<(), NetworkError>) + Send + 'static>;

/// One payload waiting on an outbound queue, paired with its callback.
struct OutboundItem<T> {
    payload: T,
    on_delivery: DeliveryCallback,
}

/// State shared between a peer handle and its delivery workers.
struct PeerShared {
    endpoint: String,
    /// Transport-level liveness, flipped by collaborators. Queued sends
    /// fast-fail while this is down; pull calls ignore it so an
    /// already-disconnected peer can still answer in-flight requests.
    connected: AtomicBool,
    transport: Arc<dyn PeerTransport>,
    metrics: MetricsTracker,
    request_timeout: Duration,
}

impl PeerShared {
    /// Serialize the request envelope, call the transport under the per-call
    /// deadline, record the attempt, and decode the response envelope.
    async fn call(&self, request: PeerRequest) -> Result<PeerResponse, NetworkError> {
        let method = request.method();
        let payload = bincode::serialize(&request)
            .map_err(|e| NetworkError::Serialization(e.to_string()))?;

        let started = Instant::now();
        let result = tokio::time::timeout(
            self.request_timeout,
            self.transport.send(method, payload),
        )
        .await;

        let outcome = match result {
            Ok(Ok(bytes)) => bincode::deserialize(&bytes)
                .map_err(|e| NetworkError::Serialization(e.to_string())),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(NetworkError::Timeout(self.request_timeout)),
        };
        self.metrics
            .record(method, started.elapsed(), outcome.is_ok());
        outcome
    }
}

/// A remote node this node is connected to, identified by network address.
///
/// Created by the connection-management layer once a transport handshake has
/// succeeded; the transport handle is owned exclusively by this peer. Dropped
/// or [`disconnect`](Peer::disconnect)ed peers reject new enqueues and drain
/// already-queued items with a failure callback.
pub struct Peer {
    shared: Arc<PeerShared>,
    blocks_tx: mpsc::Sender<OutboundItem<BlockWithTransactions>>,
    transactions_tx: mpsc::Sender<OutboundItem<Transaction>>,
    announcements_tx: mpsc::Sender<OutboundItem<BlockAnnouncement>>,
    shutdown_tx: broadcast::Sender<()>,
    stopped: AtomicBool,
}

impl Peer {
    /// Create a peer and spawn its three delivery workers.
    ///
    /// Must be called from within a tokio runtime. The peer starts in the
    /// connected state, matching its creation on handshake success.
    pub fn spawn(
        address: PeerAddress,
        transport: Arc<dyn PeerTransport>,
        config: &NetworkConfig,
    ) -> Self {
        let shared = Arc::new(PeerShared {
            endpoint: address.key(),
            connected: AtomicBool::new(true),
            transport,
            metrics: MetricsTracker::new(&config.metric_methods),
            request_timeout: config.request_timeout(),
        });
        let (shutdown_tx, _) = broadcast::channel(1);

        let (blocks_tx, blocks_rx) = mpsc::channel(config.queue_capacity);
        let (transactions_tx, transactions_rx) = mpsc::channel(config.queue_capacity);
        let (announcements_tx, announcements_rx) = mpsc::channel(config.queue_capacity);

        spawn_delivery_worker(
            blocks_rx,
            shutdown_tx.subscribe(),
            Arc::clone(&shared),
            PeerRequest::PushBlock,
        );
        spawn_delivery_worker(
            transactions_rx,
            shutdown_tx.subscribe(),
            Arc::clone(&shared),
            PeerRequest::PushTransaction,
        );
        spawn_delivery_worker(
            announcements_rx,
            shutdown_tx.subscribe(),
            Arc::clone(&shared),
            PeerRequest::Announce,
        );

        Self {
            shared,
            blocks_tx,
            transactions_tx,
            announcements_tx,
            shutdown_tx,
            stopped: AtomicBool::new(false),
        }
    }

    /// Canonical `"ip:port"` identity of this peer.
    pub fn endpoint(&self) -> &str {
        &self.shared.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// Flip the transport-liveness flag. Called by the connection layer, not
    /// by this crate.
    pub fn set_connected(&self, connected: bool) {
        let previous = self.shared.connected.swap(connected, Ordering::AcqRel);
        if previous != connected {
            tracing::debug!(peer = %self.shared.endpoint, connected, "peer connection state changed");
        }
    }

    // ── Outbound queues ────────────────────────────────────────────────

    /// Queue a full block for delivery. Non-blocking; returns whether the
    /// item was accepted. On rejection the callback has already fired with
    /// the failure.
    pub fn enqueue_block(
        &self,
        block: BlockWithTransactions,
        on_delivery: DeliveryCallback,
    ) -> bool {
        self.enqueue(&self.blocks_tx, "block", block, on_delivery)
    }

    /// Queue a transaction for delivery. Same contract as [`enqueue_block`](Peer::enqueue_block).
    pub fn enqueue_transaction(&self, tx: Transaction, on_delivery: DeliveryCallback) -> bool {
        self.enqueue(&self.transactions_tx, "transaction", tx, on_delivery)
    }

    /// Queue a block announcement for delivery. Same contract as
    /// [`enqueue_block`](Peer::enqueue_block).
    pub fn enqueue_announcement(
        &self,
        announcement: BlockAnnouncement,
        on_delivery: DeliveryCallback,
    ) -> bool {
        self.enqueue(
            &self.announcements_tx,
            "announcement",
            announcement,
            on_delivery,
        )
    }

    fn enqueue<T>(
        &self,
        queue: &mpsc::Sender<OutboundItem<T>>,
        queue_name: &'static str,
        payload: T,
        on_delivery: DeliveryCallback,
    ) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            on_delivery(Err(NetworkError::NotConnected(self.shared.endpoint.clone())));
            return false;
        }

        let item = OutboundItem {
            payload,
            on_delivery,
        };
        match queue.try_send(item) {
            Ok(()) => true,
            Err(TrySendError::Full(item)) => {
                tracing::warn!(
                    peer = %self.shared.endpoint,
                    queue = queue_name,
                    "outbound queue full, rejecting item"
                );
                (item.on_delivery)(Err(NetworkError::QueueFull {
                    peer: self.shared.endpoint.clone(),
                    queue: queue_name,
                }));
                false
            }
            Err(TrySendError::Closed(item)) => {
                (item.on_delivery)(Err(NetworkError::NotConnected(self.shared.endpoint.clone())));
                false
            }
        }
    }

    // ── Pull requests ──────────────────────────────────────────────────

    /// Fetch one block by hash from this peer.
    ///
    /// `Ok(None)` means the peer legitimately does not know the hash;
    /// transport failures and timeouts surface as errors, never as a
    /// default value.
    pub async fn get_block_by_hash(
        &self,
        hash: BlockHash,
    ) -> Result<Option<BlockWithTransactions>, NetworkError> {
        match self.shared.call(PeerRequest::GetBlock { hash }).await? {
            PeerResponse::Block(block) => Ok(block),
            _ => Err(NetworkError::UnexpectedResponse("Block")),
        }
    }

    /// Fetch up to `count` blocks strictly after `after`, in ascending
    /// height order.
    ///
    /// An unknown starting hash yields an empty sequence — a valid
    /// "no more blocks" outcome, not an error.
    pub async fn get_blocks(
        &self,
        after: BlockHash,
        count: u32,
    ) -> Result<Vec<BlockWithTransactions>, NetworkError> {
        match self.shared.call(PeerRequest::GetBlocks { after, count }).await? {
            PeerResponse::Blocks(blocks) => Ok(blocks),
            _ => Err(NetworkError::UnexpectedResponse("Blocks")),
        }
    }

    /// Fetch this peer's known-node list (possibly empty).
    pub async fn get_nodes(&self) -> Result<Vec<PeerAddress>, NetworkError> {
        match self.shared.call(PeerRequest::GetNodes).await? {
            PeerResponse::Nodes(nodes) => Ok(nodes),
            _ => Err(NetworkError::UnexpectedResponse("Nodes")),
        }
    }

    /// Snapshot of this peer's request metrics. The key set is exactly the
    /// configured method names, regardless of call history.
    pub fn request_metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Signal the delivery workers to stop. Items still queued are drained
    /// with a failure callback; subsequent enqueues are rejected. Idempotent.
    pub fn disconnect(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.connected.store(false, Ordering::Release);
        let _ = self.shutdown_tx.send(());
        tracing::info!(peer = %self.shared.endpoint, "peer disconnected, draining queues");
    }
}

/// Spawn the worker task that drains one outbound queue.
///
/// The worker is the only consumer of its queue, so items go to the wire one
/// at a time in enqueue order and callbacks fire in that same order. On
/// shutdown it closes the queue and fails everything still buffered.
fn spawn_delivery_worker<T: Send + 'static>(
    mut queue: mpsc::Receiver<OutboundItem<T>>,
    mut shutdown: broadcast::Receiver<()>,
    shared: Arc<PeerShared>,
    make_request: fn(T) -> PeerRequest,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                item = queue.recv() => match item {
                    Some(item) => deliver(&shared, make_request, item).await,
                    None => break,
                },
                _ = shutdown.recv() => {
                    queue.close();
                    while let Some(item) = queue.recv().await {
                        (item.on_delivery)(Err(NetworkError::NotConnected(
                            shared.endpoint.clone(),
                        )));
                    }
                    break;
                }
            }
        }
        tracing::debug!(peer = %shared.endpoint, "delivery worker stopped");
    });
}

/// Deliver one queued item and invoke its callback with the outcome.
///
/// A failure here only fails this item — the worker loop continues with the
/// next one.
async fn deliver<T>(shared: &PeerShared, make_request: fn(T) -> PeerRequest, item: OutboundItem<T>) {
    if !shared.connected.load(Ordering::Acquire) {
        (item.on_delivery)(Err(NetworkError::NotConnected(shared.endpoint.clone())));
        return;
    }

    let request = make_request(item.payload);
    let method = request.method();
    let outcome = shared.call(request).await.map(|_| ());
    match &outcome {
        Ok(()) => {
            tracing::trace!(peer = %shared.endpoint, %method, "outbound item delivered");
        }
        Err(e) => {
            tracing::warn!(peer = %shared.endpoint, %method, error = %e, "outbound delivery failed");
        }
    }
    (item.on_delivery)(outcome);
}
