//! The authoritative registry of currently connected peers.

use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::peer::Peer;

/// Registry of currently connected peers, keyed by canonical `"ip:port"`
/// endpoint.
///
/// Broadcast fan-out works on a snapshot taken at call time, so the pool can
/// be mutated concurrently with an in-progress broadcast without corrupting
/// it. The ordered map keeps snapshot iteration deterministic.
pub struct PeerPool {
    peers: RwLock<BTreeMap<String, Arc<Peer>>>,
}

impl PeerPool {
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert a peer if no peer with that identity exists yet. Returns
    /// whether insertion happened.
    pub fn try_add_peer(&self, peer: Arc<Peer>) -> bool {
        let mut peers = self.peers.write();
        match peers.entry(peer.endpoint().to_string()) {
            Entry::Occupied(_) => {
                tracing::debug!(peer = %peer.endpoint(), "duplicate peer registration rejected");
                false
            }
            Entry::Vacant(slot) => {
                tracing::info!(peer = %peer.endpoint(), "peer added to pool");
                slot.insert(peer);
                true
            }
        }
    }

    /// Remove a peer, signal its delivery workers to stop, and return it so
    /// the caller can observe the drain. No-op if absent.
    pub fn remove_peer(&self, endpoint: &str) -> Option<Arc<Peer>> {
        let removed = self.peers.write().remove(endpoint);
        if let Some(peer) = &removed {
            peer.disconnect();
            tracing::info!(peer = %endpoint, "peer removed from pool");
        }
        removed
    }

    /// Look up a peer by identity.
    pub fn get(&self, endpoint: &str) -> Option<Arc<Peer>> {
        self.peers.read().get(endpoint).cloned()
    }

    /// Snapshot of all peers in deterministic (endpoint-ordered) order, for
    /// broadcast fan-out.
    pub fn snapshot(&self) -> Vec<Arc<Peer>> {
        self.peers.read().values().cloned().collect()
    }

    /// All registered endpoints, ordered.
    pub fn endpoints(&self) -> Vec<String> {
        self.peers.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

impl Default for PeerPool {
    fn default() -> Self {
        Self::new()
    }
}
