//! Nullable transport — records requests and answers them from memory.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use cinder_messages::{PeerAddress, PeerRequest, PeerResponse, RpcMethod};
use cinder_network::{PeerTransport, TransportError};
use cinder_types::BlockWithTransactions;

/// A test transport that answers peer requests from in-memory data instead
/// of the wire.
///
/// Push requests are acknowledged; pull requests are served from a seeded
/// chain and node list. Every decoded request is recorded for assertions.
/// A scripted fault fails all subsequent calls; a scripted delay makes each
/// call sleep first, for exercising timeouts and queue backpressure.
pub struct NullTransport {
    /// Seeded chain in ascending height order, genesis first.
    chain: Vec<BlockWithTransactions>,
    nodes: Mutex<Vec<PeerAddress>>,
    fault: Mutex<Option<TransportError>>,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<PeerRequest>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::with_chain(Vec::new())
    }

    /// A transport whose peer knows the given chain (ascending by height).
    pub fn with_chain(chain: Vec<BlockWithTransactions>) -> Self {
        Self {
            chain,
            nodes: Mutex::new(Vec::new()),
            fault: Mutex::new(None),
            delay: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set the node list returned for `GetNodes`.
    pub fn set_nodes(&self, nodes: Vec<PeerAddress>) {
        *self.nodes.lock() = nodes;
    }

    /// Script a failure for all subsequent calls (`None` clears it).
    pub fn set_fault(&self, fault: Option<TransportError>) {
        *self.fault.lock() = fault;
    }

    /// Script a per-call delay (`None` clears it).
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// All requests decoded so far (for assertions).
    pub fn requests(&self) -> Vec<PeerRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests decoded so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn respond(&self, request: &PeerRequest) -> PeerResponse {
        match request {
            PeerRequest::PushBlock(_)
            | PeerRequest::PushTransaction(_)
            | PeerRequest::Announce(_) => PeerResponse::Ack,
            PeerRequest::GetBlock { hash } => {
                PeerResponse::Block(self.chain.iter().find(|b| b.hash() == *hash).cloned())
            }
            PeerRequest::GetBlocks { after, count } => {
                let Some(position) = self.chain.iter().position(|b| b.hash() == *after) else {
                    return PeerResponse::Blocks(Vec::new());
                };
                PeerResponse::Blocks(
                    self.chain[position + 1..]
                        .iter()
                        .take(*count as usize)
                        .cloned()
                        .collect(),
                )
            }
            PeerRequest::GetNodes => PeerResponse::Nodes(self.nodes.lock().clone()),
        }
    }
}

impl Default for NullTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerTransport for NullTransport {
    async fn send(&self, _method: RpcMethod, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let request: PeerRequest = bincode::deserialize(&payload)
            .map_err(|e| TransportError::CallFailed(format!("undecodable request envelope: {e}")))?;
        self.requests.lock().push(request.clone());

        let fault = self.fault.lock().clone();
        if let Some(fault) = fault {
            return Err(fault);
        }

        let response = self.respond(&request);
        bincode::serialize(&response)
            .map_err(|e| TransportError::CallFailed(format!("unencodable response envelope: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_types::{BlockHash, BlockHeader};

    fn hash(n: u8) -> BlockHash {
        let mut bytes = [0u8; 32];
        bytes[0] = n;
        BlockHash::new(bytes)
    }

    fn block(height: u64) -> BlockWithTransactions {
        BlockWithTransactions {
            header: BlockHeader {
                hash: hash(height as u8),
                previous: if height == 1 {
                    BlockHash::ZERO
                } else {
                    hash(height as u8 - 1)
                },
                height,
                timestamp: 0,
            },
            transactions: Vec::new(),
        }
    }

    async fn call(transport: &NullTransport, request: PeerRequest) -> PeerResponse {
        let payload = bincode::serialize(&request).unwrap();
        let bytes = transport.send(request.method(), payload).await.unwrap();
        bincode::deserialize(&bytes).unwrap()
    }

    #[tokio::test]
    async fn serves_blocks_after_a_known_hash() {
        let transport = NullTransport::with_chain((1..=4).map(block).collect());

        let response = call(
            &transport,
            PeerRequest::GetBlocks {
                after: hash(1),
                count: 2,
            },
        )
        .await;
        let PeerResponse::Blocks(blocks) = response else {
            panic!("expected Blocks response");
        };
        let heights: Vec<u64> = blocks.iter().map(|b| b.height()).collect();
        assert_eq!(heights, vec![2, 3]);
    }

    #[tokio::test]
    async fn unknown_start_hash_yields_empty_blocks() {
        let transport = NullTransport::with_chain((1..=4).map(block).collect());

        let response = call(
            &transport,
            PeerRequest::GetBlocks {
                after: hash(99),
                count: 2,
            },
        )
        .await;
        assert_eq!(response, PeerResponse::Blocks(Vec::new()));
    }

    #[tokio::test]
    async fn scripted_fault_fails_the_call_after_recording_it() {
        let transport = NullTransport::new();
        transport.set_fault(Some(TransportError::ConnectionLost("test".into())));

        let payload = bincode::serialize(&PeerRequest::GetNodes).unwrap();
        let result = transport.send(RpcMethod::GetNodes, payload).await;
        assert!(result.is_err());
        assert_eq!(transport.request_count(), 1);
    }
}
