//! Wire messages for cinder node-to-node communication.
//!
//! Defines the request/response envelope exchanged with a remote peer over
//! the transport seam, plus the peer address and block announcement types.

use cinder_types::{BlockHash, BlockWithTransactions, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A peer's network address. The rendered `ip:port` form is the canonical
/// peer identity used as the pool key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddress {
    pub ip: String,
    pub port: u16,
}

impl PeerAddress {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Canonical `"ip:port"` identity key.
    pub fn key(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Lightweight notification that a new block exists, distinct from sending
/// the full block body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAnnouncement {
    pub hash: BlockHash,
    pub height: u64,
}

/// Logical RPC method names, used for per-peer request metrics and for
/// dispatch by transport implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    PushBlock,
    PushTransaction,
    Announce,
    GetBlock,
    GetBlocks,
    GetNodes,
}

impl RpcMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PushBlock => "PushBlock",
            Self::PushTransaction => "PushTransaction",
            Self::Announce => "Announce",
            Self::GetBlock => "GetBlock",
            Self::GetBlocks => "GetBlocks",
            Self::GetNodes => "GetNodes",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request envelope sent to a remote peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerRequest {
    /// Push a full block body.
    PushBlock(BlockWithTransactions),
    /// Push a pending transaction.
    PushTransaction(Transaction),
    /// Announce that a new block exists.
    Announce(BlockAnnouncement),
    /// Fetch one block by hash.
    GetBlock { hash: BlockHash },
    /// Fetch up to `count` blocks strictly after `after`, ascending by height.
    GetBlocks { after: BlockHash, count: u32 },
    /// Fetch the peer's known-node list.
    GetNodes,
}

impl PeerRequest {
    /// The logical method name this request is recorded under.
    pub fn method(&self) -> RpcMethod {
        match self {
            Self::PushBlock(_) => RpcMethod::PushBlock,
            Self::PushTransaction(_) => RpcMethod::PushTransaction,
            Self::Announce(_) => RpcMethod::Announce,
            Self::GetBlock { .. } => RpcMethod::GetBlock,
            Self::GetBlocks { .. } => RpcMethod::GetBlocks,
            Self::GetNodes => RpcMethod::GetNodes,
        }
    }
}

/// Response envelope received from a remote peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerResponse {
    /// Push accepted.
    Ack,
    /// Result of `GetBlock` — `None` when the peer does not know the hash.
    Block(Option<BlockWithTransactions>),
    /// Result of `GetBlocks` — empty when the starting hash is unknown.
    Blocks(Vec<BlockWithTransactions>),
    /// Result of `GetNodes`.
    Nodes(Vec<PeerAddress>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_types::{BlockHeader, TxHash};

    #[test]
    fn request_method_mapping() {
        let block = BlockWithTransactions {
            header: BlockHeader {
                hash: BlockHash::new([1u8; 32]),
                previous: BlockHash::ZERO,
                height: 1,
                timestamp: 0,
            },
            transactions: Vec::new(),
        };
        let tx = Transaction {
            hash: TxHash::new([2u8; 32]),
            body: Vec::new(),
        };

        assert_eq!(PeerRequest::PushBlock(block).method(), RpcMethod::PushBlock);
        assert_eq!(
            PeerRequest::PushTransaction(tx).method(),
            RpcMethod::PushTransaction
        );
        assert_eq!(
            PeerRequest::Announce(BlockAnnouncement {
                hash: BlockHash::ZERO,
                height: 0,
            })
            .method(),
            RpcMethod::Announce
        );
        assert_eq!(
            PeerRequest::GetBlock {
                hash: BlockHash::ZERO
            }
            .method(),
            RpcMethod::GetBlock
        );
        assert_eq!(
            PeerRequest::GetBlocks {
                after: BlockHash::ZERO,
                count: 5,
            }
            .method(),
            RpcMethod::GetBlocks
        );
        assert_eq!(PeerRequest::GetNodes.method(), RpcMethod::GetNodes);
    }

    #[test]
    fn peer_address_key_and_display_agree() {
        let addr = PeerAddress::new("10.0.0.1", 7075);
        assert_eq!(addr.key(), "10.0.0.1:7075");
        assert_eq!(addr.to_string(), addr.key());
    }

    #[test]
    fn request_envelope_survives_bincode() {
        let request = PeerRequest::GetBlocks {
            after: BlockHash::new([9u8; 32]),
            count: 16,
        };
        let bytes = bincode::serialize(&request).unwrap();
        let decoded: PeerRequest = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, request);
    }
}
