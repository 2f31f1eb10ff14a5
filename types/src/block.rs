//! Block and transaction payloads carried by the dissemination layer.

use serde::{Deserialize, Serialize};

use crate::hash::{BlockHash, TxHash};

/// Header of a propagated block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: BlockHash,
    /// Hash of the preceding block in the chain.
    pub previous: BlockHash,
    pub height: u64,
    /// Unix timestamp (seconds) at which the block was produced.
    pub timestamp: u64,
}

/// A transaction as carried on the wire.
///
/// The dissemination layer treats the body as opaque bytes; decoding and
/// validation happen in the transaction pipeline, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: TxHash,
    pub body: Vec<u8>,
}

/// A full block together with its transaction bodies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWithTransactions {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl BlockWithTransactions {
    pub fn hash(&self) -> BlockHash {
        self.header.hash
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }
}
