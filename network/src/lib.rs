//! Outbound dissemination layer for the cinder node.
//!
//! Propagates blocks, transactions, and block announcements to the set of
//! connected peers, and serves pull-style requests against a single named
//! peer. Each peer owns three bounded outbound queues with one delivery
//! worker apiece, so a slow or unresponsive peer only delays its own
//! deliveries — never the enqueuing caller, never other peers.

pub mod config;
pub mod dissemination;
pub mod error;
pub mod metrics;
pub mod peer;
pub mod pool;
pub mod transport;

pub use config::NetworkConfig;
pub use dissemination::{BroadcastReport, Disseminator};
pub use error::{NetworkError, TransportError};
pub use metrics::{MethodMetrics, MetricsSnapshot, MetricsTracker};
pub use peer::{DeliveryCallback, Peer};
pub use pool::PeerPool;
pub use transport::PeerTransport;
