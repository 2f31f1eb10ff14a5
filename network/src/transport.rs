//! The transport seam — how the dissemination layer reaches the wire.

use async_trait::async_trait;

use cinder_messages::RpcMethod;

use crate::error::TransportError;

/// Interface to the underlying wire transport for one remote peer.
///
/// Implementations own connection management, framing, and authentication.
/// The dissemination layer hands over a serialized [`cinder_messages::PeerRequest`]
/// envelope and expects the serialized [`cinder_messages::PeerResponse`]
/// envelope (or a transport failure) back. The method name accompanies the
/// payload so transports can dispatch without decoding it.
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    async fn send(&self, method: RpcMethod, payload: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}
