use async_trait::async_trait;
use futures::stream::BoxStream;

use super::Command;
use crate::Result;

/// Raw message pushed by the remote session, decoded later by the adapter
pub type RemoteMessage = serde_json::Value;

/// Ordered stream of remote messages for one subscription.
///
/// The stream ending means the remote closed the link.
pub type EventStream = BoxStream<'static, RemoteMessage>;

/// Connection to a remote playback session.
///
/// Implementations own the wire protocol. The bridge only needs an ordered
/// message stream and a way to send commands back.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Open a subscription and return its event stream
    ///
    /// # Errors
    /// Returns `BridgeError::RemoteSession` if the handshake fails
    async fn connect(&self) -> Result<EventStream>;

    /// Close the current subscription
    ///
    /// # Errors
    /// Returns `BridgeError::RemoteSession` if the close could not be sent
    async fn disconnect(&self) -> Result<()>;

    /// Send one control command to the remote session
    ///
    /// # Errors
    /// Returns `BridgeError::RemoteSession` if the command is rejected or
    /// there is no open subscription
    async fn send_command(&self, command: Command) -> Result<()>;
}
