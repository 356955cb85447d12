use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

use crate::services::session::{EventStream, RemoteMessage, SessionClient};
use crate::{BridgeError, Result};

/// Guarantees at most one live subscription to the remote session
#[derive(Debug, Clone)]
pub struct SubscriptionSlot {
    permits: Arc<Semaphore>,
}

impl Default for SubscriptionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionSlot {
    /// Slot with a single permit
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Wait for the slot, then open a subscription through `client`.
    ///
    /// The permit is returned to the slot if connecting fails.
    ///
    /// # Errors
    /// Returns `BridgeError::RemoteSession` if the client fails to connect
    pub async fn acquire(&self, client: Arc<dyn SessionClient>) -> Result<SubscriptionHandle> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|err| BridgeError::remote("acquire subscription", err))?;

        let events = client.connect().await?;

        Ok(SubscriptionHandle {
            client,
            events,
            permit: Some(permit),
        })
    }

    /// Number of live handles (0 or 1)
    pub fn live(&self) -> usize {
        1 - self.permits.available_permits().min(1)
    }
}

/// Active link to the remote session.
///
/// Call [`release`](Self::release) to close it. Dropping an unreleased
/// handle frees the slot without disconnecting and logs a warning.
pub struct SubscriptionHandle {
    client: Arc<dyn SessionClient>,
    events: EventStream,
    permit: Option<OwnedSemaphorePermit>,
}

impl SubscriptionHandle {
    /// Next remote message, or `None` once the remote closed the stream
    pub async fn next_event(&mut self) -> Option<RemoteMessage> {
        self.events.next().await
    }

    /// Disconnect from the remote session and free the slot
    ///
    /// # Errors
    /// Returns error if the client fails to disconnect; the slot is freed anyway
    pub async fn release(mut self) -> Result<()> {
        let result = self.client.disconnect().await;
        self.permit.take();
        result
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if self.permit.take().is_some() {
            warn!("subscription handle force-released without disconnect");
        }
    }
}
