use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use zbus::Connection;

use crate::Result;
use crate::config::{BridgeConfig, MprisConfig};
use crate::services::mpris::{
    CommandRelay, DbusFaultGuard, MprisServer, MprisStateProjector, PropertySink,
};
use crate::services::session::SessionClient;
use crate::services::subscription::{SubscriptionManager, SubscriptionSettings};

/// The wired bridge: one projector, relay and subscription manager sharing a
/// fault guard and a shutdown token.
pub struct Bridge {
    projector: Arc<MprisStateProjector>,
    relay: Arc<CommandRelay>,
    manager: SubscriptionManager,
    guard: DbusFaultGuard,
    shutdown: CancellationToken,
}

impl Bridge {
    /// Wire the components around `client` and `sink`
    pub fn new(
        client: Arc<dyn SessionClient>,
        sink: Arc<dyn PropertySink>,
        settings: SubscriptionSettings,
    ) -> Self {
        let guard = DbusFaultGuard::new();
        let projector = Arc::new(MprisStateProjector::new(sink, guard.clone()));
        let relay = Arc::new(CommandRelay::new(
            Arc::clone(&client),
            Arc::clone(&projector),
        ));
        let manager = SubscriptionManager::new(client, Arc::clone(&projector), settings);

        Self {
            projector,
            relay,
            manager,
            guard,
            shutdown: CancellationToken::new(),
        }
    }

    /// Wire the components with timings from `config`
    pub fn from_config(
        config: &BridgeConfig,
        client: Arc<dyn SessionClient>,
        sink: Arc<dyn PropertySink>,
    ) -> Self {
        Self::new(client, sink, SubscriptionSettings::from(config))
    }

    /// Export the MPRIS objects on `connection` and claim the bus name
    ///
    /// # Errors
    /// Returns `BridgeError::Startup` if exporting fails or the name is taken
    pub async fn export(&self, connection: Connection, config: &MprisConfig) -> Result<MprisServer> {
        MprisServer::export(
            connection,
            config,
            Arc::clone(&self.projector),
            Arc::clone(&self.relay),
            self.guard.clone(),
            self.shutdown.clone(),
        )
        .await
    }

    /// Mirror the remote session until shutdown is requested
    ///
    /// # Errors
    /// Returns `BridgeError::Startup` if the initial connection budget runs out
    pub async fn run(&self) -> Result<()> {
        self.manager.run(self.shutdown.clone()).await
    }

    /// Request shutdown; `run` returns once the link is released
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token cancelled when shutdown is requested
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Playback state owner
    pub fn projector(&self) -> &Arc<MprisStateProjector> {
        &self.projector
    }

    /// Command forwarder
    pub fn relay(&self) -> &Arc<CommandRelay> {
        &self.relay
    }

    /// Link lifecycle driver
    pub fn manager(&self) -> &SubscriptionManager {
        &self.manager
    }

    /// Fault guard shared by all D-Bus edges
    pub fn guard(&self) -> &DbusFaultGuard {
        &self.guard
    }
}
