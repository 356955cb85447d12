use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use zbus::Connection;

use super::{
    CommandRelay, DbusFaultGuard, MPRIS_PATH, MediaPlayer2Player, MediaPlayer2Root,
    MprisStateProjector, fault,
};
use crate::config::MprisConfig;
use crate::{BridgeError, Result};

/// MPRIS objects exported on a D-Bus connection under a well-known name
#[derive(Debug, Clone)]
pub struct MprisServer {
    connection: Connection,
    bus_name: String,
}

impl MprisServer {
    /// Open the session bus connection the server and sink share
    ///
    /// # Errors
    /// Returns `BridgeError::Startup` if the session bus is unreachable
    pub async fn connect_session() -> Result<Connection> {
        Connection::session()
            .await
            .map_err(|err| startup_fault("connect to session bus", &err))
    }

    /// Export the root and player objects, then claim the bus name.
    ///
    /// Objects are exported before the name is requested so controllers that
    /// react to the name appearing find a complete player.
    ///
    /// # Errors
    /// Returns `BridgeError::Startup` if exporting fails or the name is taken
    #[instrument(skip_all, fields(bus_name = %config.bus_name()))]
    pub async fn export(
        connection: Connection,
        config: &MprisConfig,
        projector: Arc<MprisStateProjector>,
        relay: Arc<CommandRelay>,
        guard: DbusFaultGuard,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let object_server = connection.object_server();

        let root = MediaPlayer2Root::new(
            config.identity().to_string(),
            config.desktop_entry.clone(),
            shutdown,
        );
        object_server
            .at(MPRIS_PATH, root)
            .await
            .map_err(|err| startup_fault("export org.mpris.MediaPlayer2", &err))?;

        let player = MediaPlayer2Player::new(projector, relay, guard);
        object_server
            .at(MPRIS_PATH, player)
            .await
            .map_err(|err| startup_fault("export org.mpris.MediaPlayer2.Player", &err))?;

        let bus_name = config.bus_name();
        connection
            .request_name(bus_name.as_str())
            .await
            .map_err(|err| startup_fault("acquire bus name", &err))?;

        info!("MPRIS player exported");

        Ok(Self {
            connection,
            bus_name,
        })
    }

    /// Well-known name owned by this server
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Give the well-known name back to the bus
    pub async fn release(&self) {
        match self.connection.release_name(self.bus_name.as_str()).await {
            Ok(_) => info!(bus_name = %self.bus_name, "released MPRIS bus name"),
            Err(err) => debug!(bus_name = %self.bus_name, error = %err, "failed to release bus name"),
        }
    }
}

fn startup_fault(operation: &str, error: &zbus::Error) -> BridgeError {
    BridgeError::Startup(fault::dbus_fault(operation, error).to_string())
}
