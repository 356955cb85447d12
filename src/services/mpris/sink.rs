use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use zbus::{Connection, names::BusName};

use super::{MprisProperty, PlaybackState, metadata, utils};

/// Object path of the exported MPRIS player
pub const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";

/// Name of the MPRIS player interface
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Outbound half of the D-Bus collaborator: change notifications.
///
/// Implementations only marshal; the projector decides what changed.
#[async_trait]
pub trait PropertySink: Send + Sync {
    /// Announce `changed` properties of `state` in a single signal
    async fn properties_changed(
        &self,
        state: &PlaybackState,
        changed: &[MprisProperty],
    ) -> zbus::Result<()>;

    /// Emit `Seeked` after a position discontinuity
    async fn seeked(&self, position: Duration) -> zbus::Result<()>;
}

/// Emits MPRIS change signals on a zbus connection
#[derive(Debug, Clone)]
pub struct ZbusPropertySink {
    connection: Connection,
}

impl ZbusPropertySink {
    /// Create a sink emitting on `connection`
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl PropertySink for ZbusPropertySink {
    async fn properties_changed(
        &self,
        state: &PlaybackState,
        changed: &[MprisProperty],
    ) -> zbus::Result<()> {
        let mut values = HashMap::with_capacity(changed.len());
        for property in changed {
            values.insert(property.name(), metadata::property_value(state, *property)?);
        }
        let invalidated: Vec<&str> = Vec::new();

        self.connection
            .emit_signal(
                None::<BusName<'_>>,
                MPRIS_PATH,
                PROPERTIES_INTERFACE,
                "PropertiesChanged",
                &(PLAYER_INTERFACE, values, invalidated),
            )
            .await
    }

    async fn seeked(&self, position: Duration) -> zbus::Result<()> {
        self.connection
            .emit_signal(
                None::<BusName<'_>>,
                MPRIS_PATH,
                PLAYER_INTERFACE,
                "Seeked",
                &utils::to_mpris_micros(position),
            )
            .await
    }
}
