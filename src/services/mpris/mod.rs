/// D-Bus reply errors with stable names
pub mod error;
/// Transport fault classification and the guard around D-Bus calls
pub mod fault;
/// zbus objects implementing the MPRIS interfaces
pub mod interface;
/// PlaybackState to D-Bus value marshalling
pub mod metadata;
/// Authoritative playback state and change announcement
pub mod projector;
/// Capability-checked command forwarding
pub mod relay;
/// Object export and bus name ownership
pub mod server;
/// Change-signal collaborator contract
pub mod sink;
/// Playback state model
pub mod types;
/// MPRIS utility functions
pub mod utils;


pub use error::*;
pub use fault::{DbusFaultGuard, FaultKind, FaultRecord};
pub use interface::{MediaPlayer2Player, MediaPlayer2Root};
pub use projector::MprisStateProjector;
pub use relay::CommandRelay;
pub use server::MprisServer;
pub use sink::{MPRIS_PATH, PLAYER_INTERFACE, PropertySink, ZbusPropertySink};
pub use types::*;
