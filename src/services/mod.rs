/// Shared service building blocks
pub mod common;
/// MPRIS projection, command relay and D-Bus fault handling
pub mod mpris;
/// Remote session collaborator contract and event normalization
pub mod session;
/// Remote link lifecycle and reconnection
pub mod subscription;

pub use mpris::{CommandRelay, DbusFaultGuard, MprisStateProjector};
pub use session::{SessionClient, SessionEventAdapter};
pub use subscription::{LinkState, SubscriptionManager};
