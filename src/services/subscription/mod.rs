/// Reconnect delay schedule
pub mod backoff;
/// Single-permit subscription slot and its handle
pub mod handle;
/// Link lifecycle driver
pub mod manager;
/// Link state machine
pub mod state;

#[cfg(test)]
mod tests;

pub use backoff::Backoff;
pub use handle::{SubscriptionHandle, SubscriptionSlot};
pub use manager::{SubscriptionManager, SubscriptionSettings};
pub use state::LinkState;
