/// Event normalization into projector deltas
pub mod adapter;
/// Remote session collaborator contract
pub mod client;
/// Control commands sent to the remote session
pub mod command;
/// Remote event schema
pub mod events;
/// Newline-delimited JSON session client
pub mod json_lines;

#[cfg(test)]
mod tests;

pub use adapter::{Disposition, SessionEventAdapter};
pub use client::{EventStream, RemoteMessage, SessionClient};
pub use command::Command;
pub use events::{EventDecodeError, RemoteCommand, RemotePlaybackStatus, SessionEvent};
pub use json_lines::JsonLinesClient;
