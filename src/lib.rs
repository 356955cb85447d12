//! sendspin-mpris - Mirror a remote sendspin playback session onto MPRIS.
//!
//! The bridge keeps a desktop MPRIS player in sync with a playback session it
//! does not own, and relays control calls from desktop controllers back to
//! the session. The main pieces are:
//!
//! - Event adapter turning remote session messages into state deltas
//! - State projector owning the playback state and emitting change signals
//! - Command relay checking capabilities before forwarding controls
//! - Subscription manager reconnecting with backoff and shutting down cleanly
//! - D-Bus fault guard classifying and containing transport faults
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sendspin_mpris::{
//!     Bridge,
//!     config::BridgeConfig,
//!     services::mpris::{MprisServer, ZbusPropertySink},
//!     services::session::JsonLinesClient,
//! };
//!
//! # async fn example() -> sendspin_mpris::Result<()> {
//! let config = BridgeConfig::load(None)?;
//! let connection = MprisServer::connect_session().await?;
//!
//! let client = Arc::new(JsonLinesClient::from_config(&config.session));
//! let sink = Arc::new(ZbusPropertySink::new(connection.clone()));
//! let bridge = Bridge::from_config(&config, client, sink);
//!
//! let server = bridge.export(connection, &config.mpris).await?;
//! bridge.run().await?;
//! server.release().await;
//! # Ok(())
//! # }
//! ```

/// Component wiring.
pub mod bridge;

/// Command-line interface.
pub mod cli;

/// Configuration schema, loading and validation.
pub mod config;

/// Error types and result alias.
pub mod error;

/// Session, MPRIS and subscription services.
pub mod services;

/// Logging setup.
pub mod tracing_config;

pub use bridge::Bridge;
pub use error::{BridgeError, Result};
