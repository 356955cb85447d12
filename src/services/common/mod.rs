//! Common utilities and abstractions for services

/// Single-writer, multi-reader state cells
pub mod property;

pub use property::Property;
