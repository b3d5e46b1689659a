//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the synchronization services and the port
//! interfaces that define how they reach the upstream quote service.

/// Port interfaces for the snapshot endpoint and the push channel.
pub mod ports;

/// Snapshot loading, live feed reconnection and the board session.
pub mod services;
