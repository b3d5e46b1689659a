//! Configuration Module
//!
//! Configuration loading for the quote sync client.

mod settings;

pub use settings::{ClientConfig, ConfigError, DEFAULT_HOST, FeedSettings, UpstreamSettings};
