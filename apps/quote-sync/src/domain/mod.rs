//! Domain Layer - Quote types and display state.
//!
//! This layer holds the quote records exchanged with upstream and the
//! shared display cell. Nothing here performs I/O.

/// Quote records, quote lists and the requested symbol count.
pub mod quotes;

/// Shared display state written by the loader and the live feed.
pub mod display;
