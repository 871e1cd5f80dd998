//! gridwide controller library.
//!
//! This crate primarily ships a `controller` binary, but we expose a small
//! library surface to enable integration testing and reuse.

pub mod api;
pub mod callbacks;
pub mod config;
pub mod dispatch;
pub mod registry;
pub mod state;

/// Session that owns announce URLs restored from configuration.
pub const CONFIGURED_SESSION: &str = "configured";
