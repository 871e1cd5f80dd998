//! # gridwide-id
//!
//! Typed identifiers used on the wire between the controller and its nodes.
//!
//! ## ID Format
//!
//! Every identifier uses a prefixed format: `{prefix}_{ulid}`
//!
//! - `grm_01HV4Z2WQXKJNM8GPQY6VBKC3D` - a controller-side announce path
//! - `rrm_01HV4Z3MXNKPQR9HSTZ7WCLD4E` - a node-side command path
//! - `req_01HV4Z4NYPLTRS0JTUA8XDME5F` - a request correlation id
//!
//! Callback ids double as the last path segment of a callback URL. They are
//! minted fresh for every registration and never reused, so a URL that leaked
//! from an earlier process lifetime stops resolving once the process restarts.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;
