//! # gridwide-protocol
//!
//! Wire types for the region management protocol.
//!
//! ## Transport
//!
//! Every exchange is a single HTTP POST whose body is one JSON object. The
//! object always carries a `Method` field naming the operation; the remaining
//! fields are the operation's parameters. Responses are empty: the protocol has
//! no application-level acknowledgement.
//!
//! ## Directions
//!
//! - [`Announce`] flows from a node to the controller's announce endpoint
//!   (`RegionOnline`, `RegionProvided`, `RegionOffline`).
//! - [`Command`] flows from the controller to a node's callback endpoint
//!   (`Shutdown`, `Start`, `ChangeStartupStatus`, `StartScripts`,
//!   `StopScripts`, `LoadOAR`).
//!
//! Both implement [`Envelope`], whose [`Envelope::decode`] separates a
//! malformed body from a well-formed body naming a method this side does not
//! understand. Ingress handlers drop both, but log them differently.

mod announce;
mod archive;
mod command;
mod envelope;
mod error;
mod region;

pub use announce::Announce;
pub use archive::{ArchiveOptions, ArchiveUpload};
pub use command::{Command, ShutdownDirective, ShutdownKind};
pub use envelope::{Envelope, METHOD_FIELD};
pub use error::ProtocolError;
pub use region::RegionDescriptor;
