//! Wire protocol for Parlor.
//!
//! This crate defines the "language" that clients and the relay server
//! speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RoomId`],
//!   [`Seat`], etc.) — the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the rest of
//! the server. It doesn't know about connections or rooms — it only
//! knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage/ServerMessage) → Handler
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// `pub use` makes items from submodules available at the crate root.
// Users can write `use parlor_protocol::RoomId` instead of
// `use parlor_protocol::types::RoomId`. This is a cleaner public API.

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{ClientMessage, GameOverReason, RoomId, Seat, ServerMessage};
