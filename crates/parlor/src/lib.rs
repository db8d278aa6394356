//! # Parlor
//!
//! A session/relay server that pairs two remote players into a shared
//! room for a turn-based board game plus a live audio/video call.
//!
//! The server holds no game rules and no media data. It does exactly
//! three things:
//!
//! 1. **Matchmaking** — tracks rooms, assigns seats (white/black),
//!    rejects duplicate creates and over-capacity joins.
//! 2. **Relay** — forwards opaque payloads (moves, clock snapshots,
//!    call-signaling blobs) to the other member of the sender's room.
//! 3. **Lifecycle** — broadcasts resignations and rematches, and tells
//!    the remaining player when their opponent's connection drops.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ParlorError> {
//!     let server = ParlorServerBuilder::new()
//!         .bind("0.0.0.0:3000")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::ParlorError;
pub use server::{ParlorServer, ParlorServerBuilder};

/// One-stop imports for server binaries and tests.
pub mod prelude {
    pub use crate::{ParlorError, ParlorServer, ParlorServerBuilder};
    pub use parlor_protocol::{
        ClientMessage, Codec, GameOverReason, JsonCodec, RoomId, Seat,
        ServerMessage,
    };
    pub use parlor_room::{RoomPhase, RoomRegistry};
    pub use parlor_session::Bindings;
    pub use parlor_transport::ConnectionId;
}
