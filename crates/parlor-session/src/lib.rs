//! Connection-to-room binding for Parlor.
//!
//! This crate answers one question for the rest of the server: WHICH
//! room and seat does a given connection belong to? The answer gates
//! everything after matchmaking:
//!
//! 1. **Routing** — a relayed move/clock/signal message names a room;
//!    the binding proves the sender actually occupies it.
//! 2. **Stale-join rejection** — a connection already bound to a room
//!    can't create or join another one.
//! 3. **Disconnect cleanup** — when a socket drops, the binding tells
//!    us which seat to vacate.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← owns seats and clocks; keyed by RoomId
//!     ↕
//! Binding Layer (this crate)  ← maps ConnectionId → (RoomId, Seat)
//!     ↕
//! Transport Layer (below)  ← issues ConnectionId per socket
//! ```

mod bindings;
mod error;

pub use bindings::{Binding, Bindings};
pub use error::SessionError;
