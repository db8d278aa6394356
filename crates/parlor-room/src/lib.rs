//! Room lifecycle management for Parlor.
//!
//! A room is the matchmaking unit: two seats, one shared clock
//! configuration, and a mirror of the most recently reported clock
//! values. The registry owns every live room and is the ONLY way to
//! mutate one, which is what makes the server's check-then-mutate
//! sequences easy to reason about.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates rooms, assigns seats, mirrors clocks
//! - [`Room`] — seats, clocks, and fan-out helpers for one room
//! - [`RoomPhase`] — lifecycle state machine
//! - [`RoomError`] — what can go wrong (exists / not found / full)

mod error;
mod phase;
mod registry;
mod room;

pub use error::RoomError;
pub use phase::RoomPhase;
pub use registry::RoomRegistry;
pub use room::{Occupant, PlayerSender, Room};
