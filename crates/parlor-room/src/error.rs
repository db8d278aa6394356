//! Error types for the room layer.

use parlor_protocol::RoomId;

/// Errors that can occur during room operations.
///
/// Every variant carries the room id so the `Display` string (which is
/// what clients see in a `room-error` notification) names the room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A room with this id already exists — `create` must not clobber it.
    #[error("room {0} already exists")]
    Exists(RoomId),

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Both seats are bound — a third join must fail observably.
    #[error("room {0} is full")]
    Full(RoomId),
}
