//! Error types for the binding layer.

use parlor_transport::ConnectionId;

/// Errors that can occur while tracking connection-to-room bindings.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection is already bound to a room.
    /// A connection occupies at most one (room, seat) pair at a time,
    /// so a second create/join must be rejected, not re-seated.
    #[error("{0} is already in a room")]
    AlreadyBound(ConnectionId),

    /// The connection is not bound to the room it referenced.
    /// This covers both "never joined anything" and "named a room it
    /// does not occupy" — either way the message must not be relayed.
    #[error("{0} is not a member of this room")]
    NotBound(ConnectionId),
}
