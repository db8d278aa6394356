//! The binding table: tracks which connection sits in which room.
//!
//! # Concurrency note
//!
//! `Bindings` is NOT thread-safe by itself — it uses a plain `HashMap`,
//! not a concurrent one. This is intentional: the table is wrapped in a
//! single mutex at the server level, and every check-then-mutate runs
//! under that one guard. Keeping this type simple avoids hidden locking
//! overhead and keeps the atomicity story in exactly one place.

use std::collections::HashMap;

use parlor_protocol::{RoomId, Seat};
use parlor_transport::ConnectionId;

use crate::SessionError;

/// Where a connection currently sits: one room, one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The room the connection occupies.
    pub room: RoomId,
    /// The seat it holds there, fixed for the life of the binding.
    pub seat: Seat,
}

/// Tracks every bound connection on the server.
///
/// Think of this as the routing table: matchmaking writes an entry when
/// a seat is assigned, every relay looks its sender up here, and the
/// disconnect path removes the entry so later lookups correctly fail.
#[derive(Debug, Default)]
pub struct Bindings {
    /// All live bindings, keyed by connection.
    ///
    /// `ConnectionId` is the key because a connection can occupy at
    /// most ONE (room, seat) pair at a time — the map shape itself
    /// enforces the invariant.
    map: HashMap<ConnectionId, Binding>,
}

impl Bindings {
    /// Creates a new, empty binding table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a connection to a (room, seat) pair.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyBound`] if the connection already
    /// holds a binding — the existing entry is left untouched.
    pub fn bind(
        &mut self,
        connection: ConnectionId,
        room: RoomId,
        seat: Seat,
    ) -> Result<(), SessionError> {
        if self.map.contains_key(&connection) {
            return Err(SessionError::AlreadyBound(connection));
        }
        tracing::debug!(%connection, %room, %seat, "connection bound");
        self.map.insert(connection, Binding { room, seat });
        Ok(())
    }

    /// Removes a connection's binding, returning it if one existed.
    ///
    /// Called on disconnect. Unknown connections are fine — a socket
    /// that dropped before ever joining a room has nothing to remove.
    pub fn unbind(&mut self, connection: ConnectionId) -> Option<Binding> {
        let binding = self.map.remove(&connection);
        if let Some(b) = &binding {
            tracing::debug!(%connection, room = %b.room, "connection unbound");
        }
        binding
    }

    /// Returns the connection's binding, if any.
    pub fn get(&self, connection: ConnectionId) -> Option<&Binding> {
        self.map.get(&connection)
    }

    /// Returns `true` if the connection holds any binding.
    pub fn is_bound(&self, connection: ConnectionId) -> bool {
        self.map.contains_key(&connection)
    }

    /// The relay guard: resolves a connection's binding AND verifies it
    /// names the given room.
    ///
    /// Every relayed message carries a room id chosen by the sender.
    /// Trusting it blindly would let any connection inject moves into
    /// any room, so the relay calls this first.
    ///
    /// # Errors
    /// Returns [`SessionError::NotBound`] if the connection has no
    /// binding or is bound to a different room.
    pub fn resolve(
        &self,
        connection: ConnectionId,
        room: &RoomId,
    ) -> Result<&Binding, SessionError> {
        match self.map.get(&connection) {
            Some(binding) if binding.room == *room => Ok(binding),
            _ => Err(SessionError::NotBound(connection)),
        }
    }

    /// Returns the number of live bindings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no connections are bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id)
    }

    #[test]
    fn test_bind_and_get() {
        let mut bindings = Bindings::new();
        bindings
            .bind(conn(1), room("AB12CD"), Seat::White)
            .unwrap();

        let b = bindings.get(conn(1)).unwrap();
        assert_eq!(b.room, room("AB12CD"));
        assert_eq!(b.seat, Seat::White);
    }

    #[test]
    fn test_bind_twice_fails() {
        let mut bindings = Bindings::new();
        bindings
            .bind(conn(1), room("AB12CD"), Seat::White)
            .unwrap();

        // Even binding to a DIFFERENT room must fail — one room per
        // connection.
        let err = bindings
            .bind(conn(1), room("ZZ99ZZ"), Seat::Black)
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadyBound(_)));

        // The original binding survives.
        assert_eq!(bindings.get(conn(1)).unwrap().room, room("AB12CD"));
    }

    #[test]
    fn test_unbind_returns_binding() {
        let mut bindings = Bindings::new();
        bindings
            .bind(conn(1), room("AB12CD"), Seat::Black)
            .unwrap();

        let b = bindings.unbind(conn(1)).unwrap();
        assert_eq!(b.seat, Seat::Black);
        assert!(!bindings.is_bound(conn(1)));

        // A second unbind finds nothing.
        assert!(bindings.unbind(conn(1)).is_none());
    }

    #[test]
    fn test_unbind_unknown_connection_is_none() {
        let mut bindings = Bindings::new();
        assert!(bindings.unbind(conn(42)).is_none());
    }

    #[test]
    fn test_resolve_success() {
        let mut bindings = Bindings::new();
        bindings
            .bind(conn(1), room("AB12CD"), Seat::White)
            .unwrap();

        let b = bindings.resolve(conn(1), &room("AB12CD")).unwrap();
        assert_eq!(b.seat, Seat::White);
    }

    #[test]
    fn test_resolve_unbound_connection_fails() {
        let bindings = Bindings::new();
        let err = bindings.resolve(conn(1), &room("AB12CD")).unwrap_err();
        assert!(matches!(err, SessionError::NotBound(_)));
    }

    #[test]
    fn test_resolve_wrong_room_fails() {
        // The sender IS bound, but named a room it doesn't occupy —
        // the relay must refuse to forward.
        let mut bindings = Bindings::new();
        bindings
            .bind(conn(1), room("AB12CD"), Seat::White)
            .unwrap();

        let err = bindings.resolve(conn(1), &room("ZZ99ZZ")).unwrap_err();
        assert!(matches!(err, SessionError::NotBound(_)));
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut bindings = Bindings::new();
        assert!(bindings.is_empty());

        bindings
            .bind(conn(1), room("AB12CD"), Seat::White)
            .unwrap();
        bindings
            .bind(conn(2), room("AB12CD"), Seat::Black)
            .unwrap();
        assert_eq!(bindings.len(), 2);

        bindings.unbind(conn(1));
        assert_eq!(bindings.len(), 1);
    }
}
