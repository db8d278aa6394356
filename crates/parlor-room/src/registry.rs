//! The room registry: owns every live room.
//!
//! # Concurrency note
//!
//! `RoomRegistry` is NOT thread-safe by itself — it uses a plain
//! `HashMap`, not a concurrent one. This is intentional: the registry
//! is wrapped in a single `tokio::sync::Mutex` at the server level, so
//! every check-then-mutate below (create's "unused id?" check, join's
//! capacity check) is atomic under that one guard. Two near-simultaneous
//! joins against the same room cannot both succeed.
//!
//! # Retention
//!
//! Rooms are never destroyed — once created, a room persists for the
//! life of the process, even after both participants leave. See
//! DESIGN.md for the open question on eviction.

use std::collections::HashMap;

use parlor_protocol::{RoomId, Seat};
use parlor_transport::ConnectionId;

use crate::room::Occupant;
use crate::{PlayerSender, Room, RoomError, RoomPhase};

/// Manages all live rooms, keyed by id.
///
/// This is the single source of truth for seat assignment and the
/// clock mirrors. All mutation goes through its exclusive operations.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room and seats the creator at white.
    ///
    /// # Errors
    /// Returns [`RoomError::Exists`] if the id is already taken — the
    /// existing room is left untouched.
    pub fn create(
        &mut self,
        id: RoomId,
        clock_minutes: u32,
        creator_name: String,
        connection: ConnectionId,
        sender: PlayerSender,
    ) -> Result<&Room, RoomError> {
        if self.rooms.contains_key(&id) {
            return Err(RoomError::Exists(id));
        }

        let mut room = Room::new(id.clone(), clock_minutes);
        room.bind_seat(
            Seat::White,
            Occupant {
                connection,
                name: creator_name,
                sender,
            },
        );
        room.advance_phase(RoomPhase::AwaitingOpponent);

        tracing::info!(
            room = %id,
            clock_minutes,
            %connection,
            "room created"
        );

        self.rooms.insert(id.clone(), room);

        // `expect` is safe here — the entry was inserted on the line
        // above and nothing can remove it in between.
        Ok(self.rooms.get(&id).expect("just inserted"))
    }

    /// Seats a joiner in the first free seat (white-first order).
    ///
    /// Returns the assigned seat along with the room, so the caller can
    /// compose the joiner's session-init and the opponent-joined
    /// notification.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] — no room with this id was ever created.
    /// - [`RoomError::Full`] — both seats are already bound.
    pub fn join(
        &mut self,
        id: &RoomId,
        name: String,
        connection: ConnectionId,
        sender: PlayerSender,
    ) -> Result<(Seat, &Room), RoomError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;

        let seat = room
            .first_free_seat()
            .ok_or_else(|| RoomError::Full(id.clone()))?;

        room.bind_seat(
            seat,
            Occupant {
                connection,
                name,
                sender,
            },
        );
        // Only fires for the second occupant of a waiting room; a
        // reclaimed seat in an Active/Concluded room leaves the phase
        // alone.
        room.advance_phase(RoomPhase::Active);

        tracing::info!(
            room = %id,
            %seat,
            %connection,
            occupants = room.occupant_count(),
            "player joined"
        );

        Ok((seat, &*room))
    }

    /// Returns a room by id.
    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Overwrites a room's mirrored clock values.
    ///
    /// Idempotent: replaying the same snapshot yields the same stored
    /// state. The server never validates plausibility — the clocks are
    /// client-authoritative.
    ///
    /// # Errors
    /// Returns [`RoomError::NotFound`] if the room doesn't exist.
    pub fn sync_clocks(
        &mut self,
        id: &RoomId,
        white_seconds: u64,
        black_seconds: u64,
    ) -> Result<(), RoomError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        room.set_clocks(white_seconds, black_seconds);
        Ok(())
    }

    /// Resets both clock mirrors to `clock_minutes * 60` and performs
    /// the rematch back-edge (`Concluded → Active`) when legal.
    ///
    /// Returns the room's `clock_minutes` so the caller can compose the
    /// rematch-start broadcast. Seats and colors are untouched.
    ///
    /// # Errors
    /// Returns [`RoomError::NotFound`] if the room doesn't exist.
    pub fn reset_clock(&mut self, id: &RoomId) -> Result<u32, RoomError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        room.reset_clocks();
        room.advance_phase(RoomPhase::Active);
        tracing::info!(room = %id, "clocks reset for rematch");
        Ok(room.clock_minutes())
    }

    /// Marks a room's game as over (`Active → Concluded` when legal).
    ///
    /// The phase is the only thing that changes — seats stay bound and
    /// the room persists.
    ///
    /// # Errors
    /// Returns [`RoomError::NotFound`] if the room doesn't exist.
    pub fn conclude(&mut self, id: &RoomId) -> Result<(), RoomError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        room.advance_phase(RoomPhase::Concluded);
        Ok(())
    }

    /// Clears the seat a connection holds in a room, returning which
    /// seat was vacated.
    ///
    /// Called on disconnect. The room itself and its phase are left
    /// alone; the seat becomes reclaimable by a later join. Returns
    /// `None` if the room doesn't exist or the connection wasn't
    /// seated in it.
    pub fn vacate(
        &mut self,
        id: &RoomId,
        connection: ConnectionId,
    ) -> Option<Seat> {
        let room = self.rooms.get_mut(id)?;
        let seat = room.seat_of(connection)?;
        room.clear_seat(seat);
        tracing::info!(
            room = %id,
            %seat,
            %connection,
            occupants = room.occupant_count(),
            "seat vacated"
        );
        Some(seat)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if a room with this id exists.
    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }
}
