//! A single room: two seats, a clock mirror, and fan-out helpers.

use parlor_protocol::{RoomId, Seat, ServerMessage};
use parlor_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::RoomPhase;

/// Channel sender for delivering outbound messages to one occupant.
///
/// Each connection's writer task drains the receiving end and owns the
/// socket's send half. Pushing into the channel never blocks, so room
/// fan-out is safe to do while holding the registry lock — the actual
/// network I/O happens in the writer tasks.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// One bound seat: who sits there and how to reach them.
#[derive(Debug)]
pub struct Occupant {
    /// The connection holding this seat.
    pub connection: ConnectionId,
    /// The display name the player gave when creating/joining.
    pub name: String,
    /// Outbound channel to the connection's writer task.
    pub sender: PlayerSender,
}

/// A matchmaking unit holding at most two participants.
///
/// Seats are positional: index 0 is white, index 1 is black. The clock
/// fields are a best-effort MIRROR of what clients report via
/// `timer-sync` — the server never decrements them itself and never
/// referees a disagreement between the two sides.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    clock_minutes: u32,
    seats: [Option<Occupant>; 2],
    white_seconds: u64,
    black_seconds: u64,
    phase: RoomPhase,
}

/// Maps a seat to its slot in the `seats` array.
fn seat_index(seat: Seat) -> usize {
    match seat {
        Seat::White => 0,
        Seat::Black => 1,
    }
}

impl Room {
    /// Creates an empty room with the given clock configuration.
    /// `clock_minutes == 0` means untimed.
    pub(crate) fn new(id: RoomId, clock_minutes: u32) -> Self {
        let seconds = u64::from(clock_minutes) * 60;
        Self {
            id,
            clock_minutes,
            seats: [None, None],
            white_seconds: seconds,
            black_seconds: seconds,
            phase: RoomPhase::Empty,
        }
    }

    /// Returns the room's id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Returns the configured minutes per side (`0` = untimed).
    pub fn clock_minutes(&self) -> u32 {
        self.clock_minutes
    }

    /// Returns the mirrored remaining seconds for white.
    pub fn white_seconds(&self) -> u64 {
        self.white_seconds
    }

    /// Returns the mirrored remaining seconds for black.
    pub fn black_seconds(&self) -> u64 {
        self.black_seconds
    }

    /// Returns the room's current lifecycle phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Returns the occupant of a seat, if bound.
    pub fn occupant(&self, seat: Seat) -> Option<&Occupant> {
        self.seats[seat_index(seat)].as_ref()
    }

    /// Returns the seat a connection holds, if any.
    pub fn seat_of(&self, connection: ConnectionId) -> Option<Seat> {
        for seat in [Seat::White, Seat::Black] {
            if let Some(occ) = self.occupant(seat) {
                if occ.connection == connection {
                    return Some(seat);
                }
            }
        }
        None
    }

    /// Returns the first free seat in white-first order.
    ///
    /// This is what makes seat assignment deterministic: the first
    /// occupant of a room is always white, the second black — and a
    /// seat vacated by a disconnect is handed out again before black.
    pub fn first_free_seat(&self) -> Option<Seat> {
        [Seat::White, Seat::Black]
            .into_iter()
            .find(|&s| self.occupant(s).is_none())
    }

    /// Returns how many seats are currently bound (0, 1, or 2).
    pub fn occupant_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    // -----------------------------------------------------------------
    // Fan-out helpers
    // -----------------------------------------------------------------
    //
    // The handler collects cloned senders while holding the registry
    // lock and pushes messages after releasing it. Cloning an
    // `UnboundedSender` is cheap (an Arc bump).

    /// Returns a clone of one seat's outbound sender, if bound.
    pub fn sender(&self, seat: Seat) -> Option<PlayerSender> {
        self.occupant(seat).map(|o| o.sender.clone())
    }

    /// Returns cloned senders for every bound seat (broadcast).
    pub fn senders(&self) -> Vec<PlayerSender> {
        self.seats
            .iter()
            .flatten()
            .map(|o| o.sender.clone())
            .collect()
    }

    /// Returns cloned senders for every bound seat EXCEPT the given one
    /// (relay to "the other member(s)").
    pub fn senders_except(&self, seat: Seat) -> Vec<PlayerSender> {
        [Seat::White, Seat::Black]
            .into_iter()
            .filter(|&s| s != seat)
            .filter_map(|s| self.sender(s))
            .collect()
    }

    // -----------------------------------------------------------------
    // Mutators — registry-only
    // -----------------------------------------------------------------

    /// Binds an occupant to a seat. The slot must be free.
    pub(crate) fn bind_seat(&mut self, seat: Seat, occupant: Occupant) {
        debug_assert!(self.occupant(seat).is_none());
        self.seats[seat_index(seat)] = Some(occupant);
    }

    /// Clears a seat, returning its occupant if one was bound.
    pub(crate) fn clear_seat(&mut self, seat: Seat) -> Option<Occupant> {
        self.seats[seat_index(seat)].take()
    }

    /// Overwrites the mirrored clock values.
    pub(crate) fn set_clocks(&mut self, white: u64, black: u64) {
        self.white_seconds = white;
        self.black_seconds = black;
    }

    /// Restores both mirrors to the configured starting time.
    pub(crate) fn reset_clocks(&mut self) {
        let seconds = u64::from(self.clock_minutes) * 60;
        self.white_seconds = seconds;
        self.black_seconds = seconds;
    }

    /// Moves to `target` if the transition is legal; otherwise leaves
    /// the phase untouched. Returns whether the transition happened.
    pub(crate) fn advance_phase(&mut self, target: RoomPhase) -> bool {
        if self.phase.can_transition_to(target) {
            tracing::debug!(
                room = %self.id,
                from = %self.phase,
                to = %target,
                "room phase transition"
            );
            self.phase = target;
            true
        } else {
            false
        }
    }
}
