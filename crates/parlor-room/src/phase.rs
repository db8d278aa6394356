//! The room lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle phase of a room, as the server observes it.
///
/// ```text
/// Empty → AwaitingOpponent → Active → Concluded
///                              ↑          │
///                              └──────────┘  (rematch)
/// ```
///
/// - **Empty**: the room value exists but nobody is seated yet. Rooms
///   spend only an instant here — creation seats the creator
///   immediately.
/// - **AwaitingOpponent**: one seat bound; the creator is waiting.
/// - **Active**: both seats bound, game underway.
/// - **Concluded**: a game-over broadcast went out. Seats stay bound.
///
/// `Concluded → Active` is the only back-edge (rematch). There is no
/// `Destroyed` phase: rooms are never removed for the life of the
/// process. Disconnects vacate a seat but deliberately do NOT move the
/// phase backwards — the vacated seat is simply reclaimable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    Empty,
    AwaitingOpponent,
    Active,
    Concluded,
}

impl RoomPhase {
    /// Returns `true` if transitioning to `target` is legal.
    ///
    /// The registry uses this to skip illegal transitions rather than
    /// fail them: a stray rematch before any game-over, for example,
    /// still broadcasts and resets clocks but leaves the phase alone.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Empty, Self::AwaitingOpponent)
                | (Self::AwaitingOpponent, Self::Active)
                | (Self::Active, Self::Concluded)
                | (Self::Concluded, Self::Active)
        )
    }

    /// Returns `true` if exactly one seat is expected to be bound.
    pub fn is_awaiting_opponent(&self) -> bool {
        matches!(self, Self::AwaitingOpponent)
    }

    /// Returns `true` if a game is underway.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if a game-over broadcast has been sent and no
    /// rematch has started since.
    pub fn is_concluded(&self) -> bool {
        matches!(self, Self::Concluded)
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::AwaitingOpponent => write!(f, "AwaitingOpponent"),
            Self::Active => write!(f, "Active"),
            Self::Concluded => write!(f, "Concluded"),
        }
    }
}
