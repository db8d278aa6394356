//! Core protocol types for Parlor's wire format.
//!
//! This module defines every type that travels "on the wire" — meaning these
//! are the structures that get serialized to bytes, sent over the network,
//! and deserialized on the other side.
//!
//! Think of this as the "language" that the client and server speak. The
//! event names (`create-room`, `timer-sync`, `game-over`, ...) are the
//! server's public contract, so the serde attributes below are load-bearing:
//! changing a tag breaks every deployed client.

// Serde is Rust's standard library for **ser**ializing and
// **de**serializing data. The two key traits:
//   - `Serialize`:   "I can be turned INTO bytes/JSON/etc."
//   - `Deserialize`: "I can be created FROM bytes/JSON/etc."
// The `derive` macro auto-generates these implementations for our types.
use serde::{Deserialize, Serialize};

// We also need `fmt` for implementing Display (human-readable printing).
use std::fmt;

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// Alphabet for generated room codes. No lowercase — ids are
/// case-normalized anyway, and uppercase codes are easier to read aloud.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated room code.
const ROOM_CODE_LEN: usize = 6;

/// A room identifier: an opaque string, unique among live rooms.
///
/// This is a "newtype wrapper" — a common Rust pattern where you wrap a
/// primitive type (here `String`) in a named struct. Why bother?
///
/// 1. **Type safety**: You can't accidentally pass a player name where a
///    `RoomId` is expected, even though both are strings underneath.
/// 2. **Normalization in one place**: room ids are compared
///    case-insensitively ("ab12cd" and "AB12CD" are the same room), so
///    the id is ASCII upper-cased the moment it enters the system. Every
///    constructor funnels through [`From<String>`], so a `RoomId` is
///    normalized *by construction* — no call site can forget.
///
/// `#[serde(from = "String", into = "String")]` tells serde to go through
/// the `From` conversions when (de)serializing. On the wire a `RoomId` is
/// a plain JSON string, and deserializing `"ab12cd"` yields the same
/// `RoomId` as `"AB12CD"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room id from any string-ish value, normalizing case.
    pub fn new(id: impl Into<String>) -> Self {
        Self::from(id.into())
    }

    /// Generates a short random room code (6 chars, A-Z0-9).
    ///
    /// This is the "creator" flow: a client hosting a game asks for a
    /// fresh code to share with its opponent out-of-band. Six characters
    /// over a 36-symbol alphabet gives ~2 billion codes — collisions are
    /// the registry's problem (it rejects duplicate creates), not ours.
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is the empty string.
    ///
    /// Empty ids are rejected at the matchmaking boundary — they would
    /// all collide on the same registry key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The single normalization point: every `RoomId` is upper-cased here.
impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id.to_ascii_uppercase())
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::from(id.to_string())
    }
}

/// Required by `#[serde(into = "String")]`.
impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

/// The fixed role a connection occupies within a room.
///
/// Seat assignment is permanent for the life of the room: the first
/// occupant is white, the second black, and a rematch does NOT swap
/// colors. There is no third seat and no spectator role.
///
/// `#[serde(rename_all = "lowercase")]` makes the JSON representation
/// `"white"` / `"black"`, matching what clients display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    White,
    Black,
}

impl Seat {
    /// Returns the other seat. In a two-seat room this is "the opponent".
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns the seat's wire/display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GameOverReason
// ---------------------------------------------------------------------------

/// Why a game ended, as reported in a `game-over` broadcast.
///
/// Only resignation exists today: a clock flag is reported by the
/// flagging CLIENT as a resign (the server owns no timer), and
/// checkmate/stalemate detection lives in the clients' rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverReason {
    Resign,
}

// ---------------------------------------------------------------------------
// ClientMessage — everything a client can send
// ---------------------------------------------------------------------------

/// Messages sent from a client to the server.
///
/// `#[serde(tag = "type")]` is a serde attribute that controls how this
/// enum is represented in JSON. Instead of:
///   `{ "JoinRoom": { "room_id": "AB12CD" } }`
/// it produces:
///   `{ "type": "join-room", "room_id": "AB12CD" }`
/// This "internally tagged" format is what the browser client emits, and
/// `rename_all = "kebab-case"` turns the variant names into the event
/// names clients use (`CreateRoom` → `"create-room"`).
///
/// The `move` and `signal` payloads are `serde_json::Value` — opaque,
/// uninterpreted JSON. The server forwards them verbatim and never looks
/// inside: move legality belongs to the clients' rules engine, and
/// offer/answer/candidate structure belongs to the call-negotiation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// "Open a room with this id and seat me as white."
    ///
    /// The id is chosen by the creator — typically [`RoomId::generate`]
    /// on the client side — and shared with the opponent out-of-band.
    CreateRoom {
        room_id: RoomId,
        /// Minutes per side. `0` means untimed.
        clock_minutes: u32,
        /// The creator's display name, shown to the opponent.
        name: String,
    },

    /// "Seat me in this existing room."
    JoinRoom { room_id: RoomId, name: String },

    /// An already-validated game move, forwarded to the opponent.
    Move {
        room_id: RoomId,
        payload: serde_json::Value,
    },

    /// A clock snapshot from the side currently ticking.
    ///
    /// The server mirrors these values into the room and forwards them —
    /// advisory replication, not a consensus protocol.
    TimerSync {
        room_id: RoomId,
        white_seconds: u64,
        black_seconds: u64,
    },

    /// An opaque call-negotiation blob, forwarded to the opponent.
    Signal {
        room_id: RoomId,
        payload: serde_json::Value,
    },

    /// "I give up" (or "my flag fell" — the flagging client sends this
    /// on its own behalf).
    Resign { room_id: RoomId },

    /// "Same opponent, same colors, fresh clocks."
    Rematch { room_id: RoomId },
}

// ---------------------------------------------------------------------------
// ServerMessage — everything the server can send
// ---------------------------------------------------------------------------

/// Messages sent from the server to a client.
///
/// Same tagging scheme as [`ClientMessage`]. These are fire-and-forget
/// notifications: the server never awaits an acknowledgment and never
/// retries a send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Hands a newly seated connection its role and the room's setup.
    ///
    /// `opponent_name` is a placeholder string ("Waiting...") when the
    /// other seat is still empty.
    SessionInit {
        color: Seat,
        clock_minutes: u32,
        opponent_name: String,
    },

    /// Tells the already-seated player that their opponent arrived.
    OpponentJoined { name: String },

    /// Tells the remaining player that their opponent's connection
    /// dropped. The seat is vacated and can be re-joined.
    OpponentDisconnected,

    /// A forwarded move. The payload is byte-for-byte what the sender's
    /// client produced.
    Move { payload: serde_json::Value },

    /// A forwarded clock snapshot.
    TimerUpdate {
        white_seconds: u64,
        black_seconds: u64,
    },

    /// The game ended. Broadcast to the whole room, resigner included.
    ///
    /// `loser` is the losing SEAT, not a connection identity — seats are
    /// the stable room-scoped identity that survives reconnects.
    GameOver {
        reason: GameOverReason,
        loser: Seat,
    },

    /// A rematch begins: same seats, clocks reset to `clock_minutes`.
    RematchStart { clock_minutes: u32 },

    /// A forwarded call-negotiation blob.
    Signal { payload: serde_json::Value },

    /// Something went wrong with the sender's request. Sent only to the
    /// offending connection — never broadcast.
    RoomError { message: String },
}

// =========================================================================
// Tests
// =========================================================================
