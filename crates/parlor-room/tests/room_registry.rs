//! Integration tests for the room registry: seat assignment, capacity,
//! clock mirroring, and the lifecycle phase machine.

use parlor_protocol::{RoomId, Seat, ServerMessage};
use parlor_room::{PlayerSender, RoomPhase, RoomRegistry};
use parlor_transport::ConnectionId;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

/// A sender whose receiving end we keep alive so sends would succeed.
fn dummy_sender() -> (PlayerSender, mpsc::UnboundedReceiver<ServerMessage>) {
    mpsc::unbounded_channel()
}

fn conn(n: u64) -> ConnectionId {
    ConnectionId::new(n)
}

fn room_id(id: &str) -> RoomId {
    RoomId::new(id)
}

/// Creates a registry with room "AB12CD" (5 min) created by conn 1.
fn registry_with_room() -> RoomRegistry {
    let mut registry = RoomRegistry::new();
    let (tx, _rx) = dummy_sender();
    registry
        .create(room_id("AB12CD"), 5, "Alice".into(), conn(1), tx)
        .expect("create should succeed");
    registry
}

// =========================================================================
// create
// =========================================================================

#[test]
fn test_create_seats_creator_as_white() {
    let registry = registry_with_room();
    let room = registry.get(&room_id("AB12CD")).unwrap();

    assert_eq!(room.seat_of(conn(1)), Some(Seat::White));
    assert_eq!(room.occupant(Seat::White).unwrap().name, "Alice");
    assert!(room.occupant(Seat::Black).is_none());
    assert_eq!(room.phase(), RoomPhase::AwaitingOpponent);
}

#[test]
fn test_create_initializes_clock_mirrors() {
    let registry = registry_with_room();
    let room = registry.get(&room_id("AB12CD")).unwrap();

    assert_eq!(room.clock_minutes(), 5);
    assert_eq!(room.white_seconds(), 300);
    assert_eq!(room.black_seconds(), 300);
}

#[test]
fn test_create_untimed_room() {
    let mut registry = RoomRegistry::new();
    let (tx, _rx) = dummy_sender();
    registry
        .create(room_id("CASUAL"), 0, "Alice".into(), conn(1), tx)
        .unwrap();

    let room = registry.get(&room_id("CASUAL")).unwrap();
    assert_eq!(room.clock_minutes(), 0);
    assert_eq!(room.white_seconds(), 0);
    assert_eq!(room.black_seconds(), 0);
}

#[test]
fn test_create_duplicate_id_fails() {
    let mut registry = registry_with_room();
    let (tx, _rx) = dummy_sender();

    let err = registry
        .create(room_id("AB12CD"), 10, "Mallory".into(), conn(9), tx)
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // The original room is untouched — same creator, same clock.
    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.clock_minutes(), 5);
    assert_eq!(room.occupant(Seat::White).unwrap().name, "Alice");
}

#[test]
fn test_create_is_case_normalized() {
    // RoomId normalizes on construction, so "ab12cd" collides with
    // "AB12CD".
    let mut registry = registry_with_room();
    let (tx, _rx) = dummy_sender();

    let err = registry
        .create(room_id("ab12cd"), 5, "Bob".into(), conn(2), tx)
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

// =========================================================================
// join
// =========================================================================

#[test]
fn test_join_assigns_black_second() {
    let mut registry = registry_with_room();
    let (tx, _rx) = dummy_sender();

    let (seat, room) = registry
        .join(&room_id("AB12CD"), "Bob".into(), conn(2), tx)
        .unwrap();

    assert_eq!(seat, Seat::Black);
    assert_eq!(room.occupant(Seat::Black).unwrap().name, "Bob");
    assert_eq!(room.phase(), RoomPhase::Active);
    assert_eq!(room.occupant_count(), 2);
}

#[test]
fn test_join_missing_room_fails() {
    let mut registry = RoomRegistry::new();
    let (tx, _rx) = dummy_sender();

    let err = registry
        .join(&room_id("NOSUCH"), "Bob".into(), conn(2), tx)
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_third_join_fails_with_full() {
    let mut registry = registry_with_room();
    let (tx2, _rx2) = dummy_sender();
    registry
        .join(&room_id("AB12CD"), "Bob".into(), conn(2), tx2)
        .unwrap();

    let (tx3, _rx3) = dummy_sender();
    let err = registry
        .join(&room_id("AB12CD"), "Carol".into(), conn(3), tx3)
        .unwrap_err();
    assert!(err.to_string().contains("is full"));

    // Nothing about the room changed.
    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.occupant_count(), 2);
    assert!(room.seat_of(conn(3)).is_none());
}

#[test]
fn test_join_reclaims_vacated_white_seat() {
    // White disconnects mid-game; the next joiner lands on white (the
    // first free seat in white-first order), not black.
    let mut registry = registry_with_room();
    let (tx2, _rx2) = dummy_sender();
    registry
        .join(&room_id("AB12CD"), "Bob".into(), conn(2), tx2)
        .unwrap();

    registry.vacate(&room_id("AB12CD"), conn(1)).unwrap();

    let (tx3, _rx3) = dummy_sender();
    let (seat, room) = registry
        .join(&room_id("AB12CD"), "Carol".into(), conn(3), tx3)
        .unwrap();

    assert_eq!(seat, Seat::White);
    assert_eq!(room.occupant(Seat::White).unwrap().name, "Carol");
    // Bob kept his seat and color.
    assert_eq!(room.occupant(Seat::Black).unwrap().name, "Bob");
    // The phase never moved backwards while the seat was empty.
    assert_eq!(room.phase(), RoomPhase::Active);
}

// =========================================================================
// clock mirroring
// =========================================================================

#[test]
fn test_sync_clocks_overwrites_mirrors() {
    let mut registry = registry_with_room();

    registry.sync_clocks(&room_id("AB12CD"), 290, 300).unwrap();

    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.white_seconds(), 290);
    assert_eq!(room.black_seconds(), 300);
}

#[test]
fn test_sync_clocks_is_idempotent() {
    let mut registry = registry_with_room();

    registry.sync_clocks(&room_id("AB12CD"), 123, 456).unwrap();
    registry.sync_clocks(&room_id("AB12CD"), 123, 456).unwrap();

    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.white_seconds(), 123);
    assert_eq!(room.black_seconds(), 456);
}

#[test]
fn test_sync_clocks_missing_room_fails() {
    let mut registry = RoomRegistry::new();
    let err = registry
        .sync_clocks(&room_id("NOSUCH"), 1, 2)
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

// =========================================================================
// lifecycle: conclude / reset_clock (resign / rematch)
// =========================================================================

#[test]
fn test_conclude_then_reset_clock_restores_clocks_and_seats() {
    let mut registry = registry_with_room();
    let (tx2, _rx2) = dummy_sender();
    registry
        .join(&room_id("AB12CD"), "Bob".into(), conn(2), tx2)
        .unwrap();

    // Mid-game clock state, then a resign.
    registry.sync_clocks(&room_id("AB12CD"), 42, 17).unwrap();
    registry.conclude(&room_id("AB12CD")).unwrap();
    assert_eq!(
        registry.get(&room_id("AB12CD")).unwrap().phase(),
        RoomPhase::Concluded
    );

    // Rematch: clocks back to clock_minutes * 60, colors unchanged.
    let clock_minutes = registry.reset_clock(&room_id("AB12CD")).unwrap();
    assert_eq!(clock_minutes, 5);

    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.white_seconds(), 300);
    assert_eq!(room.black_seconds(), 300);
    assert_eq!(room.seat_of(conn(1)), Some(Seat::White));
    assert_eq!(room.seat_of(conn(2)), Some(Seat::Black));
    assert_eq!(room.phase(), RoomPhase::Active);
}

#[test]
fn test_conclude_before_active_leaves_phase_alone() {
    // Resign while still waiting for an opponent: the broadcast side
    // effects are the handler's business, but the phase machine skips
    // the illegal AwaitingOpponent → Concluded edge.
    let mut registry = registry_with_room();
    registry.conclude(&room_id("AB12CD")).unwrap();
    assert_eq!(
        registry.get(&room_id("AB12CD")).unwrap().phase(),
        RoomPhase::AwaitingOpponent
    );
}

#[test]
fn test_reset_clock_without_conclude_still_resets() {
    // A stray rematch before game-over resets clocks but cannot take
    // the Active → Active self-edge.
    let mut registry = registry_with_room();
    let (tx2, _rx2) = dummy_sender();
    registry
        .join(&room_id("AB12CD"), "Bob".into(), conn(2), tx2)
        .unwrap();
    registry.sync_clocks(&room_id("AB12CD"), 10, 20).unwrap();

    registry.reset_clock(&room_id("AB12CD")).unwrap();

    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.white_seconds(), 300);
    assert_eq!(room.phase(), RoomPhase::Active);
}

// =========================================================================
// vacate / retention
// =========================================================================

#[test]
fn test_vacate_clears_seat_but_keeps_room() {
    let mut registry = registry_with_room();

    let seat = registry.vacate(&room_id("AB12CD"), conn(1)).unwrap();
    assert_eq!(seat, Seat::White);

    // The room persists — rooms are never destroyed.
    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.occupant_count(), 0);
    assert_eq!(registry.room_count(), 1);
    assert!(registry.contains(&room_id("AB12CD")));
}

#[test]
fn test_vacate_unknown_connection_is_none() {
    let mut registry = registry_with_room();
    assert!(registry.vacate(&room_id("AB12CD"), conn(99)).is_none());
    assert!(registry.vacate(&room_id("NOSUCH"), conn(1)).is_none());
}

// =========================================================================
// fan-out helpers
// =========================================================================

#[test]
fn test_senders_except_reaches_only_the_opponent() {
    let mut registry = registry_with_room();
    let (tx2, mut rx2) = dummy_sender();
    registry
        .join(&room_id("AB12CD"), "Bob".into(), conn(2), tx2)
        .unwrap();

    let room = registry.get(&room_id("AB12CD")).unwrap();
    let targets = room.senders_except(Seat::White);
    assert_eq!(targets.len(), 1);

    targets[0]
        .send(ServerMessage::OpponentDisconnected)
        .unwrap();
    assert_eq!(
        rx2.try_recv().unwrap(),
        ServerMessage::OpponentDisconnected
    );
}

#[test]
fn test_senders_covers_whole_room() {
    let mut registry = registry_with_room();
    let (tx2, _rx2) = dummy_sender();
    registry
        .join(&room_id("AB12CD"), "Bob".into(), conn(2), tx2)
        .unwrap();

    let room = registry.get(&room_id("AB12CD")).unwrap();
    assert_eq!(room.senders().len(), 2);
    assert_eq!(room.senders_except(Seat::Black).len(), 1);
}
