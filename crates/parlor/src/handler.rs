//! Per-connection handler: the read loop, the writer task, and the
//! matchmaking/relay/lifecycle dispatch.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The connection is split in two:
//!
//! - the READ half is driven by this task's loop below;
//! - the WRITE half is owned by a spawned writer task draining an
//!   unbounded channel of [`ServerMessage`]s.
//!
//! Everyone who wants to notify this client — its own handler, the
//! handler of the other room member, the disconnect cleanup of either —
//! just pushes into the channel. Pushes never block, so room fan-out is
//! safe anywhere, and all network I/O happens outside the registry
//! locks in the writer tasks. Send failures are discarded: sends are
//! fire-and-forget notifications with no ack and no retry.

use std::sync::Arc;

use parlor_protocol::{
    ClientMessage, Codec, GameOverReason, RoomId, Seat, ServerMessage,
};
use parlor_room::PlayerSender;
use parlor_session::SessionError;
use parlor_transport::{ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::ParlorError;

/// Opponent-name placeholder shown to a creator whose room is still
/// waiting. Part of the client contract — the UI matches on it.
const WAITING_PLACEHOLDER: &str = "Waiting...";

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), ParlorError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (mut write_half, mut read_half) = conn.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Writer task: owns the socket's send half for the connection's
    // lifetime. Ends when every sender clone is dropped or the peer
    // stops accepting frames.
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let bytes = match codec.encode(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(
                        %conn_id, error = %e,
                        "failed to encode outbound message"
                    );
                    continue;
                }
            };
            if write_half.send(&bytes).await.is_err() {
                break;
            }
        }
        let _ = write_half.close().await;
    });

    // Read loop: one inbound message at a time, processed to completion.
    loop {
        let data = match read_half.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        // Malformed input is logged and skipped — never fatal, never
        // answered. A buggy client can't take its room down with it.
        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    %conn_id, error = %e, "failed to decode message"
                );
                continue;
            }
        };

        dispatch(&state, conn_id, &tx, msg).await;
    }

    cleanup_disconnect(&state, conn_id).await;

    // Dropping our sender lets the writer task finish once the channel
    // drains (room occupants may still hold clones; those die when the
    // seat is vacated above).
    drop(tx);
    let _ = writer.await;

    Ok(())
}

/// Routes one decoded client message to its operation.
async fn dispatch(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::CreateRoom {
            room_id,
            clock_minutes,
            name,
        } => {
            handle_create_room(state, conn_id, tx, room_id, clock_minutes, name)
                .await;
        }
        ClientMessage::JoinRoom { room_id, name } => {
            handle_join_room(state, conn_id, tx, room_id, name).await;
        }
        ClientMessage::Move { room_id, payload } => {
            relay_to_opponent(
                state,
                conn_id,
                tx,
                &room_id,
                ServerMessage::Move { payload },
            )
            .await;
        }
        ClientMessage::Signal { room_id, payload } => {
            relay_to_opponent(
                state,
                conn_id,
                tx,
                &room_id,
                ServerMessage::Signal { payload },
            )
            .await;
        }
        ClientMessage::TimerSync {
            room_id,
            white_seconds,
            black_seconds,
        } => {
            handle_timer_sync(
                state,
                conn_id,
                tx,
                &room_id,
                white_seconds,
                black_seconds,
            )
            .await;
        }
        ClientMessage::Resign { room_id } => {
            handle_resign(state, conn_id, tx, &room_id).await;
        }
        ClientMessage::Rematch { room_id } => {
            handle_rematch(state, conn_id, tx, &room_id).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Matchmaking
// ---------------------------------------------------------------------------

async fn handle_create_room(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    room_id: RoomId,
    clock_minutes: u32,
    name: String,
) {
    if room_id.is_empty() {
        send_room_error(tx, "room id must not be empty");
        return;
    }
    if state.bindings.lock().await.is_bound(conn_id) {
        send_room_error(
            tx,
            &SessionError::AlreadyBound(conn_id).to_string(),
        );
        return;
    }

    let created = {
        let mut rooms = state.rooms.lock().await;
        rooms
            .create(room_id.clone(), clock_minutes, name, conn_id, tx.clone())
            .map(|_| ())
    };

    match created {
        Ok(()) => {
            // Cannot fail: this task is the only writer of its own
            // binding, and it was checked unbound above.
            let _ = state.bindings.lock().await.bind(
                conn_id,
                room_id,
                Seat::White,
            );
            send(
                tx,
                ServerMessage::SessionInit {
                    color: Seat::White,
                    clock_minutes,
                    opponent_name: WAITING_PLACEHOLDER.to_string(),
                },
            );
        }
        // Error goes to the requester only — no broadcast.
        Err(e) => send_room_error(tx, &e.to_string()),
    }
}

async fn handle_join_room(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    room_id: RoomId,
    name: String,
) {
    if room_id.is_empty() {
        send_room_error(tx, "room id must not be empty");
        return;
    }
    if state.bindings.lock().await.is_bound(conn_id) {
        send_room_error(
            tx,
            &SessionError::AlreadyBound(conn_id).to_string(),
        );
        return;
    }

    // Everything the notifications need is collected under the lock;
    // the sends happen after it drops.
    let joined = {
        let mut rooms = state.rooms.lock().await;
        rooms
            .join(&room_id, name.clone(), conn_id, tx.clone())
            .map(|(seat, room)| {
                let opponent = seat.opponent();
                let opponent_name = room
                    .occupant(opponent)
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| WAITING_PLACEHOLDER.to_string());
                (seat, room.clock_minutes(), opponent_name, room.sender(opponent))
            })
    };

    match joined {
        Ok((seat, clock_minutes, opponent_name, opponent_sender)) => {
            let _ =
                state.bindings.lock().await.bind(conn_id, room_id, seat);
            send(
                tx,
                ServerMessage::SessionInit {
                    color: seat,
                    clock_minutes,
                    opponent_name,
                },
            );
            if let Some(opponent) = opponent_sender {
                let _ =
                    opponent.send(ServerMessage::OpponentJoined { name });
            }
        }
        Err(e) => send_room_error(tx, &e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Forwards a message verbatim to every other occupant of the room.
///
/// Used for `move` and `signal`: pure forwards, no room mutation, no
/// interpretation of the payload, delivered at most once.
async fn relay_to_opponent(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    room_id: &RoomId,
    msg: ServerMessage,
) {
    let Some(seat) = resolve_seat(state, conn_id, tx, room_id).await else {
        return;
    };

    let targets = {
        let rooms = state.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|room| room.senders_except(seat))
            .unwrap_or_default()
    };

    for target in targets {
        let _ = target.send(msg.clone());
    }
}

/// Forwards a clock snapshot to the opponent AND overwrites the room's
/// mirrored clock fields. Advisory replication: the server records
/// whatever the client reported and never referees disagreements.
async fn handle_timer_sync(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    room_id: &RoomId,
    white_seconds: u64,
    black_seconds: u64,
) {
    let Some(seat) = resolve_seat(state, conn_id, tx, room_id).await else {
        return;
    };

    let mirrored = {
        let mut rooms = state.rooms.lock().await;
        rooms
            .sync_clocks(room_id, white_seconds, black_seconds)
            .map(|()| {
                rooms
                    .get(room_id)
                    .map(|room| room.senders_except(seat))
                    .unwrap_or_default()
            })
    };

    match mirrored {
        Ok(targets) => {
            for target in targets {
                let _ = target.send(ServerMessage::TimerUpdate {
                    white_seconds,
                    black_seconds,
                });
            }
        }
        Err(e) => send_room_error(tx, &e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Broadcasts game-over to the whole room — resigner included — and
/// concludes the phase. Seats stay bound; the room persists.
async fn handle_resign(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    room_id: &RoomId,
) {
    let Some(seat) = resolve_seat(state, conn_id, tx, room_id).await else {
        return;
    };

    let targets = {
        let mut rooms = state.rooms.lock().await;
        if let Err(e) = rooms.conclude(room_id) {
            tracing::debug!(%conn_id, error = %e, "conclude failed");
        }
        rooms
            .get(room_id)
            .map(|room| room.senders())
            .unwrap_or_default()
    };

    tracing::info!(room = %room_id, loser = %seat, "game over by resignation");

    let msg = ServerMessage::GameOver {
        reason: GameOverReason::Resign,
        loser: seat,
    };
    for target in targets {
        let _ = target.send(msg.clone());
    }
}

/// Broadcasts rematch-start to the whole room and resets the clock
/// mirrors. Seats and colors stay exactly as they were.
async fn handle_rematch(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    room_id: &RoomId,
) {
    if resolve_seat(state, conn_id, tx, room_id).await.is_none() {
        return;
    }

    let reset = {
        let mut rooms = state.rooms.lock().await;
        rooms.reset_clock(room_id).map(|clock_minutes| {
            let targets = rooms
                .get(room_id)
                .map(|room| room.senders())
                .unwrap_or_default();
            (clock_minutes, targets)
        })
    };

    match reset {
        Ok((clock_minutes, targets)) => {
            for target in targets {
                let _ = target
                    .send(ServerMessage::RematchStart { clock_minutes });
            }
        }
        Err(e) => send_room_error(tx, &e.to_string()),
    }
}

/// Unbinds a dropped connection, vacates its seat, and tells whoever is
/// left. The room itself persists and the seat becomes reclaimable.
async fn cleanup_disconnect(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
) {
    let binding = state.bindings.lock().await.unbind(conn_id);
    let Some(binding) = binding else {
        return;
    };

    let remaining = {
        let mut rooms = state.rooms.lock().await;
        rooms.vacate(&binding.room, conn_id);
        rooms
            .get(&binding.room)
            .map(|room| room.senders())
            .unwrap_or_default()
    };

    tracing::info!(
        %conn_id,
        room = %binding.room,
        seat = %binding.seat,
        "connection left room"
    );

    for target in remaining {
        let _ = target.send(ServerMessage::OpponentDisconnected);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The relay guard: resolves the sender's seat and verifies the binding
/// names the room the message claims. On failure the sender — and only
/// the sender — gets a room-error.
async fn resolve_seat(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    tx: &PlayerSender,
    room_id: &RoomId,
) -> Option<Seat> {
    let resolved = {
        let bindings = state.bindings.lock().await;
        bindings.resolve(conn_id, room_id).map(|b| b.seat)
    };
    match resolved {
        Ok(seat) => Some(seat),
        Err(e) => {
            send_room_error(tx, &e.to_string());
            None
        }
    }
}

/// Pushes a message to this connection's own writer task.
fn send(tx: &PlayerSender, msg: ServerMessage) {
    let _ = tx.send(msg);
}

/// Pushes a room-error to the requester. Never broadcast.
fn send_room_error(tx: &PlayerSender, message: &str) {
    send(
        tx,
        ServerMessage::RoomError {
            message: message.to_string(),
        },
    );
}
