//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! The connection type here deliberately has no internal locking.
//! Instead, [`WebSocketConnection::split`] hands out two owned halves:
//! a [`ConnectionSender`] (typically moved into a writer task that
//! drains an outbound channel) and a [`ConnectionReceiver`] (driven by
//! the per-connection read loop). Holding a single stream behind a
//! mutex would deadlock the relay: the reader parks inside `recv()`
//! with the lock while another room member's broadcast tries to send.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use crate::{ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// A WebSocket listener that accepts incoming connections.
pub struct WebSocketListener {
    listener: TcpListener,
}

impl WebSocketListener {
    /// Binds a new WebSocket listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    ///
    /// Needed when binding to port 0 (tests bind `127.0.0.1:0` and ask
    /// the OS which port it picked).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for and accepts the next incoming connection, performing
    /// the WebSocket upgrade handshake.
    pub async fn accept(
        &mut self,
    ) -> Result<WebSocketConnection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        Ok(WebSocketConnection { id, ws })
    }
}

/// A single accepted WebSocket connection, not yet split.
pub struct WebSocketConnection {
    id: ConnectionId,
    ws: WsStream,
}

impl WebSocketConnection {
    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Splits the connection into independent send and receive halves.
    ///
    /// The two halves can live in different tasks; neither blocks the
    /// other.
    pub fn split(self) -> (ConnectionSender, ConnectionReceiver) {
        let (sink, stream) = self.ws.split();
        (
            ConnectionSender { id: self.id, sink },
            ConnectionReceiver {
                id: self.id,
                stream,
            },
        )
    }
}

/// The send half of a split connection.
pub struct ConnectionSender {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
}

impl ConnectionSender {
    /// Returns the connection this half belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Sends a binary frame to the remote peer.
    pub async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }
}

/// The receive half of a split connection.
pub struct ConnectionReceiver {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
}

impl ConnectionReceiver {
    /// Returns the connection this half belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Receives the next data message from the remote peer.
    ///
    /// Both binary and text frames are accepted (browser clients send
    /// text); ping/pong and other control frames are skipped. Returns
    /// `Ok(None)` when the connection is cleanly closed.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }
}
