//! `ParlorServer` builder and accept loop.
//!
//! This is the entry point for running the relay. It ties together all
//! the layers: transport → protocol → bindings → rooms.

use std::sync::Arc;

use parlor_protocol::JsonCodec;
use parlor_room::RoomRegistry;
use parlor_session::Bindings;
use parlor_transport::WebSocketListener;
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::ParlorError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Every
/// check-then-mutate against rooms runs under the `rooms` guard, so two
/// near-simultaneous joins against one room id cannot both succeed. The
/// guards are never held at the same time, and a connection's own
/// binding is only ever written by its own task.
pub(crate) struct ServerState {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) bindings: Mutex<Bindings>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,no_run
/// use parlor::prelude::*;
///
/// # async fn run() -> Result<(), ParlorError> {
/// let server = ParlorServerBuilder::new()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build(self) -> Result<ParlorServer, ParlorError> {
        let listener = WebSocketListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomRegistry::new()),
            bindings: Mutex::new(Bindings::new()),
            codec: JsonCodec,
        });

        Ok(ParlorServer { listener, state })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Parlor relay server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer {
    listener: WebSocketListener,
    state: Arc<ServerState>,
}

impl ParlorServer {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// One client's failure never affects another room: handler errors
    /// are logged and the loop keeps accepting. Runs until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!("Parlor relay server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
