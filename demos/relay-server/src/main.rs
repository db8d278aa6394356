//! Standalone relay server binary.
//!
//! Binds on `0.0.0.0` at the port from the `PORT` environment variable
//! (default 3000) and runs the Parlor relay until terminated. Log
//! verbosity is controlled with `RUST_LOG` (e.g. `RUST_LOG=debug`).

use parlor::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let server = ParlorServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "listening");

    server.run().await
}
