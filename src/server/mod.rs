//! Server module
//!
//! Handles TCP connections and manages the accept loop.
//! This module is responsible for accepting connections and delegating
//! request processing to the dispatcher.

mod connection;

use crate::dispatch::Dispatcher;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

pub use connection::Connection;

/// Run the server
///
/// Binds the given address and serves connections until the process exits.
pub async fn run(addr: &str, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    // Bind the TCP listener
    let listener = TcpListener::bind(addr).await?;
    info!("quickdb listening on {}", listener.local_addr()?);

    serve(listener, dispatcher).await
}

/// Serve connections from an already bound listener
///
/// Each connection gets its own task. A failing connection never affects the
/// others or the shared tables.
pub async fn serve(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    loop {
        // Accept incoming connections
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Accept error: {}", e);
                continue;
            }
        };
        info!("New connection from {}", addr);

        // Clone the dispatcher Arc for this connection
        let dispatcher = dispatcher.clone();

        // Spawn a new task to handle this connection
        tokio::spawn(async move {
            let mut connection = Connection::new(socket);

            if let Err(e) = connection.handle(dispatcher.clone()).await {
                error!("Connection error from {}: {}", addr, e);
            }

            // Closing the log syncs the file, keep it off the async workers
            if let Err(e) = tokio::task::spawn_blocking(move || dispatcher.close_log()).await {
                warn!("Closing the AOF after {} failed: {}", addr, e);
            }
            info!("Connection closed: {}", addr);
        });
    }
}
