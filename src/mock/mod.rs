//! Development backend answering the client's endpoints with envelopes

pub mod handlers;
pub mod middleware;
pub mod routes;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use handlers::{MockState, MockStateInner, DEMO_EMAIL, DEMO_PASSWORD};
pub use routes::create_router;

/// Serve the mock API on an already bound listener
pub async fn serve(listener: TcpListener, state: MockState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}

/// Bind `addr` and serve in a background task; port 0 picks a free port
pub async fn spawn(addr: SocketAddr, state: MockState) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind mock server to {}", addr))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read mock server address")?;

    info!("Mock API listening on {}", local_addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            error!("Mock server error: {}", e);
        }
    });

    Ok((local_addr, handle))
}
