//! Listener lifecycle for the state-change server.

use std::net::SocketAddr;

use anyhow::{Result, anyhow};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{AppState, router};

/// Address the pact verifier is configured to call.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5175";

/// Host configuration for a state-change server instance.
#[derive(Clone)]
pub struct StateChangeServer {
    bind_address: SocketAddr,
    state: AppState,
}

impl StateChangeServer {
    pub fn new(bind_address: SocketAddr, state: AppState) -> Self {
        Self { bind_address, state }
    }

    /// Bind the listener and start serving in the background.
    pub async fn start(self) -> Result<RunningStateChangeServer> {
        let cancellation_token = CancellationToken::new();
        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .map_err(|error| anyhow!("could not bind state change server to {}: {error}", self.bind_address))?;
        let bound_address = listener.local_addr()?;
        let mode = self.state.mode().name();
        let app = router(self.state);

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
            }
        });
        info!(address = %bound_address, mode, "state change server listening");

        Ok(RunningStateChangeServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running state-change server.
#[derive(Debug)]
pub struct RunningStateChangeServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningStateChangeServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("state change server task failed: {error}"))?;
        info!(address = %self.bind_address, "state change server stopped");
        Ok(())
    }
}

/// Parse a bind address, falling back to the verifier's default port.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.map(str::trim).filter(|value| !value.is_empty()).unwrap_or(DEFAULT_BIND_ADDRESS);
    address
        .parse()
        .map_err(|error| anyhow!("invalid bind address '{address}': {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateChangeMode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[test]
    fn bind_address_defaults_to_verifier_port() -> Result<()> {
        assert_eq!(resolve_bind_address(None)?.port(), 5175);
        assert_eq!(resolve_bind_address(Some("  "))?.port(), 5175);
        assert_eq!(resolve_bind_address(Some("127.0.0.1:9000"))?, "127.0.0.1:9000".parse::<SocketAddr>()?);
        assert!(resolve_bind_address(Some("not-an-address")).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn server_serves_until_stopped() -> Result<()> {
        let server = StateChangeServer::new("127.0.0.1:0".parse()?, AppState::new(StateChangeMode::Echo));
        let running = server.start().await?;
        let address = running.bound_address();
        assert_ne!(address.port(), 0);

        let mut stream = TcpStream::connect(address).await?;
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
            .await?;
        let mut response = String::new();
        stream.read_to_string(&mut response).await?;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("ok"));

        running.stop().await?;
        assert!(TcpStream::connect(address).await.is_err());
        Ok(())
    }
}
