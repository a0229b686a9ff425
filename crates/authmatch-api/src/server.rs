//! HTTP server lifecycle: bind, spawn, shut down.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::router::api_router;
use crate::types::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("failed to read local address: {0}")]
    LocalAddr(std::io::Error),
}

/// Handle to a running API server.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Address actually bound (resolves port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Ask the server to stop accepting connections. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish in-flight requests and exit.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!("API server task failed: {e}");
        }
    }
}

/// Bind `addr` and serve the API in a background task.
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

    let app = api_router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use authmatch_ai::ComparePipeline;
    use authmatch_ai::testing::ScriptedOracle;
    use authmatch_core::SchemaRegistry;

    fn test_state() -> AppState {
        AppState::new(ComparePipeline::new(
            Arc::new(ScriptedOracle::new()),
            Arc::new(SchemaRegistry::builtin().unwrap()),
        ))
    }

    #[tokio::test]
    async fn serves_health_then_stops() {
        let mut server = start_server("127.0.0.1:0".parse().unwrap(), test_state())
            .await
            .unwrap();
        assert_ne!(server.addr().port(), 0);

        let url = format!("http://{}/health", server.addr());
        let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(json["status"], "healthy");

        server.shutdown();
        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let server = start_server("127.0.0.1:0".parse().unwrap(), test_state())
            .await
            .unwrap();
        let err = start_server(server.addr(), test_state())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
    }
}
