//! Server execution logic.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    domain::DisplayNameFactory,
    relay::{Room, SessionConfig},
};

use super::{
    handler::{get_status, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
    status::{DEFAULT_STATUS_INTERVAL, spawn_status_reporter},
};

pub const DEFAULT_PORT: u16 = 5000;

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port number to bind to
    pub port: u16,
    /// Directory holding `index.html` and `assets/`
    pub static_dir: PathBuf,
    /// Settings applied to every session
    pub session: SessionConfig,
    /// Interval of the status log line
    pub status_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
            session: SessionConfig::default(),
            status_interval: DEFAULT_STATUS_INTERVAL,
        }
    }
}

/// Broadcast relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(AppState {
            room: Arc::new(Room::new()),
            names: DisplayNameFactory::new(),
            session_config: config.session.clone(),
        });
        Self { config, state }
    }

    /// The room every accepted connection joins.
    pub fn room(&self) -> Arc<Room> {
        self.state.room.clone()
    }

    pub fn router(&self) -> Router {
        let static_dir = &self.config.static_dir;

        Router::new()
            // 静的ファイル
            .route_service("/", ServeFile::new(static_dir.join("index.html")))
            .nest_service("/assets", ServeDir::new(static_dir.join("assets")))
            // WebSocket エンドポイント
            .route("/session", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/status", get(get_status))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to the configured address and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/session", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on `listener` until `shutdown` resolves.
    ///
    /// On shutdown every session is stopped, and the status reporter is
    /// cancelled and awaited before this returns.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let status_cancel = CancellationToken::new();
        let status_task = spawn_status_reporter(
            self.room(),
            self.config.status_interval,
            status_cancel.clone(),
        );

        let room = self.room();
        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                room.stop_all();
            })
            .await;

        status_cancel.cancel();
        if let Err(e) = status_task.await {
            tracing::error!("Status reporter failed: {}", e);
        }
        tracing::info!("Server shutdown complete");

        result
    }
}
