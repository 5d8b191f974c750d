//! Server Implementation
//!
//! HTTP server startup and lifecycle management.

use crate::api;
use crate::core::{AppState, Config, WorkerChannels};
use crate::effects::audit::AuditAction;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<(AppState, WorkerChannels)>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests, embedded use)
    pub fn with_state(config: Config, state: AppState, channels: WorkerChannels) -> Self {
        Self {
            config,
            state: Some((state, channels)),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let (state, channels) = match self.state {
            Some(pair) => pair,
            None => AppState::initialize(&self.config)?,
        };

        // Start background workers before accepting traffic
        state.start_background_tasks(channels);

        state
            .audit
            .log_lifecycle(
                AuditAction::SystemStartup,
                "system",
                "server:main",
                serde_json::json!({"environment": self.config.environment}),
            )
            .await;

        let app = api::router(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Plaza server starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        state
            .audit
            .log_lifecycle(
                AuditAction::SystemShutdown,
                "system",
                "server:main",
                serde_json::json!({}),
            )
            .await;

        Ok(())
    }
}
