//! sqlgate server: the HTTP layer over the gateway core.
//!
//! Exposes three routes:
//! - **GET /health**: backend connectivity probe.
//! - **GET /schema**: catalog introspection (guarded).
//! - **POST /sql**: classified, bounded, parameterized query execution
//!   (guarded).
use anyhow::Context;
use sqlgate_common::config::AppConfig;
use sqlgate_core::{AccessGuard, Gateway};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;

pub use api::AppState;

pub struct GatewayServer {
    config_path: String,
}

impl Default for GatewayServer {
    fn default() -> Self {
        Self {
            config_path: "config/sqlgate.yaml".to_string(),
        }
    }
}

impl GatewayServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config_path: &str) -> Self {
        self.config_path = config_path.to_string();
        self
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .ok();

        let config = AppConfig::from_file(&self.config_path)?;

        let backend = sqlgate_core::connect(
            &config.server.database_url,
            config.server.pool_size,
        )
        .context("Failed to build backend pool")?;

        let auth_enabled = config.server.auth.token.is_some();
        let guard = AccessGuard::new(config.server.auth.token.clone());
        let state = Arc::new(AppState {
            gateway: Gateway::new(guard, backend, config.query.default_limit),
        });

        let app = api::create_router(state);

        let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;

        info!(
            "sqlgate listening on {} (auth={}, default_limit={})",
            config.server.listen_addr, auth_enabled, config.query.default_limit
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
    }
}
