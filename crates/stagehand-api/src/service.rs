use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{Router, extract::State, routing::get};
use stagehand_core::config::{DEFAULT_PORT, ENV_PORT};
use stagehand_model::{NAME_PATH, RouteTable, VERSION_PATH};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::error::ApiError;

pub const ENV_HOST: &str = "STAGEHAND_HOST";
pub const ENV_DEVELOPER_NAME: &str = "STAGEHAND_DEVELOPER_NAME";
pub const ENV_VERSION: &str = "STAGEHAND_VERSION";

pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Demo service settings.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub routes: RouteTable,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            routes: RouteTable::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            cfg.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            cfg.port = port
                .trim()
                .parse()
                .map_err(|e| ApiError::InvalidConfig(format!("{ENV_PORT}={port}: {e}")))?;
        }
        if let Some(name) = lookup(ENV_DEVELOPER_NAME) {
            cfg.routes.developer_name = name;
        }
        if let Some(version) = lookup(ENV_VERSION) {
            cfg.routes.version = version;
        }
        Ok(cfg)
    }

    pub fn addr(&self) -> Result<SocketAddr, ApiError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ApiError::InvalidConfig(format!("{ENV_HOST}={}: {e}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Router builder for the two static routes.
pub struct ServiceApi {
    routes: Arc<RouteTable>,
}

impl ServiceApi {
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes: Arc::new(routes),
        }
    }

    /// Routes:
    /// - GET /name - developer name
    /// - GET /version - version string
    ///
    /// Anything else falls through to axum's 404.
    pub fn router(self) -> Router {
        Router::new()
            .route(NAME_PATH, get(get_name))
            .route(VERSION_PATH, get(get_version))
            .with_state(self.routes)
    }
}

/// GET /name
async fn get_name(State(routes): State<Arc<RouteTable>>) -> String {
    debug!(target: "stagehand.api.service", "serving name");
    routes.developer_name.clone()
}

/// GET /version
async fn get_version(State(routes): State<Arc<RouteTable>>) -> String {
    debug!(target: "stagehand.api.service", "serving version");
    routes.version.clone()
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ApiError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(target: "stagehand.api.service", %addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!(target: "stagehand.api.service", %addr, "stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix (what the init system sends on stop).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(target: "stagehand.api.service", "shutdown signal received");
}
