use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// Any origin may call the API.
pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address {}:{}: {e}", cfg.server.host, cfg.server.port)))
}

/// Build the router with production collaborators.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let state = ServerState::from_config(cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and serve until the process stops.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    info!(%addr, "server running");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_address_uses_port_5000() {
        let cfg = AppConfig::default();
        assert_eq!(bind_addr(&cfg).unwrap().port(), 5000);
    }

    #[test]
    fn unparsable_host_is_a_config_error() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}
