//! CMS Server Library
//!
//! Lists, renders and edits the text and markdown documents in a single
//! directory, with editing gated behind a YAML credential file.

pub mod core;

use axum::{middleware, Router};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::core::auth::middleware::mw_session;
use crate::core::{AppState, CmsConfig};

/// Full application router with session handling and request tracing
pub fn app(state: AppState) -> Router {
    crate::core::router(&state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), mw_session)),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== CMS Server ===");

    let root = cms_common::init_structure(&cms_common::cms_root())?;
    let config = CmsConfig::with_base_dir(&root);
    config.ensure_dirs().await?;

    info!("Documents directory: {:?}", config.data_dir);
    info!("Credentials file: {:?}", config.users_path);

    let state = AppState::new(config.clone());
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
