//! Binary entry point: configuration, database pool, router, serve.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use readhub_backend::app::AppState;
use readhub_backend::config::AppConfig;
use readhub_backend::infra::{PostgresGateway, init_metrics_handle};
use readhub_backend::create_router_with_cors;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,readhub_backend=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let gateway = Arc::new(
        PostgresGateway::with_defaults(&config.database_url)
            .await
            .context("failed to connect to Postgres")?,
    );
    gateway
        .run_migrations()
        .await
        .context("failed to run migrations")?;
    info!("Database ready");

    let mut state = AppState::new(
        gateway.clone(),
        gateway.clone(),
        gateway.clone(),
        gateway,
    );
    if let Some(handle) = init_metrics_handle() {
        state = state.with_metrics(handle);
    }

    let app = create_router_with_cors(Arc::new(state), &config.allowed_origin);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "ReadHub backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
