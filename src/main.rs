use notes_api::{
    build_router,
    config::load_config,
    repository::{MemoryRepository, PgRepository, Repository},
    service::NoteService,
    state::AppState,
    telemetry::Telemetry,
};
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, source) = load_config()?;

    // Log setup
    init_tracing(&config.log_level);
    tracing::info!("Loaded configuration from {}", source);

    // Repository creation and migration
    let repo = match &config.pg_dsn {
        Some(dsn) => {
            let mut repo = PgRepository::new(dsn).await.inspect_err(|e| {
                tracing::error!("Failed to establish database connection: {e}");
            })?;
            repo.migrate().await.inspect_err(|e| {
                tracing::error!("Failed to migrate database: {e}");
            })?;
            Repository::Postgres(repo)
        }
        None => {
            tracing::warn!("No database DSN configured, notes are kept in memory");
            Repository::Memory(MemoryRepository::default())
        }
    };
    tracing::info!("Using {} note store", repo.backend());

    let (telemetry, telemetry_worker) = Telemetry::start(&config.telemetry)?;

    let state = AppState::new(NoteService::new(Arc::new(repo)), telemetry.clone());
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    tracing::info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry_worker.shutdown(telemetry).await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
