use tokio::net::TcpListener;
use tracing::{error, info};

use storefront_api::config::ApiConfig;
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_api::{init_tracing, seed_from_catalogue};
use storefront_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config first: the log filter may come from it.
    let config = ApiConfig::load()?;
    init_tracing(&config.logging.filter);

    let addr = config.bind_addr()?;
    info!(
        %addr,
        db_path = %config.database.path.display(),
        seed = config.seed.enabled,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()).await?;
    info!("Database ready");

    if config.seed.enabled {
        if let Err(e) = seed_from_catalogue(&db, &config).await {
            error!(error = %e, "Catalogue seeding failed, continuing with current data");
        }
    }

    let server_config = config.server.clone();
    let state = AppState::new(db.clone(), config);
    let app = build_app_router(state, &server_config);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Storefront API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
