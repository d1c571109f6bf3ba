use std::{sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::subscription::{SeaOrmSubscriptionRepository, SubscriptionService};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the SeaORM repository into the service and the router.
pub fn build_app(db: DatabaseConnection, cfg: &AppConfig) -> Router {
    let repo = Arc::new(SeaOrmSubscriptionRepository::new(db));
    let state = ServerState::new(Arc::new(SubscriptionService::new(repo)));
    routes::build_router(state, build_cors(), Duration::from_secs(cfg.server.request_timeout_secs))
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
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
    info!(event = "shutdown_signal", "shutting down, draining in-flight requests");
}

/// Public entry: connect, migrate, build the app and serve until a shutdown signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    cfg.database
        .validate()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;

    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(format!("migrations failed: {e}")))?;
        info!(event = "migrations_applied", "database schema up to date");
    }

    let app = build_app(db.clone(), &cfg);

    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupError::Bind { addr: addr.clone(), reason: e.to_string() })?;
    info!(%addr, "subscription service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    info!("database pool closed");
    Ok(())
}
