//! Application builder: wires store backing, services, state, and the
//! router, then runs the HTTP server.

use std::sync::Arc;

use tracing::{info, warn};

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_service::{
    AccessAuditor, AccessLogService, LogNotifier, Notifier, PasswordHasher, ShareLinkService,
};
use docvault_store::memory::MemoryStore;
use docvault_store::postgres::{PgAccessLogStore, PgShareLinkStore, create_pool};
use docvault_store::{AccessLogStore, ShareLinkStore};

use crate::router::build_router;
use crate::state::AppState;

/// Runs the DocVault server with the given configuration.
///
/// Selects the store backing from `database.url` (empty selects the
/// in-memory store), runs migrations on the Postgres path, and serves
/// until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let (link_store, log_store) = build_stores(&config).await?;

    let auditor = Arc::new(AccessAuditor::new(
        Arc::clone(&log_store),
        config.audit.clone(),
    ));
    let notifier = Arc::new(LogNotifier::new()) as Arc<dyn Notifier>;
    let log_service = Arc::new(AccessLogService::new(log_store));
    let share_service = Arc::new(ShareLinkService::new(
        link_store,
        Arc::clone(&log_service),
        auditor,
        Arc::new(PasswordHasher::new()),
        notifier,
        config.sharing.clone(),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        share_service,
        log_service,
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("DocVault server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

/// Store backing selection and, on the Postgres path, migration.
async fn build_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn ShareLinkStore>, Arc<dyn AccessLogStore>), AppError> {
    if config.database.url.is_empty() {
        warn!("No database URL configured, using the in-memory store");
        let store = Arc::new(MemoryStore::new());
        return Ok((
            Arc::clone(&store) as Arc<dyn ShareLinkStore>,
            store as Arc<dyn AccessLogStore>,
        ));
    }

    let pool = create_pool(&config.database).await?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Migration failed: {e}")))?;
    info!("Database migrations applied");

    Ok((
        Arc::new(PgShareLinkStore::new(pool.clone())) as Arc<dyn ShareLinkStore>,
        Arc::new(PgAccessLogStore::new(pool)) as Arc<dyn AccessLogStore>,
    ))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, starting graceful shutdown");
}
