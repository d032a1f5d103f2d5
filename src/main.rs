mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::ApiDoc;
use crate::core::{database, middleware};
use crate::features::audit::{
    routes as audit_routes, AuditLogger, AuditRetentionWorker, PgAuditLogStore,
};
use crate::features::file_requests::{
    routes as file_requests_routes, FileRequestService, PgFileRequestStore, RequestReaper,
};
use crate::features::files::handlers::TrashState;
use crate::features::files::{
    routes as files_routes, FileLifecycleService, FileRetentionWorker, PgFileLifecycleStore,
    QuotaService,
};
use crate::features::maintenance::{
    routes as maintenance_routes, spawn_all, MaintenanceState, RetentionJobs,
};
use crate::modules::storage::FilesystemStorage;
use axum::{middleware::from_fn_with_state, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Stores
    let file_store = Arc::new(PgFileLifecycleStore::new(pool.clone()));
    let audit_store = Arc::new(PgAuditLogStore::new(pool.clone()));
    let request_store = Arc::new(PgFileRequestStore::new(pool.clone()));

    // Object storage
    tokio::fs::create_dir_all(&config.storage.uploads_dir)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to create uploads directory {}: {}",
                config.storage.uploads_dir.display(),
                e
            )
        })?;
    let storage = Arc::new(FilesystemStorage::new(config.storage.uploads_dir.clone()));
    tracing::info!(
        "Filesystem storage initialized at {}",
        storage.base_path().display()
    );

    // Services
    let quota_service = Arc::new(QuotaService::new(file_store.clone()));
    let lifecycle_service = Arc::new(FileLifecycleService::new(
        file_store.clone(),
        storage.clone(),
        Arc::clone(&quota_service),
    ));
    let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));
    let file_request_service = Arc::new(FileRequestService::new(
        request_store.clone(),
        config.app.server_url.clone(),
    ));
    tracing::info!("Services initialized");

    // Workers
    let file_retention = Arc::new(FileRetentionWorker::new(
        file_store,
        storage,
        Arc::clone(&quota_service),
        config.retention.trash_retention_days,
    ));
    let request_reaper = Arc::new(RequestReaper::new(request_store));
    let audit_retention = Arc::new(AuditRetentionWorker::new(
        audit_store,
        config.retention.audit_retention_days,
        config.retention.audit_max_size_mb,
    ));

    let shutdown = CancellationToken::new();
    let scheduler_handles = spawn_all(
        RetentionJobs {
            file_retention: Arc::clone(&file_retention),
            request_reaper: Arc::clone(&request_reaper),
            audit_retention: Arc::clone(&audit_retention),
            cleanup_interval: config.retention.cleanup_interval,
        },
        shutdown.clone(),
    );
    tracing::info!("Retention schedulers spawned");

    let openapi = ApiDoc::openapi();
    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    // Admin routes (HTTP basic auth), only mounted when credentials are configured
    let admin_routes = if let Some(credentials) = config.admin.credentials() {
        tracing::info!("Maintenance API enabled");
        let admin = Router::new()
            .merge(files_routes::routes(TrashState {
                lifecycle: lifecycle_service,
                audit: Arc::clone(&audit_logger),
            }))
            .merge(audit_routes::routes(Arc::clone(&audit_logger)))
            .merge(maintenance_routes::routes(MaintenanceState {
                file_retention,
                request_reaper,
                audit_retention,
                audit: audit_logger,
            }))
            .route_layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::admin_auth_middleware,
            ));
        Router::new().nest("/api/admin", admin)
    } else {
        tracing::info!("Maintenance API disabled (no admin credentials configured)");
        Router::new()
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new().merge(file_requests_routes::routes(file_request_service));

    let app = Router::new()
        .merge(swagger)
        .merge(admin_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
    .await?;

    // Let in-flight ticks finish before exiting
    shutdown.cancel();
    for handle in scheduler_handles {
        if let Err(e) = handle.await {
            tracing::warn!("Scheduler task ended abnormally: {}", e);
        }
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels the schedulers
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c signal: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, stopping schedulers");
    shutdown.cancel();
}
