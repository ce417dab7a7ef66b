//! API service entry point.
//!
//! Boots every backend client once, wires the command handlers behind the
//! HTTP router, and serves until a shutdown signal arrives. Teardown runs
//! in reverse dependency order: queue, then cache, then database.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datadock::adapters::broker::{QueueClient, RedisStreamsTransport};
use datadock::adapters::cache::RedisCacheClient;
use datadock::adapters::events::QueueEventPublisher;
use datadock::adapters::http::{
    api_router, AdminHandlers, DataHandlers, HealthState, UserHandlers,
};
use datadock::adapters::{BcryptPasswordHasher, JwtTokenService};
use datadock::adapters::{PostgresRecordRepository, PostgresUserRepository};
use datadock::application::handlers::record::{
    CreateRecordHandler, GetRecordHandler, ListRecordsHandler,
};
use datadock::application::handlers::user::{
    ListUsersHandler, LoginUserHandler, RegisterUserHandler,
};
use datadock::config::{AppConfig, ServerConfig};
use datadock::domain::resilience::{Clock, SystemClock};
use datadock::ports::{
    Cache, EventPublisher, PasswordHasher, RecordRepository, TokenService, UserRepository,
};

/// Every backend client, constructed once and shared by `Arc` handle.
///
/// Construction mirrors request flow; `shutdown` runs the reverse:
/// queue, then cache, then database.
struct ServiceRegistry {
    pool: PgPool,
    cache: Arc<RedisCacheClient>,
    queue: QueueClient,
}

impl ServiceRegistry {
    /// Connects every backend, failing startup on the first refusal.
    async fn init(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.database.min_connections)
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.database.acquire_timeout())
            .connect(&config.database.url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        info!("Database connected");

        if config.database.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Migrations applied");
        }

        let cache = Arc::new(
            RedisCacheClient::new(&config.redis, clock.clone())
                .context("Failed to build cache client")?,
        );
        cache.connect().await.context("Failed to connect to Redis")?;
        info!("Cache connected");

        let transport = Arc::new(
            RedisStreamsTransport::new(&config.broker, clock)
                .context("Failed to build broker transport")?,
        );
        transport
            .connect()
            .await
            .context("Failed to connect to message broker")?;
        info!("Broker connected");

        Ok(Self {
            pool,
            cache,
            queue: QueueClient::new(transport),
        })
    }

    /// Releases connections in reverse order of construction.
    async fn shutdown(&self) {
        info!("Shutting down services");
        self.queue.close().await;
        self.cache.close().await;
        self.pool.close().await;
        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.server.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(environment = %config.server.environment, "=== Datadock API starting ===");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let services = ServiceRegistry::init(&config, clock).await?;

    // Ports
    let users: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(services.pool.clone()));
    let records: Arc<dyn RecordRepository> =
        Arc::new(PostgresRecordRepository::new(services.pool.clone()));
    let cache: Arc<dyn Cache> = services.cache.clone();
    let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptPasswordHasher::new(&config.auth));
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(&config.auth));
    let publisher: Arc<dyn EventPublisher> = Arc::new(QueueEventPublisher::new(
        services.queue.clone(),
        config.broker.registration_queue.clone(),
    ));

    // Command and query handlers
    let user_handlers = UserHandlers::new(
        Arc::new(RegisterUserHandler::new(
            users.clone(),
            hasher.clone(),
            publisher,
        )),
        Arc::new(LoginUserHandler::new(users.clone(), hasher, tokens.clone())),
    );
    let data_handlers = DataHandlers::new(
        Arc::new(CreateRecordHandler::new(records.clone())),
        Arc::new(GetRecordHandler::new(records.clone(), cache.clone())),
        Arc::new(ListRecordsHandler::new(records)),
    );
    let admin_handlers = AdminHandlers::new(Arc::new(ListUsersHandler::new(users)));
    let health_state = HealthState::new(
        services.pool.clone(),
        cache,
        services.queue.clone(),
    );

    let app = api_router(
        user_handlers,
        data_handlers,
        admin_handlers,
        health_state,
        tokens,
    )
    .layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(cors_layer(&config.server))
            .into_inner(),
    );

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    services.shutdown().await;
    Ok(())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    match &server.cors_origins {
        Some(_) => {
            let origins: Vec<HeaderValue> = server
                .cors_origins_list()
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}

/// Resolves when the process receives ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
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
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
