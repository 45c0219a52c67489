//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::clock::{Clock, SystemClock};
use platform::csrf::{CSRF_HEADER_NAME, CsrfProtector};
use platform::sweeper::spawn_sweeper;
use rsvp::application::config::RateLimitStrategy;
use rsvp::{PgInviteRepository, RsvpConfig, rsvp_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_PORT: u16 = 31113;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,rsvp=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // RSVP configuration
    let production = env::var("APP_ENV")
        .or_else(|_| env::var("NODE_ENV"))
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);
    let allowed_origins = env::var("ALLOWED_ORIGINS").ok();

    let mut config = RsvpConfig::from_env_values(production, allowed_origins.as_deref());
    if let Ok(strategy) = env::var("RATE_LIMIT_STRATEGY") {
        config.rate_limit_strategy = strategy
            .parse::<RateLimitStrategy>()
            .map_err(anyhow::Error::msg)?;
    }

    tracing::info!(
        production,
        origin_enforced = config.origin.enforce,
        allowed_origins = config.origin.allowed_origins.len(),
        rate_limit_strategy = config.rate_limit_strategy.as_str(),
        "RSVP configuration loaded"
    );

    // In-memory admission state and its sweepers
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rate_limiter = config.rate_limit_strategy.build(clock.clone());
    let csrf = Arc::new(CsrfProtector::new(config.csrf.clone(), clock));

    let sweepers = [
        spawn_sweeper(
            "rate_limit",
            rate_limiter.clone(),
            config.rate_limit_sweep_interval,
        ),
        spawn_sweeper("csrf", csrf.clone(), config.csrf.cleanup_interval),
    ];

    // CORS configuration
    let frontend_origins = allowed_origins
        .unwrap_or_else(|| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let cors_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().trim_end_matches('/').parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            http::HeaderName::from_static(CSRF_HEADER_NAME),
        ]))
        .allow_credentials(true);

    // Build router
    let repo = PgInviteRepository::new(pool.clone());
    let app = Router::new()
        .nest("/api", rsvp_router(repo, config, rate_limiter, csrf))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = match env::var("PORT") {
        Ok(port) => port.parse().context("PORT must be a valid port number")?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    for sweeper in sweepers {
        sweeper.stop().await;
    }
    pool.close().await;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
