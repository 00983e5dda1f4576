use account_planner::config::Config;
use account_planner::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the account planner service.
///
/// Initializes logging, configuration, the plan cache and the distribution
/// client, then serves the HTTP API.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_planner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);
    let max_body_bytes = config.max_body_bytes;

    let app_state = Arc::new(AppState::from_config(config));
    if app_state
        .distribution
        .as_ref()
        .is_some_and(|client| !client.has_sinks())
    {
        tracing::warn!("No distribution sinks configured; distribute calls will skip every sink");
    }

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = Router::new()
        .route("/api/v1/account-plans", post(handlers::create_account_plan))
        .route(
            "/api/v1/account-plans/sample",
            get(handlers::sample_account_plan),
        )
        .route("/api/v1/account-plans/:id", get(handlers::get_account_plan))
        .route(
            "/api/v1/account-plans/:id/distribute",
            post(handlers::distribute_account_plan),
        )
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
