use crate::config::Config;
use crate::distribution::{DistributionClient, DistributionReport};
use crate::errors::{AppError, ResultExt};
use crate::models::AccountPlan;
use crate::pipeline::PlanRequest;
use crate::plan_cache::{plan_id, PlanCache};
use crate::sample_data::sample_request;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Generated plans keyed by content-addressed plan id.
    pub plan_cache: PlanCache,
    /// Client for pushing plans to Slack and the CRM (optional).
    pub distribution: Option<DistributionClient>,
}

impl AppState {
    /// Builds state from configuration. A distribution client that fails to
    /// build is logged and left out; plan generation still works.
    pub fn from_config(config: Config) -> Self {
        let plan_cache = PlanCache::new(
            std::time::Duration::from_secs(config.plan_cache_ttl_secs),
            config.plan_cache_capacity,
        );
        tracing::info!(
            "Plan cache initialized ({}s TTL, {} capacity)",
            config.plan_cache_ttl_secs,
            config.plan_cache_capacity
        );

        let distribution = match DistributionClient::new(&config) {
            Ok(client) => {
                tracing::info!("✓ Distribution client initialized");
                Some(client)
            }
            Err(e) => {
                tracing::error!("Failed to initialize distribution client: {}", e);
                None
            }
        };

        Self {
            config,
            plan_cache,
            distribution,
        }
    }
}

/// Response body for plan generation and lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub plan_id: String,
    /// True when the plan was served from cache rather than generated.
    pub cached: bool,
    pub plan: AccountPlan,
}

/// Response body for a distribute call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeResponse {
    pub plan_id: String,
    #[serde(flatten)]
    pub report: DistributionReport,
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "account-planner",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/account-plans
///
/// Generates an account plan, or returns the cached one when an identical
/// request (same data and `asOf`) was already served.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - Account name, raw account data and optional narrative.
///
/// # Returns
///
/// * `201 Created` with a freshly generated plan, `200 OK` for a cache hit.
pub async fn create_account_plan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRequest>,
) -> Result<(StatusCode, Json<PlanResponse>), AppError> {
    if request.account_name.trim().is_empty() {
        return Err(AppError::BadRequest("accountName is required".to_string()));
    }

    // "now" is captured once and pinned into the request before hashing
    let now = Utc::now();
    let request = request.resolved(now);
    tracing::info!(
        "POST /account-plans - account: {}, categories: {}",
        request.account_name,
        request.account_data.0.len()
    );

    generate_or_fetch(&state, request, now).await
}

/// GET /api/v1/account-plans/sample
///
/// Generates a plan for the built-in sample account as of now.
pub async fn sample_account_plan(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<PlanResponse>), AppError> {
    let now = Utc::now();
    tracing::info!("GET /account-plans/sample");

    generate_or_fetch(&state, sample_request(now), now).await
}

/// GET /api/v1/account-plans/:id
///
/// # Arguments
///
/// * `state` - The application state.
/// * `id` - Plan id returned when the plan was generated.
///
/// # Returns
///
/// * `Result<Json<PlanResponse>, AppError>` - The cached plan or 404.
pub async fn get_account_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PlanResponse>, AppError> {
    tracing::info!("GET /account-plans/{}", id);

    let plan = cached_plan(&state, &id).await?;
    Ok(Json(PlanResponse {
        plan_id: id,
        cached: true,
        plan,
    }))
}

/// POST /api/v1/account-plans/:id/distribute
///
/// Pushes a cached plan to every configured sink. Individual sink failures
/// are reported in the body; the call itself still succeeds.
pub async fn distribute_account_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DistributeResponse>, AppError> {
    tracing::info!("POST /account-plans/{}/distribute", id);

    let plan = cached_plan(&state, &id).await?;
    let client = state.distribution.as_ref().ok_or_else(|| {
        AppError::ExternalApiError("Distribution client not available".to_string())
    })?;

    let report = client.distribute(&plan).await;
    Ok(Json(DistributeResponse {
        plan_id: id,
        report,
    }))
}

async fn generate_or_fetch(
    state: &AppState,
    request: PlanRequest,
    now: chrono::DateTime<Utc>,
) -> Result<(StatusCode, Json<PlanResponse>), AppError> {
    let id = plan_id(&request).context("Computing plan id")?;

    if let Some(plan) = state.plan_cache.get(&id).await {
        tracing::debug!("Plan cache hit: {}", id);
        return Ok((
            StatusCode::OK,
            Json(PlanResponse {
                plan_id: id,
                cached: true,
                plan,
            }),
        ));
    }

    let plan = request.generate(now);
    state
        .plan_cache
        .insert(&id, &plan)
        .await
        .with_context(|| format!("Caching plan {}", id))?;

    Ok((
        StatusCode::CREATED,
        Json(PlanResponse {
            plan_id: id,
            cached: false,
            plan,
        }),
    ))
}

async fn cached_plan(state: &AppState, id: &str) -> Result<AccountPlan, AppError> {
    state
        .plan_cache
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Account plan {} not found", id)))
}
