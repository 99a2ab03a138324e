use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::assessment::{scenario_description, Assessment};
use crate::location::{format_coords, LocationError, ResolvedLocation};
use crate::risk::{DepthRange, RiskBands, RiskTier};

use super::state::AppState;
use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    kind: &'static str,
    code: u16,
}

pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
            kind: self.kind,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        let status = match e {
            LocationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LocationError::NotFound(_) => StatusCode::NOT_FOUND,
            LocationError::Lookup(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError {
            status,
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

fn internal_error(msg: impl Into<String>) -> ApiError {
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        kind: "internal",
        message: msg.into(),
    }
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn style() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css")],
        static_files::STYLE_CSS,
    )
        .into_response()
}

pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        static_files::APP_JS,
    )
        .into_response()
}

// ─── GET /api/assess, GET /api/resolve ───────────────────────────

#[derive(Deserialize)]
pub struct PostalQuery {
    pub postal: Option<String>,
}

/// Run a blocking resolver call off the async workers.
async fn run_blocking<T, F>(state: Arc<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, LocationError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| internal_error(format!("assessment task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn log_outcome<T>(route: &str, postal: &str, start: Instant, result: &Result<T, ApiError>) {
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match result {
        Ok(_) => tracing::info!(route, postal, elapsed_ms, "ok"),
        Err(e) => tracing::info!(route, postal, elapsed_ms, status = e.status.as_u16(), kind = e.kind, "rejected"),
    }
}

pub async fn assess(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostalQuery>,
) -> Result<Json<Assessment>, ApiError> {
    let start = Instant::now();
    let postal = params.postal.unwrap_or_default();

    let raw = postal.clone();
    let result = run_blocking(state, move |s| s.assessor.assess(&raw)).await;
    log_outcome("/api/assess", &postal, start, &result);
    result.map(Json)
}

#[derive(Serialize)]
pub struct ResolveResponse {
    #[serde(flatten)]
    pub location: ResolvedLocation,
    pub building_label: String,
    pub formatted_coords: String,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostalQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let start = Instant::now();
    let postal = params.postal.unwrap_or_default();

    let raw = postal.clone();
    let result = run_blocking(state, move |s| s.assessor.resolve(&raw)).await;
    log_outcome("/api/resolve", &postal, start, &result);

    let location = result?;
    Ok(Json(ResolveResponse {
        building_label: location.building_label().to_string(),
        formatted_coords: format_coords(location.lat, location.lon),
        location,
    }))
}

// ─── GET /api/bands ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct TierInfo {
    pub tier: RiskTier,
    pub band: String,
    pub color: &'static str,
    pub text_color: &'static str,
    pub guidance: &'static str,
}

#[derive(Serialize)]
pub struct ScenarioInfo {
    pub name: String,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct BandsResponse {
    pub bands: RiskBands,
    pub depth_range: DepthRange,
    pub tiers: Vec<TierInfo>,
    pub scenarios: Vec<ScenarioInfo>,
}

pub async fn bands(State(state): State<Arc<AppState>>) -> Json<BandsResponse> {
    let sampler = state.assessor.sampler();
    let bands = sampler.bands();
    Json(BandsResponse {
        bands,
        depth_range: sampler.range(),
        tiers: RiskTier::ALL
            .iter()
            .map(|&tier| TierInfo {
                tier,
                band: bands.describe(tier),
                color: tier.color(),
                text_color: tier.text_color(),
                guidance: tier.guidance(),
            })
            .collect(),
        scenarios: state
            .assessor
            .scenarios()
            .iter()
            .map(|name| ScenarioInfo {
                name: name.clone(),
                description: scenario_description(name),
            })
            .collect(),
    })
}
