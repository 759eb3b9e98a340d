use crate::engine::{
    RankingStrategy, Recommendation, RecommendEngine, RecommendError, RecommendOptions,
};
use crate::snapshot::SnapshotStats;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    #[serde(default)]
    pub top_researchers: Option<usize>,
    #[serde(default)]
    pub top_papers: Option<usize>,
    #[serde(default)]
    pub strategy: Option<RankingStrategy>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub query: String,
    pub results: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct ResearcherSummary {
    pub name: String,
    pub top_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub works: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

// ========== Error Handling ==========

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(status = %self.status, "API error: {}", self.message);

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        // Invalid arguments are the caller's fault
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
        }
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn recommend(
    State(engine): State<Arc<RecommendEngine>>,
    Json(req): Json<RecommendRequest>,
) -> Result<impl IntoResponse, AppError> {
    let defaults = RecommendOptions::default();
    let options = RecommendOptions {
        top_researchers: req.top_researchers.unwrap_or(defaults.top_researchers),
        top_papers: req.top_papers.unwrap_or(defaults.top_papers),
        strategy: req.strategy.unwrap_or_default(),
    };

    let results = engine.recommend(&req.query, &options)?;

    Ok(Json(ApiResponse::success(RecommendResponse {
        query: req.query,
        results,
    })))
}

async fn list_researchers(
    State(engine): State<Arc<RecommendEngine>>,
) -> Result<impl IntoResponse, AppError> {
    let roster: Vec<ResearcherSummary> = engine
        .snapshot()
        .profiles
        .iter()
        .map(|profile| ResearcherSummary {
            name: profile.name.clone(),
            top_keywords: profile.top_keywords.clone(),
            summary: profile.summary.clone(),
            works: profile.works.len(),
        })
        .collect();

    Ok(Json(ApiResponse::success(roster)))
}

async fn get_stats(
    State(engine): State<Arc<RecommendEngine>>,
) -> Result<impl IntoResponse, AppError> {
    let stats: SnapshotStats = engine.snapshot().stats();
    Ok(Json(ApiResponse::success(stats)))
}

// ========== Router ==========

pub fn create_router(engine: Arc<RecommendEngine>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend", post(recommend))
        .route("/researchers", get(list_researchers))
        .route("/stats", get(get_stats))
        .with_state(engine)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
