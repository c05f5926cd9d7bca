use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::catalog::{Program, ProgramFilter};
use crate::cluster::ClusterScoreSet;
use crate::config::Config;
use crate::error::{RecommendError, SaveGradesError};
use crate::grades::{GradeEntry, StudentRecord};
use crate::matching::QualifiedProgram;
use crate::quiz::{QuizAnswers, QuizOutcome};
use crate::recommend::{Recommendation, RecommendationQuery, RecommendationService};
use crate::store::SqliteStore;

#[derive(Clone)]
pub struct ApiState {
    config: Arc<Config>,
    service: RecommendationService,
}

impl ApiState {
    pub fn new(config: Config, service: RecommendationService) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
    action: Option<&'static str>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            action: None,
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            action: None,
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
            action: None,
        }
    }
}

impl From<RecommendError> for ApiError {
    fn from(error: RecommendError) -> Self {
        let status = match &error {
            RecommendError::EntitlementRequired(_) => StatusCode::PAYMENT_REQUIRED,
            RecommendError::MissingMeanGrade(_) => StatusCode::CONFLICT,
            RecommendError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RecommendError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("request failed: {error}");
        }
        Self {
            status,
            action: error.action(),
            message: error.to_string(),
        }
    }
}

impl From<SaveGradesError> for ApiError {
    fn from(error: SaveGradesError) -> Self {
        match error {
            SaveGradesError::Invalid(inner) => Self::bad_request(inner.to_string()),
            SaveGradesError::Store(inner) => Self::internal(inner),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
            action: self.action,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct SaveGradesRequest {
    student_id: String,
    #[serde(flatten)]
    entry: GradeEntry,
}

#[derive(Debug, Clone, Deserialize)]
struct StudentRequest {
    student_id: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ProgramsQuery {
    path: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuizRequest {
    #[serde(flatten)]
    answers: QuizAnswers,
    /// When present, results for the suggested path are returned as well.
    student_id: Option<String>,
    page: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ProgramsResponse {
    programs: Vec<Program>,
    available_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ClustersResponse {
    student_id: String,
    mean_grade: Option<String>,
    clusters: ClusterScoreSet,
}

#[derive(Debug, Serialize)]
struct NearMissResponse {
    student_id: String,
    near_misses: Vec<QualifiedProgram>,
}

#[derive(Debug, Serialize)]
struct QuizResponse {
    #[serde(flatten)]
    outcome: QuizOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation: Option<Recommendation>,
}

pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/programs", get(list_programs))
        .route("/v1/grades", post(save_grades))
        .route("/v1/students/:student_id/clusters", get(student_clusters))
        .route("/v1/recommendations", post(recommendations))
        .route("/v1/near-misses", post(near_misses))
        .route("/v1/quiz", post(quiz))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let store = Arc::new(SqliteStore::open(&config.resolved_db_path())?);
    let service = RecommendationService::from_config(&config, store)?;
    let app = build_router(ApiState::new(config, service));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config.as_ref().clone())
}

async fn list_programs(
    State(state): State<ApiState>,
    Query(query): Query<ProgramsQuery>,
) -> ApiResult<ProgramsResponse> {
    let filter = ProgramFilter {
        discipline_path: query.path,
        search: query.search,
        minimum_mean_grade: None,
    };
    let catalog = state.service.catalog();
    let programs = catalog
        .list_programs(&filter)
        .await
        .map_err(|e| ApiError::from(RecommendError::CatalogUnavailable(e)))?;
    let available_paths = catalog
        .discipline_paths()
        .await
        .map_err(|e| ApiError::from(RecommendError::CatalogUnavailable(e)))?;
    Ok(ok(ProgramsResponse {
        programs,
        available_paths,
    }))
}

async fn save_grades(
    State(state): State<ApiState>,
    Json(request): Json<SaveGradesRequest>,
) -> ApiResult<StudentRecord> {
    let student_id = require_student(&request.student_id)?;
    let record = state.service.save_grades(student_id, &request.entry).await?;
    Ok(ok(record))
}

async fn student_clusters(
    State(state): State<ApiState>,
    Path(student_id): Path<String>,
) -> ApiResult<ClustersResponse> {
    let record = state
        .service
        .student(&student_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no grades on file for {student_id}")))?;
    Ok(ok(ClustersResponse {
        mean_grade: record.mean_grade_symbol().map(str::to_string),
        student_id: record.student_id,
        clusters: record.clusters,
    }))
}

async fn recommendations(
    State(state): State<ApiState>,
    Json(query): Json<RecommendationQuery>,
) -> ApiResult<Recommendation> {
    require_student(&query.student_id)?;
    let result = state.service.recommend(&query).await?;
    Ok(ok(result))
}

async fn near_misses(
    State(state): State<ApiState>,
    Json(request): Json<StudentRequest>,
) -> ApiResult<NearMissResponse> {
    let student_id = require_student(&request.student_id)?;
    let near_misses = state.service.near_misses(student_id).await?;
    Ok(ok(NearMissResponse {
        student_id: student_id.to_string(),
        near_misses,
    }))
}

async fn quiz(
    State(state): State<ApiState>,
    Json(request): Json<QuizRequest>,
) -> ApiResult<QuizResponse> {
    let outcome = request.answers.outcome();
    let recommendation = match request.student_id.as_deref() {
        Some(student_id) => {
            let student_id = require_student(student_id)?;
            let query = RecommendationQuery {
                page: request.page,
                ..request.answers.to_query(student_id)
            };
            Some(state.service.recommend(&query).await?)
        }
        None => None,
    };
    Ok(ok(QuizResponse {
        outcome,
        recommendation,
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn require_student(student_id: &str) -> std::result::Result<&str, ApiError> {
    let trimmed = student_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("student_id cannot be empty"));
    }
    Ok(trimmed)
}
