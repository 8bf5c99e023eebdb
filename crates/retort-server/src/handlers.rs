//! HTTP request handlers.
//!
//! Upload parse/save, upload history, and read-only lookups for papers,
//! compounds and synthesis routes.

use crate::session::{SessionError, SessionManager};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use retort_domain::{CompoundId, EntityStore, PaperId, PaperQuery, SynthesisRouteId};
use retort_ingest::views::{CompoundDetail, CompoundView, PaperDetail, PaperView, SynthesisRouteView};
use retort_ingest::{
    CommitError, CommitOutcome, CommitRequest, IngestContext, IngestError, Ingestor,
    LocalDocumentStorage, ParsedDocument,
};
use retort_llm::AnyProvider;
use retort_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Ingestor as wired by the server
pub type ServerIngestor = Ingestor<AnyProvider, SqliteStore, LocalDocumentStorage>;

/// Papers returned by the upload history endpoint
pub const HISTORY_LIMIT: usize = 20;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Parse/commit pipeline and its store
    pub ingestor: Arc<ServerIngestor>,
    /// Session manager for JWT token operations
    pub session_manager: Arc<SessionManager>,
}

/// Session establishment request
#[derive(Debug, Deserialize)]
pub struct EstablishSessionRequest {
    /// Contributor id
    pub user_id: String,
}

/// Session establishment response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Bearer token
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Model used for extraction
    pub model: String,
}

/// Paging parameters for the paper listing
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// 1-based page number
    pub page: Option<usize>,
    /// Page size
    pub limit: Option<usize>,
}

/// Paging metadata
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Page returned
    pub current_page: usize,
    /// Number of pages
    pub total_pages: usize,
    /// Number of papers
    pub total_items: usize,
    /// Page size
    pub items_per_page: usize,
}

/// One page of papers
#[derive(Debug, Serialize, Deserialize)]
pub struct PapersPage {
    /// Papers on this page, newest first
    pub papers: Vec<PaperView>,
    /// Paging metadata
    pub pagination: Pagination,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Underlying cause, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired session
    Unauthorized(String),
    /// Malformed request
    BadRequest(String),
    /// Upload over the size limit
    PayloadTooLarge(String),
    /// Well-formed request that cannot be processed
    Unprocessable(String),
    /// Unknown entity
    NotFound(String),
    /// Store lock is unusable
    Unavailable(String),
    /// Internal server error
    InternalError(String),
}

impl AppError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Unauthorized(d) => (StatusCode::UNAUTHORIZED, "Unauthorized", d),
            AppError::BadRequest(d) => (StatusCode::BAD_REQUEST, "Invalid request", d),
            AppError::PayloadTooLarge(d) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Document too large", d)
            }
            AppError::Unprocessable(d) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Could not read PDF", d)
            }
            AppError::NotFound(d) => (StatusCode::NOT_FOUND, "Not found", d),
            AppError::Unavailable(d) => (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable", d),
            AppError::InternalError(d) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", d)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();
        if status.is_server_error() {
            error!("{}: {}", error, details);
        }

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details: Some(details),
        });
        (status, body).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::JwtEncode(_) => AppError::InternalError(e.to_string()),
            _ => AppError::Unauthorized(e.to_string()),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::InputValidation(_) => AppError::BadRequest(e.to_string()),
            IngestError::TooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            IngestError::Parse(_) => AppError::Unprocessable(e.to_string()),
            IngestError::Storage(_) | IngestError::Join(_) | IngestError::Config(_) => {
                AppError::InternalError(e.to_string())
            }
        }
    }
}

impl From<CommitError> for AppError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::InvalidPaper(_) => AppError::BadRequest(e.to_string()),
            CommitError::PersistenceFatal(_) => AppError::InternalError(e.to_string()),
            CommitError::StoreUnavailable(_) => AppError::Unavailable(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            _ => AppError::InternalError(e.to_string()),
        }
    }
}

/// Run read-only store work under the store lock
fn with_store<T>(
    state: &AppState,
    op: impl FnOnce(&SqliteStore) -> Result<T, StoreError>,
) -> Result<T, AppError> {
    let store = state.ingestor.store();
    let guard = store
        .lock()
        .map_err(|e| AppError::Unavailable(e.to_string()))?;
    Ok(op(&guard)?)
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::BadRequest(format!("'{}' is not a valid {} id", raw, what)))
}

/// POST /session/establish - Issue a bearer token
async fn establish_session(
    State(state): State<AppState>,
    Json(request): Json<EstablishSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }

    let token = state.session_manager.generate_token(&request.user_id)?;
    info!("Session established for {}", request.user_id);

    Ok(Json(SessionResponse {
        token,
        expires_in: state.session_manager.token_expiry_secs(),
    }))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        model: state.ingestor.model_name().to_string(),
    })
}

/// POST /api/papers/upload/parse - Extract candidates from a PDF body
///
/// The body is the raw PDF. `X-Filename` carries the original file name.
async fn parse_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ParsedDocument>, AppError> {
    let contributor = state.session_manager.authenticate(&headers)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("application/pdf") {
        return Err(AppError::BadRequest(format!(
            "expected Content-Type application/pdf, got '{}'",
            content_type
        )));
    }

    let filename = headers
        .get("x-filename")
        .and_then(|v| v.to_str().ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("upload.pdf")
        .to_string();

    let ctx = IngestContext::for_contributor(contributor);
    let parsed = state.ingestor.parse(&ctx, &filename, body.to_vec()).await?;

    if let Some(warning) = &parsed.extraction_warning {
        warn!("'{}' parsed without candidates: {}", filename, warning);
    }
    Ok(Json(parsed))
}

/// POST /api/papers/upload/save - Commit reviewed candidates
async fn save_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<CommitOutcome>), AppError> {
    let contributor = state.session_manager.authenticate(&headers)?;

    let request: CommitRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid commit body: {}", e)))?;

    let ctx = IngestContext::for_contributor(contributor);
    let outcome = state.ingestor.commit(&ctx, request)?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/papers/upload/history - The caller's most recent uploads
async fn upload_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<PaperDetail>>, AppError> {
    let contributor = state.session_manager.authenticate(&headers)?;

    let query = PaperQuery {
        contributor: Some(contributor),
        offset: 0,
        limit: Some(HISTORY_LIMIT),
    };

    let history = with_store(&state, |store| {
        let papers = store.list_papers(&query)?;
        papers
            .iter()
            .map(|paper| {
                let compounds = store.get_compounds(&paper.related_compounds)?;
                Ok(PaperDetail::new(paper, &compounds))
            })
            .collect::<Result<Vec<_>, StoreError>>()
    })?;

    Ok(Json(history))
}

/// GET /api/papers - Newest-first paper listing
async fn list_papers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PapersPage>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let query = PaperQuery {
        contributor: None,
        offset: (page - 1).saturating_mul(limit),
        limit: Some(limit),
    };

    let (papers, total) = with_store(&state, |store| {
        let total = store.count_papers(&PaperQuery::default())?;
        let papers = store.list_papers(&query)?;
        Ok((papers, total))
    })?;

    Ok(Json(PapersPage {
        papers: papers.iter().map(PaperView::from).collect(),
        pagination: Pagination {
            current_page: page,
            total_pages: total.div_ceil(limit),
            total_items: total,
            items_per_page: limit,
        },
    }))
}

/// GET /api/papers/:id
async fn get_paper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaperDetail>, AppError> {
    let id: PaperId = parse_id(&id, "paper")?;

    let detail = with_store(&state, |store| {
        let paper = store
            .get_paper(id)?
            .ok_or_else(|| StoreError::NotFound(format!("paper {}", id)))?;
        let compounds = store.get_compounds(&paper.related_compounds)?;
        Ok(PaperDetail::new(&paper, &compounds))
    })?;

    Ok(Json(detail))
}

/// GET /api/compounds/:id
async fn get_compound(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompoundDetail>, AppError> {
    let id: CompoundId = parse_id(&id, "compound")?;

    let detail = with_store(&state, |store| {
        let compound = store
            .get_compound(id)?
            .ok_or_else(|| StoreError::NotFound(format!("compound {}", id)))?;
        let papers = store.get_papers(&compound.related_papers)?;
        let route = match compound.synthesis_route {
            Some(route_id) => store.get_synthesis_route(route_id)?,
            None => None,
        };

        Ok(CompoundDetail {
            compound: CompoundView::from(&compound),
            papers: papers.iter().map(PaperView::from).collect(),
            route: route.as_ref().map(SynthesisRouteView::from),
        })
    })?;

    Ok(Json(detail))
}

/// GET /api/synthesis/:id
async fn get_synthesis_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SynthesisRouteView>, AppError> {
    let id: SynthesisRouteId = parse_id(&id, "synthesis route")?;

    let route = with_store(&state, |store| {
        store
            .get_synthesis_route(id)?
            .ok_or_else(|| StoreError::NotFound(format!("synthesis route {}", id)))
    })?;

    Ok(Json(SynthesisRouteView::from(&route)))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    // Leave headroom so oversized uploads reach the pipeline's own check
    let upload_limit = state.ingestor.config().max_upload_bytes + 1024 * 1024;

    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/session/establish", post(establish_session))
        .route(
            "/api/papers/upload/parse",
            post(parse_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/papers/upload/save", post(save_upload))
        .route("/api/papers/upload/history", get(upload_history))
        .route("/api/papers", get(list_papers))
        .route("/api/papers/:id", get(get_paper))
        .route("/api/compounds/:id", get(get_compound))
        .route("/api/synthesis/:id", get(get_synthesis_route))
        .with_state(state)
}
