//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::comparison::views::{self, BestOddsTable, Overview, SearchResults, SportPage};
use crate::comparison::EventBoard;
use crate::error::OddsError;
use crate::storage::{BookmakerQuotes, EventFilter, SqliteStore};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub store: SqliteStore,
}

impl DashboardState {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps catalog errors onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub OddsError);

impl From<OddsError> for ApiError {
    fn from(err: OddsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OddsError::NotFound { .. } => StatusCode::NOT_FOUND,
            OddsError::Duplicate { .. } => StatusCode::CONFLICT,
            OddsError::InvalidLookahead(_)
            | OddsError::InvalidSlug(_)
            | OddsError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            OddsError::Database(e) => {
                error!(error = %e, "Dashboard query failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SportQuery {
    pub league: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BestOddsQuery {
    pub bet_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/overview
pub async fn get_overview(State(state): State<AppState>) -> ApiResult<Overview> {
    Ok(Json(views::overview(&state.store, Utc::now()).await?))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<EventBoard> {
    Ok(Json(views::event_board(&state.store, id).await?))
}

/// GET /api/sports/:slug/events
pub async fn get_sport_events(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<SportQuery>,
) -> ApiResult<SportPage> {
    let filter = EventFilter {
        league: query.league,
        country: query.country,
    };
    Ok(Json(views::sport_page(&state.store, &slug, filter, Utc::now()).await?))
}

/// GET /api/best-odds
pub async fn get_best_odds(
    State(state): State<AppState>,
    Query(query): Query<BestOddsQuery>,
) -> ApiResult<BestOddsTable> {
    let table = views::best_odds(&state.store, query.bet_type.as_deref(), Utc::now()).await?;
    Ok(Json(table))
}

/// GET /api/search
pub async fn get_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResults> {
    Ok(Json(views::search(&state.store, &query.q, Utc::now()).await?))
}

/// GET /api/bookmakers
pub async fn get_bookmakers(State(state): State<AppState>) -> ApiResult<Vec<BookmakerQuotes>> {
    Ok(Json(views::bookmakers(&state.store).await?))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
