use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{DateRange, DayRangeQuery, MergeDayRequest, UpdateGlobalNoteRequest};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::domain::{DayService, ServiceError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub day_service: DayService,
}

impl AppState {
    pub fn new(day_service: DayService) -> Self {
        Self { day_service }
    }
}

/// Build the API router. `allowed_origin` is where the front end is served from.
pub fn router(state: AppState, allowed_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/days", get(list_days))
        .route("/days/:date", get(get_day).put(put_day))
        .route("/notes/global", get(get_global_note).put(put_global_note));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

fn error_response(context: &str, e: ServiceError) -> Response {
    match e {
        ServiceError::InvalidDate(_) | ServiceError::InvalidRange { .. } => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        ServiceError::Storage(err) => {
            tracing::error!("{}: {:?}", context, err);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string()).into_response()
        }
    }
}

/// Axum handler function for GET /api/days?start=&end=
pub async fn list_days(
    State(state): State<AppState>,
    Query(query): Query<DayRangeQuery>,
) -> impl IntoResponse {
    info!("GET /api/days - {} to {}", query.start, query.end);

    let range = DateRange::from(query);
    match state.day_service.query_days(&range).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => error_response("Error listing days", e),
    }
}

/// Axum handler function for GET /api/days/:date
pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/days/{}", date);

    match state.day_service.get_day(&date).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Day not found").into_response(),
        Err(e) => error_response("Error retrieving day", e),
    }
}

/// Axum handler function for PUT /api/days/:date
pub async fn put_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(request): Json<MergeDayRequest>,
) -> impl IntoResponse {
    info!("PUT /api/days/{} - author: {}", date, request.author);

    match state
        .day_service
        .merge_day(&date, &request.patch, request.author)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error storing day", e),
    }
}

/// Axum handler function for GET /api/notes/global
pub async fn get_global_note(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/notes/global");

    match state.day_service.get_global_note().await {
        Ok(Some(note)) => (StatusCode::OK, Json(note)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Global note not found").into_response(),
        Err(e) => error_response("Error retrieving global note", e),
    }
}

/// Axum handler function for PUT /api/notes/global
pub async fn put_global_note(
    State(state): State<AppState>,
    Json(request): Json<UpdateGlobalNoteRequest>,
) -> impl IntoResponse {
    info!("PUT /api/notes/global");

    match state.day_service.merge_global_note(&request.note).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Error storing global note", e),
    }
}
