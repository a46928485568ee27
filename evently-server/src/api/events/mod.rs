//! Event API handlers.
//!
//! # Endpoints
//!
//! - `GET    /events?id={id}`                  – fetch one event
//! - `GET    /events?type={t}&limit={n}&page={n}` – list events, newest first
//!   when `type=latest`, oldest first otherwise
//! - `POST   /events`                          – create an event from multipart
//!   fields plus one or more `files` parts
//! - `PUT    /events`                          – update fields of an event
//! - `DELETE /events/{id}`                     – delete an event

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use evently_core::fields::FieldError;
use evently_core::pagination::PaginationError;
use evently_core::upload::UploadError;
use evently_sdk::objects::MessageResponse;
use uuid::Uuid;

use crate::state::AppState;

mod create_event;
mod delete_event;
mod get_events;
mod update_event;


/// Build the event API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(get_events::get_events)
                .post(create_event::create_event)
                .put(update_event::update_event)
                .delete(delete_event::delete_without_id),
        )
        .route("/events/{id}", delete(delete_event::delete_event))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in event API handlers.
///
/// Every variant is rendered as `{"message": ...}`.
#[derive(Debug)]
pub enum EventApiError {
    /// Missing or malformed parameters, files or fields.
    InvalidRequest(String),
    /// The object store refused or failed an upload. Nothing was stored.
    UploadFailed(String),
    /// No event has the requested id.
    NotFound,
    /// A database query failed.
    Persistence(sqlx::Error),
}

impl IntoResponse for EventApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            EventApiError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
            EventApiError::UploadFailed(message) => {
                tracing::warn!(%message, "Event API upload failed");
                (StatusCode::BAD_REQUEST, message)
            }
            EventApiError::NotFound => (StatusCode::NOT_FOUND, "record not found".to_string()),
            EventApiError::Persistence(e) => {
                tracing::error!(error = %e, "Event API database error");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}

pub(crate) const NO_FILES_MESSAGE: &str = "No files were uploaded.";

impl From<UploadError> for EventApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NoMedia => EventApiError::InvalidRequest(NO_FILES_MESSAGE.to_string()),
            UploadError::Persistence(e) => EventApiError::Persistence(e),
            other @ (UploadError::Stage { .. }
            | UploadError::Store { .. }
            | UploadError::Timeout { .. }) => EventApiError::UploadFailed(other.to_string()),
        }
    }
}

impl From<PaginationError> for EventApiError {
    fn from(err: PaginationError) -> Self {
        EventApiError::InvalidRequest(err.to_string())
    }
}

impl From<FieldError> for EventApiError {
    fn from(err: FieldError) -> Self {
        EventApiError::InvalidRequest(err.to_string())
    }
}

/// Parse an event id supplied by the client.
fn parse_event_id(raw: &str) -> Result<Uuid, EventApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| EventApiError::InvalidRequest(format!("invalid event id: {raw}")))
}
