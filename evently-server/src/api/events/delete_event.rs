use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use evently_sdk::objects::MessageResponse;

use super::{EventApiError, parse_event_id};
use crate::state::AppState;

/// `DELETE /events/{id}`: delete an event.
///
/// Deleting an id that does not exist still succeeds.
pub(super) async fn delete_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, EventApiError> {
    let id = parse_event_id(&raw_id)?;

    let removed = state
        .repository
        .delete(id)
        .await
        .map_err(EventApiError::Persistence)?;
    if removed {
        tracing::info!(event_id = %id, "Event deleted");
    }

    Ok(Json(MessageResponse::new("event deleted")))
}

/// `DELETE /events`: the id segment is missing.
pub(super) async fn delete_without_id() -> EventApiError {
    EventApiError::InvalidRequest("id required".to_string())
}
