use axum::{Json, extract::State, response::IntoResponse};
use evently_sdk::objects::CreateEventResponse;

use super::{EventApiError, NO_FILES_MESSAGE};
use crate::api::extractors::EventUpload;
use crate::state::AppState;

/// `POST /events`: upload the attached media and create the event.
///
/// At least one `files` part is required. Uploads run one at a time and
/// the event is only stored when all of them succeed.
pub(super) async fn create_event(
    State(state): State<AppState>,
    upload: EventUpload,
) -> Result<impl IntoResponse, EventApiError> {
    let media = upload
        .media
        .ok_or_else(|| EventApiError::InvalidRequest(NO_FILES_MESSAGE.to_string()))?;

    let record = state
        .orchestrator()
        .await
        .create_with_media(upload.fields, media)
        .await?;

    Ok(Json(CreateEventResponse {
        message: "event created".to_string(),
        event_id: record.id,
    }))
}
