use axum::{Json, extract::State, response::IntoResponse};
use evently_core::entities::Schedule;
use evently_core::entities::event_records::UpdateEventRecord;
use evently_core::fields::{parse_date, parse_number};
use evently_sdk::objects::{MessageResponse, NumberOrText};

use super::{EventApiError, parse_event_id};
use crate::api::extractors::UpdateBody;
use crate::state::AppState;

/// `PUT /events`: replace the provided fields of an event.
///
/// The schedule is replaced as a whole when any of `start`, `end` or
/// `date` is present. Media and attendees cannot be changed here.
/// Numbers may be sent as JSON numbers or as text.
pub(super) async fn update_event(
    State(state): State<AppState>,
    UpdateBody(body): UpdateBody,
) -> Result<impl IntoResponse, EventApiError> {
    let raw_id = body
        .event_id
        .as_deref()
        .ok_or_else(|| EventApiError::InvalidRequest("eventId required".to_string()))?;
    let id = parse_event_id(raw_id)?;

    let start = body.start.map(NumberOrText::into_text);
    let end = body.end.map(NumberOrText::into_text);
    let date = body.date.map(NumberOrText::into_text);
    let schedule = if start.is_some() || end.is_some() || date.is_some() {
        Some(Schedule {
            date: parse_date("date", date.as_deref())?,
            start: parse_number("start", start.as_deref())?,
            end: parse_number("end", end.as_deref())?,
        })
    } else {
        None
    };
    let rigor_rank = body.rigor_rank.map(NumberOrText::into_text);

    let update = UpdateEventRecord {
        id,
        kind: body.kind,
        name: body.name,
        tagline: body.tagline,
        schedule,
        description: body.description,
        moderator: body.moderator,
        category: body.category,
        sub_category: body.sub_category,
        rigor_rank: parse_number("rigor_rank", rigor_rank.as_deref())?,
    };

    let found = state
        .repository
        .update(update)
        .await
        .map_err(EventApiError::Persistence)?;
    if !found {
        return Err(EventApiError::NotFound);
    }

    tracing::info!(event_id = %id, "Event updated");
    Ok(Json(MessageResponse::new("event updated")))
}
