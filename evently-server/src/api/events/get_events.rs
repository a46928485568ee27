use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use evently_core::entities::SortField;
use evently_core::pagination::{PageRequest, paginate};
use evently_sdk::objects::{EventResponse, GetEventResponse, ListEventsQuery, SortDirection};

use super::{EventApiError, parse_event_id};
use crate::state::AppState;

/// `GET /events`: fetch one event by `id`, or a page of events by `type`.
///
/// `id` takes precedence. Listing requires `limit` and `page` and sorts by
/// schedule start: descending for `type=latest`, ascending otherwise.
pub(super) async fn get_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Response, EventApiError> {
    if let Some(raw_id) = query.id {
        let id = parse_event_id(&raw_id)?;
        let record = state
            .repository
            .find_by_id(id)
            .await
            .map_err(EventApiError::Persistence)?
            .ok_or(EventApiError::NotFound)?;
        return Ok(Json(GetEventResponse {
            response: EventResponse::from(&record),
        })
        .into_response());
    }

    let Some(listing_type) = query.listing_type else {
        return Err(EventApiError::InvalidRequest(
            "either `id` or `type` is required".to_string(),
        ));
    };

    let max_page_size = state.config.pagination.read().await.max_page_size;
    let request = PageRequest::from_params(
        query.page.as_deref(),
        query.limit.as_deref(),
        max_page_size,
        SortField::ScheduleStart,
        SortDirection::from_listing_type(&listing_type),
    )?;

    let page = paginate(state.repository.as_ref(), request)
        .await
        .map_err(EventApiError::Persistence)?;

    Ok(Json(page.into_response()).into_response())
}
