//! Event API request and response types.

use super::NumberOrText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full event record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub uid: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: ScheduleResponse,
    pub description: Option<String>,
    pub files: Vec<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<f64>,
    pub attendees: Vec<String>,
}

/// Schedule sub-object. Every field is independently optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleResponse {
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub date: Option<time::OffsetDateTime>,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Response for `GET /events?id=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEventResponse {
    pub response: EventResponse,
}

/// Response for `POST /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub message: String,
    #[serde(rename = "eventId")]
    pub event_id: Uuid,
}

/// Query string of `GET /events`.
///
/// Values are kept as raw strings so the handler can report malformed
/// numbers with its own error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsQuery {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// Body of `PUT /events`, sent as JSON or as a urlencoded form.
///
/// Absent fields are left untouched. `start`, `end` and `date` together
/// replace the whole schedule when any one of them is present. Numeric
/// fields and `date` are kept raw and parsed by the handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub start: Option<NumberOrText>,
    pub end: Option<NumberOrText>,
    pub date: Option<NumberOrText>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<NumberOrText>,
}
