//! Custom Axum extractors.
//!
//! Provides `EventUpload`, which reads a `multipart/form-data` event
//! creation request into typed fields plus the attached media, and
//! `UpdateBody`, which accepts an update as JSON or as a urlencoded form.

use axum::Json;
use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header;
use evently_core::entities::{EventFields, Schedule};
use evently_core::fields::{parse_date, parse_number};
use evently_core::upload::MediaInput;
use evently_sdk::objects::{OneOrMany, UpdateEventRequest};
use std::collections::HashMap;

use crate::api::events::EventApiError;
use crate::state::AppState;

/// Form field names that carry media parts.
const MEDIA_FIELDS: [&str; 2] = ["files", "files[]"];

/// A parsed event creation request.
///
/// Media parts keep the order they appear in the body. `attendees` is
/// accepted but discarded: new events always start without attendees.
#[derive(Debug)]
pub struct EventUpload {
    pub fields: EventFields,
    /// `None` when the request carried no media part at all.
    pub media: Option<OneOrMany<MediaInput>>,
}

impl FromRequest<AppState> for EventUpload {
    type Rejection = EventApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| EventApiError::InvalidRequest(e.body_text()))?;

        let mut text: HashMap<String, String> = HashMap::new();
        let mut media: Option<OneOrMany<MediaInput>> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| EventApiError::InvalidRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            if MEDIA_FIELDS.contains(&name.as_str()) {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| EventApiError::InvalidRequest(e.body_text()))?;
                let input = MediaInput { file_name, bytes };
                media = Some(match media {
                    None => OneOrMany::One(input),
                    Some(existing) => existing.push(input),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| EventApiError::InvalidRequest(e.body_text()))?;
                text.insert(name, value);
            }
        }

        let fields = event_fields(text)?;
        Ok(EventUpload { fields, media })
    }
}

fn event_fields(mut text: HashMap<String, String>) -> Result<EventFields, EventApiError> {
    let schedule = Schedule {
        date: parse_date("date", text.get("date").map(String::as_str))?,
        start: parse_number("start", text.get("start").map(String::as_str))?,
        end: parse_number("end", text.get("end").map(String::as_str))?,
    };
    let rigor_rank = parse_number("rigor_rank", text.get("rigor_rank").map(String::as_str))?;

    Ok(EventFields {
        kind: text.remove("type"),
        uid: text.remove("uid"),
        name: text.remove("name"),
        tagline: text.remove("tagline"),
        schedule,
        description: text.remove("description"),
        moderator: text.remove("moderator"),
        category: text.remove("category"),
        sub_category: text.remove("sub_category"),
        rigor_rank,
    })
}

/// Body of an event update.
///
/// `application/x-www-form-urlencoded` requests are read as a form, all
/// others as JSON.
#[derive(Debug)]
pub struct UpdateBody(pub UpdateEventRequest);

impl FromRequest<AppState> for UpdateBody {
    type Rejection = EventApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            let Form(body) = Form::<UpdateEventRequest>::from_request(req, state)
                .await
                .map_err(|e| EventApiError::InvalidRequest(e.body_text()))?;
            body
        } else {
            let Json(body) = Json::<UpdateEventRequest>::from_request(req, state)
                .await
                .map_err(|e| EventApiError::InvalidRequest(e.body_text()))?;
            body
        };
        Ok(UpdateBody(body))
    }
}
