//! HTTP API.

pub mod events;
mod extractors;
