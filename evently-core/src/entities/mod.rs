pub mod event_records;

pub use event_records::{EventFields, EventRecord, Schedule, SortField};
