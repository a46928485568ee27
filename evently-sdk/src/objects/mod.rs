pub mod event;
pub mod pagination;

pub use event::{
    CreateEventResponse, EventResponse, GetEventResponse, ListEventsQuery, ScheduleResponse,
    UpdateEventRequest,
};
pub use pagination::{PageResponse, SortDirection};

use serde::{Deserialize, Serialize};

/// Generic `{ "message": ... }` body used for acknowledgements and errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A value that may arrive either on its own or as a list.
///
/// Form encoders send a field once when there is a single value and
/// repeat it otherwise; JSON clients may do either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Flatten into an ordered sequence, preserving the original order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add another value, promoting a single value into a list.
    pub fn push(self, item: T) -> Self {
        match self {
            OneOrMany::One(first) => OneOrMany::Many(vec![first, item]),
            OneOrMany::Many(mut items) => {
                items.push(item);
                OneOrMany::Many(items)
            }
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

/// A scalar sent either as a JSON number or as text.
///
/// Form bodies only carry text, and JSON clients often quote numbers.
/// Handlers turn both into text and parse it themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    pub fn into_text(self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_or_many_deserialize() {
        let one: OneOrMany<String> = serde_json::from_str(r#""u1""#).unwrap();
        assert_eq!(one.into_vec(), vec!["u1".to_string()]);

        let many: OneOrMany<String> = serde_json::from_str(r#"["u1","u2"]"#).unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many.into_vec(), vec!["u1".to_string(), "u2".to_string()]);
    }

    #[test]
    fn test_number_or_text() {
        let number: NumberOrText = serde_json::from_str("1700000000").unwrap();
        assert_eq!(number, NumberOrText::Number(1_700_000_000.0));
        assert_eq!(number.into_text(), "1700000000");

        let quoted: NumberOrText = serde_json::from_str(r#""2.5""#).unwrap();
        assert_eq!(quoted.into_text(), "2.5");
    }

    #[test]
    fn test_one_or_many_push_keeps_order() {
        let values = OneOrMany::One(1).push(2).push(3);
        assert_eq!(values, OneOrMany::Many(vec![1, 2, 3]));
        assert!(OneOrMany::<i32>::Many(vec![]).is_empty());
    }
}
