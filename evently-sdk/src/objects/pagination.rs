//! Pagination request and response types.

use serde::{Deserialize, Serialize};

/// Direction in which a page window is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Map the listing `type` query value onto a direction.
    ///
    /// `"latest"` means newest first; every other value means oldest first.
    pub fn from_listing_type(listing_type: &str) -> Self {
        if listing_type == "latest" {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

/// One page of results together with page metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub page_number: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_items: i64,
}
