//! Offset-based pagination over sorted event records.

use crate::entities::{EventRecord, SortField};
use crate::entities::event_records::ListEventRecords;
use crate::repository::EventRepository;
use evently_sdk::objects::{EventResponse, PageResponse, SortDirection};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("missing `{0}` parameter")]
    Missing(&'static str),
    #[error("`{name}` must be a positive integer, got {value:?}")]
    NotPositive { name: &'static str, value: String },
    #[error("page {page_number} is out of range for page size {page_size}")]
    OutOfRange { page_number: i64, page_size: i64 },
}

/// A validated pagination request. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: i64,
    page_size: i64,
    offset: i64,
    pub sort_field: SortField,
    pub direction: SortDirection,
}

impl PageRequest {
    pub fn new(
        page_number: i64,
        page_size: i64,
        sort_field: SortField,
        direction: SortDirection,
    ) -> Result<Self, PaginationError> {
        if page_number < 1 {
            return Err(PaginationError::NotPositive {
                name: "page",
                value: page_number.to_string(),
            });
        }
        if page_size < 1 {
            return Err(PaginationError::NotPositive {
                name: "limit",
                value: page_size.to_string(),
            });
        }
        let offset = page_size
            .checked_mul(page_number - 1)
            .ok_or(PaginationError::OutOfRange {
                page_number,
                page_size,
            })?;
        Ok(Self {
            page_number,
            page_size,
            offset,
            sort_field,
            direction,
        })
    }

    /// Build a request from raw query values, clamping the page size to
    /// `max_page_size`.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        max_page_size: i64,
        sort_field: SortField,
        direction: SortDirection,
    ) -> Result<Self, PaginationError> {
        let page_number = parse_positive("page", page)?;
        let page_size = parse_positive("limit", limit)?.min(max_page_size.max(1));
        Self::new(page_number, page_size, sort_field, direction)
    }

    pub fn page_number(&self) -> i64 {
        self.page_number
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of records skipped before the window starts.
    pub fn offset(&self) -> i64 {
        self.offset
    }
}

fn parse_positive(name: &'static str, raw: Option<&str>) -> Result<i64, PaginationError> {
    let raw = raw.ok_or(PaginationError::Missing(name))?;
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(PaginationError::NotPositive {
            name,
            value: raw.to_owned(),
        }),
    }
}

/// One page window plus page metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl Page<EventRecord> {
    pub fn into_response(self) -> PageResponse<EventResponse> {
        PageResponse {
            data: self.items.iter().map(EventResponse::from).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

/// `ceil(total_items / page_size)`.
pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total_items <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

/// Fetch the page window described by `request`.
///
/// The total count covers every stored record, independent of the window.
pub async fn paginate(
    repository: &dyn EventRepository,
    request: PageRequest,
) -> Result<Page<EventRecord>, sqlx::Error> {
    let items = repository
        .list(ListEventRecords {
            sort_field: request.sort_field,
            direction: request.direction,
            limit: request.page_size,
            offset: request.offset,
        })
        .await?;
    let total_items = repository.count().await?;

    Ok(Page {
        items,
        page_number: request.page_number,
        page_size: request.page_size,
        total_pages: total_pages(total_items, request.page_size),
        total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::event_records::InsertEventRecord;
    use crate::entities::{EventFields, Schedule};
    use crate::repository::MemoryEventRepository;

    async fn seeded(starts: &[f64]) -> MemoryEventRepository {
        let repo = MemoryEventRepository::new();
        for start in starts {
            repo.insert(InsertEventRecord {
                fields: EventFields {
                    schedule: Schedule {
                        start: Some(*start),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                files: vec![],
            })
            .await
            .unwrap();
        }
        repo
    }

    fn starts(page: &Page<EventRecord>) -> Vec<f64> {
        page.items.iter().filter_map(|r| r.schedule.start).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(5, 2), 3);
        assert_eq!(total_pages(4, 2), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn test_offset() {
        let request =
            PageRequest::new(3, 20, SortField::ScheduleStart, SortDirection::Ascending).unwrap();
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn test_from_params_validation() {
        let build = |page, limit| {
            PageRequest::from_params(
                page,
                limit,
                200,
                SortField::ScheduleStart,
                SortDirection::Ascending,
            )
        };
        assert_eq!(build(None, Some("2")), Err(PaginationError::Missing("page")));
        assert_eq!(build(Some("1"), None), Err(PaginationError::Missing("limit")));
        assert!(matches!(
            build(Some("abc"), Some("2")),
            Err(PaginationError::NotPositive { name: "page", .. })
        ));
        assert!(matches!(
            build(Some("1"), Some("0")),
            Err(PaginationError::NotPositive { name: "limit", .. })
        ));
        assert!(matches!(
            build(Some("-1"), Some("5")),
            Err(PaginationError::NotPositive { name: "page", .. })
        ));
        assert_eq!(build(Some("2"), Some("1000")).unwrap().page_size(), 200);
    }

    #[test]
    fn test_offset_overflow_is_rejected() {
        let result = PageRequest::new(
            i64::MAX,
            i64::MAX,
            SortField::ScheduleStart,
            SortDirection::Ascending,
        );
        assert!(matches!(result, Err(PaginationError::OutOfRange { .. })));
    }

    #[tokio::test]
    async fn test_first_page_ascending() {
        let repo = seeded(&[30.0, 10.0, 50.0, 20.0, 40.0]).await;
        let request =
            PageRequest::new(1, 2, SortField::ScheduleStart, SortDirection::Ascending).unwrap();
        let page = paginate(&repo, request).await.unwrap();

        assert_eq!(starts(&page), vec![10.0, 20.0]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, 2);
    }

    #[tokio::test]
    async fn test_latest_is_descending() {
        let repo = seeded(&[30.0, 10.0, 50.0, 20.0, 40.0]).await;
        let request =
            PageRequest::new(1, 5, SortField::ScheduleStart, SortDirection::Descending).unwrap();
        let page = paginate(&repo, request).await.unwrap();
        assert_eq!(starts(&page), vec![50.0, 40.0, 30.0, 20.0, 10.0]);
    }

    #[tokio::test]
    async fn test_window_lengths() {
        let repo = seeded(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).await;
        for page_size in 1..=8_i64 {
            for page_number in 1..=9_i64 {
                let request = PageRequest::new(
                    page_number,
                    page_size,
                    SortField::ScheduleStart,
                    SortDirection::Ascending,
                )
                .unwrap();
                let page = paginate(&repo, request).await.unwrap();
                let expected = page_size.min((7 - page_size * (page_number - 1)).max(0));
                assert_eq!(page.items.len() as i64, expected);
                assert_eq!(page.total_pages, (7 + page_size - 1) / page_size);
            }
        }
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let repo = seeded(&[1.0, 2.0]).await;
        let request =
            PageRequest::new(4, 2, SortField::ScheduleStart, SortDirection::Ascending).unwrap();
        let page = paginate(&repo, request).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 2);
        assert_eq!(page.total_pages, 1);
    }
}
