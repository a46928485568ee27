use crate::framework::DatabaseProcessor;
use evently_sdk::objects::{EventResponse, ScheduleResponse, SortDirection};
use kanau::processor::Processor;
use std::cmp::Ordering;
use uuid::Uuid;

/// A stored event (or article) record.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: Uuid,
    pub kind: Option<String>,
    pub uid: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: Schedule,
    pub description: Option<String>,
    /// Media URLs, in upload order.
    pub files: Vec<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<f64>,
    pub attendees: Vec<String>,
    pub created_at: time::OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Schedule {
    pub date: Option<time::OffsetDateTime>,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.start.is_none() && self.end.is_none()
    }
}

impl From<&EventRecord> for EventResponse {
    fn from(record: &EventRecord) -> Self {
        EventResponse {
            id: record.id,
            kind: record.kind.clone(),
            uid: record.uid.clone(),
            name: record.name.clone(),
            tagline: record.tagline.clone(),
            schedule: ScheduleResponse {
                date: record.schedule.date,
                start: record.schedule.start,
                end: record.schedule.end,
            },
            description: record.description.clone(),
            files: record.files.clone(),
            moderator: record.moderator.clone(),
            category: record.category.clone(),
            sub_category: record.sub_category.clone(),
            rigor_rank: record.rigor_rank,
            attendees: record.attendees.clone(),
        }
    }
}

/// Caller-supplied fields of a new event.
///
/// `files` and `attendees` are not part of this: the former comes from
/// the upload pipeline, the latter always starts empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventFields {
    pub kind: Option<String>,
    pub uid: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: Schedule,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    kind: Option<String>,
    uid: Option<String>,
    name: Option<String>,
    tagline: Option<String>,
    schedule_date: Option<time::OffsetDateTime>,
    schedule_start: Option<f64>,
    schedule_end: Option<f64>,
    description: Option<String>,
    files: Vec<String>,
    moderator: Option<String>,
    category: Option<String>,
    sub_category: Option<String>,
    rigor_rank: Option<f64>,
    attendees: Vec<String>,
    created_at: time::OffsetDateTime,
}

impl From<EventRow> for EventRecord {
    fn from(row: EventRow) -> Self {
        EventRecord {
            id: row.id,
            kind: row.kind,
            uid: row.uid,
            name: row.name,
            tagline: row.tagline,
            schedule: Schedule {
                date: row.schedule_date,
                start: row.schedule_start,
                end: row.schedule_end,
            },
            description: row.description,
            files: row.files,
            moderator: row.moderator,
            category: row.category,
            sub_category: row.sub_category,
            rigor_rank: row.rigor_rank,
            attendees: row.attendees,
            created_at: row.created_at,
        }
    }
}

const EVENT_COLUMNS: &str = "id, kind, uid, name, tagline, schedule_date, schedule_start, \
    schedule_end, description, files, moderator, category, sub_category, rigor_rank, \
    attendees, created_at";

/// Field a page window is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    ScheduleStart,
    ScheduleDate,
    Name,
    RigorRank,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::ScheduleStart => "schedule_start",
            SortField::ScheduleDate => "schedule_date",
            SortField::Name => "name",
            SortField::RigorRank => "rigor_rank",
        }
    }

    /// Compare two records the way the database orders them: missing keys
    /// sort first when ascending and last when descending, ties fall back
    /// to the id in the same direction.
    pub fn compare(self, a: &EventRecord, b: &EventRecord, direction: SortDirection) -> Ordering {
        let by_key = match self {
            SortField::ScheduleStart => {
                cmp_option(a.schedule.start, b.schedule.start, |x, y| x.total_cmp(&y))
            }
            SortField::ScheduleDate => {
                cmp_option(a.schedule.date, b.schedule.date, |x, y| x.cmp(&y))
            }
            SortField::Name => cmp_option(a.name.as_deref(), b.name.as_deref(), |x, y| x.cmp(y)),
            SortField::RigorRank => {
                cmp_option(a.rigor_rank, b.rigor_rank, |x, y| x.total_cmp(&y))
            }
        };
        let ordering = by_key.then_with(|| a.id.cmp(&b.id));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn cmp_option<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => cmp(x, y),
    }
}

#[derive(Debug, Clone)]
/// Insert a new event. The record's `attendees` always starts empty.
pub struct InsertEventRecord {
    pub fields: EventFields,
    pub files: Vec<String>,
}

impl Processor<InsertEventRecord> for DatabaseProcessor {
    type Output = EventRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertEventRecord")]
    async fn process(&self, insert: InsertEventRecord) -> Result<EventRecord, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO events
                (id, kind, uid, name, tagline, schedule_date, schedule_start, schedule_end,
                 description, files, moderator, category, sub_category, rigor_rank, attendees)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let fields = insert.fields;
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(fields.kind)
            .bind(fields.uid)
            .bind(fields.name)
            .bind(fields.tagline)
            .bind(fields.schedule.date)
            .bind(fields.schedule.start)
            .bind(fields.schedule.end)
            .bind(fields.description)
            .bind(insert.files)
            .bind(fields.moderator)
            .bind(fields.category)
            .bind(fields.sub_category)
            .bind(fields.rigor_rank)
            .bind(Vec::<String>::new())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }
}

#[derive(Debug, Clone)]
pub struct GetEventRecordById {
    pub id: Uuid,
}

impl Processor<GetEventRecordById> for DatabaseProcessor {
    type Output = Option<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventRecordById")]
    async fn process(&self, query: GetEventRecordById) -> Result<Option<EventRecord>, sqlx::Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }
}

#[derive(Debug, Clone, Default)]
/// Replace the provided fields of an event.
///
/// `schedule`, when present, replaces all three schedule columns at once.
/// `files` and `attendees` are not updatable.
pub struct UpdateEventRecord {
    pub id: Uuid,
    pub kind: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub schedule: Option<Schedule>,
    pub description: Option<String>,
    pub moderator: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub rigor_rank: Option<f64>,
}

impl UpdateEventRecord {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn has_changes(&self) -> bool {
        self.kind.is_some()
            || self.name.is_some()
            || self.tagline.is_some()
            || self.schedule.is_some()
            || self.description.is_some()
            || self.moderator.is_some()
            || self.category.is_some()
            || self.sub_category.is_some()
            || self.rigor_rank.is_some()
    }

    /// Apply the changes to an in-memory record.
    pub fn apply_to(self, record: &mut EventRecord) {
        if let Some(kind) = self.kind {
            record.kind = Some(kind);
        }
        if let Some(name) = self.name {
            record.name = Some(name);
        }
        if let Some(tagline) = self.tagline {
            record.tagline = Some(tagline);
        }
        if let Some(schedule) = self.schedule {
            record.schedule = schedule;
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(moderator) = self.moderator {
            record.moderator = Some(moderator);
        }
        if let Some(category) = self.category {
            record.category = Some(category);
        }
        if let Some(sub_category) = self.sub_category {
            record.sub_category = Some(sub_category);
        }
        if let Some(rigor_rank) = self.rigor_rank {
            record.rigor_rank = Some(rigor_rank);
        }
    }
}

impl Processor<UpdateEventRecord> for DatabaseProcessor {
    /// Whether a record with the given id exists.
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateEventRecord")]
    async fn process(&self, update: UpdateEventRecord) -> Result<bool, sqlx::Error> {
        if !update.has_changes() {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
                    .bind(update.id)
                    .fetch_one(&self.pool)
                    .await?;
            return Ok(exists);
        }

        let mut query_builder = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE events SET ");
        {
            let mut set = query_builder.separated(", ");
            if let Some(kind) = update.kind {
                set.push("kind = ").push_bind_unseparated(kind);
            }
            if let Some(name) = update.name {
                set.push("name = ").push_bind_unseparated(name);
            }
            if let Some(tagline) = update.tagline {
                set.push("tagline = ").push_bind_unseparated(tagline);
            }
            if let Some(schedule) = update.schedule {
                set.push("schedule_date = ").push_bind_unseparated(schedule.date);
                set.push("schedule_start = ").push_bind_unseparated(schedule.start);
                set.push("schedule_end = ").push_bind_unseparated(schedule.end);
            }
            if let Some(description) = update.description {
                set.push("description = ").push_bind_unseparated(description);
            }
            if let Some(moderator) = update.moderator {
                set.push("moderator = ").push_bind_unseparated(moderator);
            }
            if let Some(category) = update.category {
                set.push("category = ").push_bind_unseparated(category);
            }
            if let Some(sub_category) = update.sub_category {
                set.push("sub_category = ").push_bind_unseparated(sub_category);
            }
            if let Some(rigor_rank) = update.rigor_rank {
                set.push("rigor_rank = ").push_bind_unseparated(rigor_rank);
            }
        }
        query_builder.push(" WHERE id = ").push_bind(update.id);

        let result = query_builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteEventRecord {
    pub id: Uuid,
}

impl Processor<DeleteEventRecord> for DatabaseProcessor {
    /// Whether a record was removed.
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteEventRecord")]
    async fn process(&self, delete: DeleteEventRecord) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(delete.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
/// Fetch one sorted window of events.
pub struct ListEventRecords {
    pub sort_field: SortField,
    pub direction: SortDirection,
    pub limit: i64,
    pub offset: i64,
}

impl Processor<ListEventRecords> for DatabaseProcessor {
    type Output = Vec<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListEventRecords")]
    async fn process(&self, query: ListEventRecords) -> Result<Vec<EventRecord>, sqlx::Error> {
        let order = match query.direction {
            SortDirection::Ascending => "ASC NULLS FIRST",
            SortDirection::Descending => "DESC NULLS LAST",
        };
        let id_order = match query.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY {} {order}, id {id_order} LIMIT $1 OFFSET $2",
            query.sort_field.column(),
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountEventRecords;

impl Processor<CountEventRecords> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountEventRecords")]
    async fn process(&self, _query: CountEventRecords) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u128, start: Option<f64>) -> EventRecord {
        EventRecord {
            id: Uuid::from_u128(id),
            kind: None,
            uid: None,
            name: None,
            tagline: None,
            schedule: Schedule {
                date: None,
                start,
                end: None,
            },
            description: None,
            files: vec![],
            moderator: None,
            category: None,
            sub_category: None,
            rigor_rank: None,
            attendees: vec![],
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_missing_keys_sort_first_ascending() {
        let mut records = vec![record(1, Some(5.0)), record(2, None), record(3, Some(1.0))];
        records.sort_by(|a, b| SortField::ScheduleStart.compare(a, b, SortDirection::Ascending));
        let ids: Vec<_> = records.iter().map(|r| r.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        records.sort_by(|a, b| SortField::ScheduleStart.compare(a, b, SortDirection::Descending));
        let ids: Vec<_> = records.iter().map(|r| r.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_ties_fall_back_to_id() {
        let mut records = vec![record(2, Some(1.0)), record(1, Some(1.0))];
        records.sort_by(|a, b| SortField::ScheduleStart.compare(a, b, SortDirection::Ascending));
        assert_eq!(records[0].id.as_u128(), 1);
        records.sort_by(|a, b| SortField::ScheduleStart.compare(a, b, SortDirection::Descending));
        assert_eq!(records[0].id.as_u128(), 2);
    }

    #[test]
    fn test_schedule_update_replaces_whole_schedule() {
        let mut stored = record(1, Some(10.0));
        stored.schedule.end = Some(20.0);
        stored.name = Some("Original".to_string());

        let mut update = UpdateEventRecord::new(stored.id);
        update.schedule = Some(Schedule {
            date: None,
            start: Some(30.0),
            end: None,
        });
        assert!(update.has_changes());
        update.apply_to(&mut stored);

        assert_eq!(stored.schedule.start, Some(30.0));
        assert_eq!(stored.schedule.end, None);
        assert_eq!(stored.name.as_deref(), Some("Original"));
    }

    #[test]
    fn test_empty_update_has_no_changes() {
        assert!(!UpdateEventRecord::new(Uuid::nil()).has_changes());
    }
}
