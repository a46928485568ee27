use super::EventRepository;
use crate::entities::EventRecord;
use crate::entities::event_records::{InsertEventRecord, ListEventRecords, UpdateEventRecord};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local repository, mainly for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryEventRepository {
    records: RwLock<Vec<EventRecord>>,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record in insertion order.
    pub async fn all(&self) -> Vec<EventRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn insert(&self, insert: InsertEventRecord) -> Result<EventRecord, sqlx::Error> {
        let fields = insert.fields;
        let record = EventRecord {
            id: Uuid::now_v7(),
            kind: fields.kind,
            uid: fields.uid,
            name: fields.name,
            tagline: fields.tagline,
            schedule: fields.schedule,
            description: fields.description,
            files: insert.files,
            moderator: fields.moderator,
            category: fields.category,
            sub_category: fields.sub_category,
            rigor_rank: fields.rigor_rank,
            attendees: Vec::new(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EventRecord>, sqlx::Error> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn update(&self, update: UpdateEventRecord) -> Result<bool, sqlx::Error> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == update.id) else {
            return Ok(false);
        };
        update.apply_to(record);
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn list(&self, query: ListEventRecords) -> Result<Vec<EventRecord>, sqlx::Error> {
        let mut sorted = self.records.read().await.clone();
        sorted.sort_by(|a, b| query.sort_field.compare(a, b, query.direction));
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(sorted.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        let records = self.records.read().await;
        Ok(i64::try_from(records.len()).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EventFields, Schedule, SortField};
    use evently_sdk::objects::SortDirection;

    fn named(name: &str, start: f64) -> InsertEventRecord {
        InsertEventRecord {
            fields: EventFields {
                name: Some(name.to_string()),
                schedule: Schedule {
                    start: Some(start),
                    ..Default::default()
                },
                ..Default::default()
            },
            files: vec![format!("https://cdn.test/{name}.png")],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids_and_empty_attendees() {
        let repo = MemoryEventRepository::new();
        let a = repo.insert(named("a", 1.0)).await.unwrap();
        let b = repo.insert(named("b", 2.0)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.attendees.is_empty());
        assert_eq!(repo.find_by_id(b.id).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn test_update_missing_record_reports_false() {
        let repo = MemoryEventRepository::new();
        let mut update = UpdateEventRecord::new(Uuid::now_v7());
        update.name = Some("renamed".to_string());
        assert!(!repo.update(update).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = MemoryEventRepository::new();
        let a = repo.insert(named("a", 1.0)).await.unwrap();
        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_window() {
        let repo = MemoryEventRepository::new();
        for (name, start) in [("c", 3.0), ("a", 1.0), ("e", 5.0), ("b", 2.0), ("d", 4.0)] {
            repo.insert(named(name, start)).await.unwrap();
        }
        let page = repo
            .list(ListEventRecords {
                sort_field: SortField::ScheduleStart,
                direction: SortDirection::Descending,
                limit: 2,
                offset: 2,
            })
            .await
            .unwrap();
        let names: Vec<_> = page.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }
}
