//! Event persistence.
//!
//! [`EventRepository`] is the seam between the request handlers and the
//! storage backend. [`PgEventRepository`] runs the SQL query objects from
//! [`crate::entities::event_records`]; [`MemoryEventRepository`] keeps
//! records in process memory with the same ordering rules.

mod memory;

pub use memory::MemoryEventRepository;

use crate::entities::EventRecord;
use crate::entities::event_records::{
    CountEventRecords, DeleteEventRecord, GetEventRecordById, InsertEventRecord,
    ListEventRecords, UpdateEventRecord,
};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use uuid::Uuid;

/// Storage operations over event records keyed by id.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, insert: InsertEventRecord) -> Result<EventRecord, sqlx::Error>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EventRecord>, sqlx::Error>;

    /// Returns `false` when no record has the given id.
    async fn update(&self, update: UpdateEventRecord) -> Result<bool, sqlx::Error>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    async fn list(&self, query: ListEventRecords) -> Result<Vec<EventRecord>, sqlx::Error>;

    async fn count(&self) -> Result<i64, sqlx::Error>;
}

/// PostgreSQL-backed repository.
pub struct PgEventRepository {
    processor: DatabaseProcessor,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert(&self, insert: InsertEventRecord) -> Result<EventRecord, sqlx::Error> {
        self.processor.process(insert).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EventRecord>, sqlx::Error> {
        self.processor.process(GetEventRecordById { id }).await
    }

    async fn update(&self, update: UpdateEventRecord) -> Result<bool, sqlx::Error> {
        self.processor.process(update).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        self.processor.process(DeleteEventRecord { id }).await
    }

    async fn list(&self, query: ListEventRecords) -> Result<Vec<EventRecord>, sqlx::Error> {
        self.processor.process(query).await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        self.processor.process(CountEventRecords).await
    }
}
