use sqlx::PgPool;

/// Executes SQL query objects against the shared connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
