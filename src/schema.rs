//! Embedded schema bootstrap.
//!
//! The DDL is compiled into the binary via `include_str!`, so the schema
//! ships with the code and cannot drift from the queries that depend on it.

use sqlx::SqlitePool;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Applies the embedded schema to the database.
///
/// Every statement in the script is guarded (`IF NOT EXISTS`), so running
/// this against an already-bootstrapped database is a no-op rather than an
/// error. Failures are fatal to startup and are never retried here.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<(), sqlx::Error> {
   sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
   tracing::debug!("schema bootstrap complete");
   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;
   use sqlx::sqlite::SqlitePoolOptions;

   async fn memory_pool() -> SqlitePool {
      SqlitePoolOptions::new()
         .max_connections(1)
         .connect(":memory:")
         .await
         .expect("should open in-memory database")
   }

   #[tokio::test]
   async fn test_bootstrap_creates_tables() {
      let pool = memory_pool().await;
      bootstrap(&pool).await.expect("bootstrap should succeed");

      let (count,): (i64,) = sqlx::query_as(
         "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'posts')",
      )
      .fetch_one(&pool)
      .await
      .expect("should query sqlite_master");

      assert_eq!(count, 2);
   }

   #[tokio::test]
   async fn test_bootstrap_is_idempotent() {
      let pool = memory_pool().await;

      bootstrap(&pool).await.expect("first run should succeed");
      bootstrap(&pool).await.expect("second run should succeed");

      // No duplicated indexes either
      let (count,): (i64,) = sqlx::query_as(
         "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_posts_user_id'",
      )
      .fetch_one(&pool)
      .await
      .expect("should query sqlite_master");

      assert_eq!(count, 1);
   }
}
