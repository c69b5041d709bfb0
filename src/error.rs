//! Error types for sqlx-sqlite-datastore

use std::sync::Arc;

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while initializing the datastore.
///
/// The one-shot initialization latch caches the first outcome — success or
/// failure — and hands it to every later caller, so this type is `Clone`.
/// SQLx sources are shared through `Arc` to keep cloning cheap.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InitError {
   /// The configured driver is not supported by this build.
   #[error("unsupported driver: {0}")]
   UnsupportedDriver(String),

   /// Opening the connection pool failed.
   #[error("failed to open database: {0}")]
   Open(Arc<sqlx::Error>),

   /// The pool opened but the liveness check failed.
   #[error("failed to ping database: {0}")]
   Ping(Arc<sqlx::Error>),

   /// The embedded schema could not be applied.
   #[error("schema migration failed: {0}")]
   Migrate(Arc<sqlx::Error>),
}

/// Errors that may occur when working with the datastore
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Initialization failed, or a cached initialization failure was
   /// observed by a later caller.
   #[error(transparent)]
   Init(#[from] InitError),

   /// The datastore was accessed before a successful `init`.
   #[error("database not initialized; call init() first")]
   NotInitialized,

   /// Failed to begin a transaction. No cleanup is needed in this case.
   #[error("failed to begin transaction: {0}")]
   BeginTransaction(#[source] sqlx::Error),

   /// Failed to commit a transaction.
   #[error("failed to commit transaction: {0}")]
   CommitTransaction(#[source] sqlx::Error),

   /// The transaction work function failed and the subsequent rollback
   /// failed as well. Both errors are preserved; neither is dropped.
   #[error("transaction failed: {work}; rollback also failed: {rollback}")]
   RollbackFailed {
      /// The error returned by the work function.
      work: Box<Error>,
      /// The error raised while rolling the transaction back.
      #[source]
      rollback: sqlx::Error,
   },

   /// Error from SQLx query execution. Standard sqlx errors are converted
   /// to this variant.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),
}

impl Error {
   /// True when an exactly-one-row query matched no rows.
   pub fn is_not_found(&self) -> bool {
      matches!(self, Error::Sqlx(sqlx::Error::RowNotFound))
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_init_error_is_cloneable() {
      let err = InitError::Open(Arc::new(sqlx::Error::RowNotFound));
      let clone = err.clone();
      assert_eq!(err.to_string(), clone.to_string());
      assert!(err.to_string().contains("failed to open database"));
   }

   #[test]
   fn test_rollback_failed_preserves_both_errors() {
      let err = Error::RollbackFailed {
         work: Box::new(Error::Sqlx(sqlx::Error::RowNotFound)),
         rollback: sqlx::Error::PoolClosed,
      };

      let message = err.to_string();
      assert!(message.contains("no rows returned"));
      assert!(message.contains("rollback also failed"));
      assert!(message.contains("closed"));
   }

   #[test]
   fn test_not_found_helper() {
      assert!(Error::Sqlx(sqlx::Error::RowNotFound).is_not_found());
      assert!(!Error::NotInitialized.is_not_found());
      assert!(!Error::BeginTransaction(sqlx::Error::PoolClosed).is_not_found());
   }

   #[test]
   fn test_stage_context_messages() {
      let ping = InitError::Ping(Arc::new(sqlx::Error::PoolTimedOut));
      assert!(ping.to_string().contains("failed to ping database"));

      let migrate = InitError::Migrate(Arc::new(sqlx::Error::PoolTimedOut));
      assert!(migrate.to_string().contains("schema migration failed"));

      let driver = InitError::UnsupportedDriver("postgres".into());
      assert!(driver.to_string().contains("postgres"));
   }
}
