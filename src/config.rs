//! Configuration for datastore initialization

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Log verbosity for datastore diagnostics.
///
/// This only gates the success message emitted after the database connects.
/// It never changes control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
   /// No diagnostic output.
   Silent,
   /// Errors only.
   Error,
   /// Errors and warnings.
   Warn,
   /// Full informational output.
   Info,
}

/// Configuration for [`Database::init`](crate::Database::init).
///
/// Immutable by convention: construct it once, hand it to `init`, and never
/// mutate it afterwards. Only the first caller's configuration takes effect
/// when multiple callers race to initialize.
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_datastore::DatabaseConfig;
/// use std::time::Duration;
///
/// // Use defaults
/// let config = DatabaseConfig::default();
///
/// // Override just one field
/// let config = DatabaseConfig {
///     dsn: "data/app.db".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
   /// Backing-store driver selector.
   ///
   /// `"sqlite"` and the historical alias `"sqlite3"` are supported; an
   /// empty string defaults to `"sqlite"`. Any other value fails
   /// initialization with an unsupported-driver error.
   pub driver: String,

   /// Database file path, or `:memory:` for an ephemeral in-memory store.
   pub dsn: String,

   /// Diagnostic verbosity. See [`LogLevel`].
   pub log_level: LogLevel,

   /// Maximum number of pooled connections.
   ///
   /// Ignored for `:memory:` targets, which are pinned to a single
   /// connection.
   ///
   /// Default: 6
   pub max_connections: u32,

   /// Idle timeout for pooled connections.
   ///
   /// Connections idle longer than this are closed automatically.
   ///
   /// Default: 30 seconds
   pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
   fn default() -> Self {
      Self {
         driver: "sqlite".into(),
         dsn: "app.db".into(),
         log_level: LogLevel::Error,
         max_connections: 6,
         idle_timeout: Duration::from_secs(30),
      }
   }
}

impl DatabaseConfig {
   /// Configuration for an ephemeral in-memory database, useful in tests.
   pub fn in_memory() -> Self {
      Self {
         dsn: ":memory:".into(),
         log_level: LogLevel::Silent,
         ..Default::default()
      }
   }

   pub(crate) fn is_memory(&self) -> bool {
      self.dsn == ":memory:"
   }
}
