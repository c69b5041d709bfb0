//! Connection lifecycle: one-shot initialization, shared-instance access,
//! and shutdown.
//!
//! ## Architecture
//!
//! [`Database`] owns the process's single logical connection (a SQLx pool,
//! which may multiplex several physical connections) behind a one-shot
//! initialization latch. The latch is a `tokio::sync::OnceCell` holding the
//! **outcome** of initialization, so the side-effecting sequence — open,
//! ping, schema bootstrap, publish — runs at most once no matter how many
//! callers race to trigger it, and a failed first attempt is observed
//! identically by every later caller instead of being retried.
//!
//! The published [`Store`] pairs the pool with the root query capability.
//! It is read-only after construction and shared as `Arc<Store>`.
//!
//! `Database` is an explicit handle, not a hidden global: construct one per
//! process at the composition root and pass it (or the `Arc<Store>` it
//! publishes) to whatever needs store access. Tests construct independent
//! instances in isolation.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Connection, SqlitePool};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::{DatabaseConfig, LogLevel};
use crate::error::{Error, InitError, Result};
use crate::queries::Queries;
use crate::schema;

/// The published shared instance: connection pool plus root query
/// capability.
#[derive(Debug)]
pub struct Store {
   pool: SqlitePool,
   queries: Queries,
}

impl Store {
   /// The shared connection pool.
   pub fn pool(&self) -> &SqlitePool {
      &self.pool
   }

   /// The root query capability, bound to the shared pool.
   pub fn queries(&self) -> &Queries {
      &self.queries
   }
}

/// Connection lifecycle manager.
///
/// See the [module docs](self) for the initialization and sharing model.
#[derive(Debug, Default)]
pub struct Database {
   cell: OnceCell<std::result::Result<Arc<Store>, InitError>>,
}

impl Database {
   /// Creates an uninitialized lifecycle manager.
   pub fn new() -> Self {
      Self::default()
   }

   /// Initializes the datastore: open, ping, bootstrap schema, publish.
   ///
   /// Idempotent and safe under concurrent invocation. The sequence runs
   /// at most once per `Database`; concurrent and subsequent callers
   /// observe the first call's outcome — the same `Arc<Store>` on success,
   /// the same cached error on failure — without re-executing any side
   /// effects. Only the first caller's configuration takes effect.
   ///
   /// Each stage failure is reported distinctly (see [`InitError`]) and
   /// aborts the sequence; nothing is retried.
   pub async fn init(&self, config: DatabaseConfig) -> Result<Arc<Store>> {
      let outcome = self
         .cell
         .get_or_init(|| async move { open_store(config).await })
         .await;

      outcome.clone().map_err(Error::Init)
   }

   /// Like [`Database::init`], but treats failure as an unrecoverable
   /// startup fault.
   ///
   /// # Panics
   ///
   /// Panics if initialization fails. Intended only for composition roots
   /// that cannot run without a store; everything else should call `init`
   /// and handle the error.
   pub async fn must_init(&self, config: DatabaseConfig) -> Arc<Store> {
      match self.init(config).await {
         Ok(store) => store,
         Err(err) => panic!("database initialization failed: {err}"),
      }
   }

   /// Returns the published shared instance.
   ///
   /// Fails with [`Error::NotInitialized`] if no successful [`init`] has
   /// completed. Never initializes as a side effect, and never terminates
   /// the process — whether a missing store is fatal is the caller's
   /// decision.
   ///
   /// [`init`]: Database::init
   pub fn get(&self) -> Result<Arc<Store>> {
      match self.cell.get() {
         Some(Ok(store)) => Ok(Arc::clone(store)),
         _ => Err(Error::NotInitialized),
      }
   }

   /// Releases the connection pool, if one was ever published.
   ///
   /// Safe to call when nothing was initialized (a no-op). Not safe to
   /// call while other units of work hold an open transaction — drain
   /// in-flight work first.
   pub async fn shutdown(&self) -> Result<()> {
      if let Some(Ok(store)) = self.cell.get() {
         store.pool.close().await;
         debug!("database connection pool closed");
      }

      Ok(())
   }
}

/// The side-effecting initialization sequence. Runs inside the latch, so at
/// most once per `Database`.
async fn open_store(config: DatabaseConfig) -> std::result::Result<Arc<Store>, InitError> {
   match config.driver.as_str() {
      "" | "sqlite" | "sqlite3" => {}
      other => return Err(InitError::UnsupportedDriver(other.to_string())),
   }

   let mut options = SqliteConnectOptions::from_str(&config.dsn)
      .map_err(|e| InitError::Open(Arc::new(e)))?
      .create_if_missing(true)
      .foreign_keys(true)
      .busy_timeout(Duration::from_secs(5));

   if !config.is_memory() {
      options = options.journal_mode(SqliteJournalMode::Wal);
   }

   // Each in-memory SQLite connection is its own database, so :memory:
   // pins the pool to one connection that never expires.
   let pool_options = if config.is_memory() {
      SqlitePoolOptions::new()
         .max_connections(1)
         .min_connections(1)
         .idle_timeout(None)
         .max_lifetime(None)
   } else {
      SqlitePoolOptions::new()
         .max_connections(config.max_connections)
         .idle_timeout(config.idle_timeout)
   };

   let pool = pool_options
      .connect_with(options)
      .await
      .map_err(|e| InitError::Open(Arc::new(e)))?;

   ping(&pool).await.map_err(|e| InitError::Ping(Arc::new(e)))?;

   schema::bootstrap(&pool)
      .await
      .map_err(|e| InitError::Migrate(Arc::new(e)))?;

   if config.log_level != LogLevel::Silent {
      info!(dsn = %config.dsn, "sqlite database connected");
   }

   let queries = Queries::new(pool.clone());
   Ok(Arc::new(Store { pool, queries }))
}

/// Liveness check: round-trips one pooled connection.
async fn ping(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
   let mut conn = pool.acquire().await?;
   conn.ping().await
}
