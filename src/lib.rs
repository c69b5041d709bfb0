//! # sqlx-sqlite-datastore
//!
//! A minimal data-access layer binding an application to SQLite via SQLx:
//! it owns the process's single connection pool, bootstraps the schema once,
//! and exposes a typed query catalog that runs either against the shared
//! pool or inside an atomic transaction.
//!
//! ## Core Types
//!
//! - **[`Database`]**: Connection lifecycle manager with a one-shot
//!   initialization latch
//! - **[`Store`]**: The published shared instance — pool plus root catalog
//! - **[`Queries`]**: Typed query catalog bound to the shared pool
//! - **[`TxQueries`]**: The same catalog rebound onto one open transaction
//! - **[`DatabaseConfig`]**: Driver, DSN, verbosity, and pool settings
//! - **[`Error`]** / **[`InitError`]**: Stage-tagged error types
//!
//! ## Architecture
//!
//! - **One-shot initialization**: open, ping, schema bootstrap, and publish
//!   run at most once per [`Database`], no matter how many callers race;
//!   the first outcome (success or failure) is cached for everyone
//! - **Idempotent schema**: the embedded DDL is guarded, so restarting
//!   against an existing database is a no-op
//! - **Shared statement logic**: each query is written once, generic over
//!   the SQLx executor, and surfaced by both the pool-bound and the
//!   transaction-scoped capability
//! - **Strict transaction discipline**: exactly one of commit or rollback
//!   per unit of work, with work and rollback errors both preserved when
//!   cleanup itself fails

mod config;
mod database;
mod error;
mod queries;
mod schema;
mod transactions;

// Re-export public types
pub use config::{DatabaseConfig, LogLevel};
pub use database::{Database, Store};
pub use error::{Error, InitError, Result};
pub use queries::{Post, Queries, User};
pub use transactions::TxQueries;
