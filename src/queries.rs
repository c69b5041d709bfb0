//! Typed query catalog.
//!
//! Each predefined statement is exposed as one strongly typed method, with
//! its cardinality contract reflected in the return shape: exactly-one-row
//! methods return the value (failing with a `RowNotFound` condition when no
//! row matches), zero-or-more methods return a `Vec`, and no-result methods
//! return only the affected-row count.
//!
//! Per-statement logic lives once, in free functions generic over
//! [`sqlx::SqliteExecutor`]. The pool-bound [`Queries`] facade and the
//! transaction-scoped [`TxQueries`](crate::TxQueries) facade both delegate
//! to those functions, so rebinding the catalog onto a transaction never
//! duplicates a statement.

use serde::Serialize;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::Result;
use crate::transactions::TxQueries;

/// A registered user row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
   pub id: i64,
   pub username: String,
   pub display_name: String,
   pub email: String,
   pub created_at: String,
   pub updated_at: String,
}

/// A post row, owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Post {
   pub id: i64,
   pub user_id: i64,
   pub title: String,
   pub body: String,
   pub created_at: String,
}

/// Root query capability, bound to the shared connection pool.
///
/// Cloning is cheap (the pool is reference-counted), but the catalog itself
/// is normally reached through the published [`Store`](crate::Store).
#[derive(Debug, Clone)]
pub struct Queries {
   pool: SqlitePool,
}

impl Queries {
   pub(crate) fn new(pool: SqlitePool) -> Self {
      Self { pool }
   }

   /// Rebinds the catalog onto an open transaction.
   ///
   /// The returned [`TxQueries`] exposes the same method set as `self`, but
   /// every call executes inside the transaction's context. It is owned by
   /// one unit of work and is never shared across transactions.
   pub fn with_tx(&self, tx: Transaction<'static, Sqlite>) -> TxQueries {
      TxQueries::new(tx)
   }

   /// Inserts a user and returns the created row. Exactly-one-row.
   pub async fn create_user(
      &self,
      username: &str,
      display_name: &str,
      email: &str,
   ) -> Result<User> {
      sql::create_user(&self.pool, username, display_name, email).await
   }

   /// Fetches a user by id. Exactly-one-row: absent ids surface as a
   /// `RowNotFound` condition, never as a zero-valued row.
   pub async fn get_user(&self, id: i64) -> Result<User> {
      sql::get_user(&self.pool, id).await
   }

   /// Fetches a user by unique username. Exactly-one-row.
   pub async fn get_user_by_username(&self, username: &str) -> Result<User> {
      sql::get_user_by_username(&self.pool, username).await
   }

   /// Lists all users ordered by id. Zero-or-more-rows.
   pub async fn list_users(&self) -> Result<Vec<User>> {
      sql::list_users(&self.pool).await
   }

   /// Inserts or updates a user by username and returns the stored row.
   ///
   /// On conflict, an empty incoming `display_name` or `email` is treated
   /// as "no change": the existing stored value wins. This is a deliberate
   /// convention of the catalog, not an accident of the SQL.
   pub async fn upsert_user(
      &self,
      username: &str,
      display_name: &str,
      email: &str,
   ) -> Result<User> {
      sql::upsert_user(&self.pool, username, display_name, email).await
   }

   /// Deletes a user by id, returning the affected-row count.
   /// No-result-expected.
   pub async fn delete_user(&self, id: i64) -> Result<u64> {
      sql::delete_user(&self.pool, id).await
   }

   /// Inserts a post for a user and returns the created row.
   /// Exactly-one-row.
   pub async fn create_post(&self, user_id: i64, title: &str, body: &str) -> Result<Post> {
      sql::create_post(&self.pool, user_id, title, body).await
   }

   /// Lists a user's posts ordered by id. Zero-or-more-rows.
   pub async fn list_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
      sql::list_posts_by_user(&self.pool, user_id).await
   }
}

/// Executor-generic statement implementations, shared by [`Queries`] and
/// [`TxQueries`].
pub(crate) mod sql {
   use sqlx::SqliteExecutor;

   use super::{Post, User};
   use crate::Result;

   const USER_COLUMNS: &str = "id, username, display_name, email, created_at, updated_at";
   const POST_COLUMNS: &str = "id, user_id, title, body, created_at";

   pub(crate) async fn create_user<'e, E>(
      db: E,
      username: &str,
      display_name: &str,
      email: &str,
   ) -> Result<User>
   where
      E: SqliteExecutor<'e>,
   {
      let user = sqlx::query_as(&format!(
         "INSERT INTO users (username, display_name, email)
          VALUES ($1, $2, $3)
          RETURNING {USER_COLUMNS}"
      ))
      .bind(username)
      .bind(display_name)
      .bind(email)
      .fetch_one(db)
      .await?;

      Ok(user)
   }

   pub(crate) async fn get_user<'e, E>(db: E, id: i64) -> Result<User>
   where
      E: SqliteExecutor<'e>,
   {
      let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
         .bind(id)
         .fetch_one(db)
         .await?;

      Ok(user)
   }

   pub(crate) async fn get_user_by_username<'e, E>(db: E, username: &str) -> Result<User>
   where
      E: SqliteExecutor<'e>,
   {
      let user = sqlx::query_as(&format!(
         "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
      ))
      .bind(username)
      .fetch_one(db)
      .await?;

      Ok(user)
   }

   pub(crate) async fn list_users<'e, E>(db: E) -> Result<Vec<User>>
   where
      E: SqliteExecutor<'e>,
   {
      let users = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
         .fetch_all(db)
         .await?;

      Ok(users)
   }

   pub(crate) async fn upsert_user<'e, E>(
      db: E,
      username: &str,
      display_name: &str,
      email: &str,
   ) -> Result<User>
   where
      E: SqliteExecutor<'e>,
   {
      // NULLIF/COALESCE keep the stored value when the incoming one is the
      // empty string ("empty means no change").
      let user = sqlx::query_as(&format!(
         "INSERT INTO users (username, display_name, email)
          VALUES ($1, $2, $3)
          ON CONFLICT (username) DO UPDATE SET
             display_name = COALESCE(NULLIF(excluded.display_name, ''), users.display_name),
             email        = COALESCE(NULLIF(excluded.email, ''), users.email),
             updated_at   = datetime('now')
          RETURNING {USER_COLUMNS}"
      ))
      .bind(username)
      .bind(display_name)
      .bind(email)
      .fetch_one(db)
      .await?;

      Ok(user)
   }

   pub(crate) async fn delete_user<'e, E>(db: E, id: i64) -> Result<u64>
   where
      E: SqliteExecutor<'e>,
   {
      let result = sqlx::query("DELETE FROM users WHERE id = $1")
         .bind(id)
         .execute(db)
         .await?;

      Ok(result.rows_affected())
   }

   pub(crate) async fn create_post<'e, E>(
      db: E,
      user_id: i64,
      title: &str,
      body: &str,
   ) -> Result<Post>
   where
      E: SqliteExecutor<'e>,
   {
      let post = sqlx::query_as(&format!(
         "INSERT INTO posts (user_id, title, body)
          VALUES ($1, $2, $3)
          RETURNING {POST_COLUMNS}"
      ))
      .bind(user_id)
      .bind(title)
      .bind(body)
      .fetch_one(db)
      .await?;

      Ok(post)
   }

   pub(crate) async fn list_posts_by_user<'e, E>(db: E, user_id: i64) -> Result<Vec<Post>>
   where
      E: SqliteExecutor<'e>,
   {
      let posts = sqlx::query_as(&format!(
         "SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 ORDER BY id"
      ))
      .bind(user_id)
      .fetch_all(db)
      .await?;

      Ok(posts)
   }
}
