//! Transaction binding for the query catalog.
//!
//! A unit of work runs through [`Store::run_in_transaction`], which begins a
//! transaction on the shared pool, rebinds the root catalog onto it, and
//! enforces the commit/rollback protocol: exactly one of the two is
//! attempted per invocation, and a rollback triggered by a work error never
//! discards that error.

use futures::future::BoxFuture;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::queries::{Post, User, sql};

/// Transaction-scoped query capability.
///
/// Structurally the same method set as [`Queries`](crate::Queries), but
/// every call executes inside one open transaction. Created by rebinding
/// the root catalog ([`Queries::with_tx`](crate::Queries::with_tx)); owned
/// by a single unit of work and never shared across transactions.
///
/// Methods take `&mut self` because the underlying transaction is a single
/// exclusive connection; within the transaction, statements execute in the
/// order they are issued.
#[must_use = "an unused TxQueries rolls its transaction back on drop"]
pub struct TxQueries {
   tx: Transaction<'static, Sqlite>,
}

impl TxQueries {
   pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
      Self { tx }
   }

   pub(crate) fn into_inner(self) -> Transaction<'static, Sqlite> {
      self.tx
   }

   /// Inserts a user and returns the created row. Exactly-one-row.
   pub async fn create_user(
      &mut self,
      username: &str,
      display_name: &str,
      email: &str,
   ) -> Result<User> {
      sql::create_user(&mut *self.tx, username, display_name, email).await
   }

   /// Fetches a user by id. Exactly-one-row.
   pub async fn get_user(&mut self, id: i64) -> Result<User> {
      sql::get_user(&mut *self.tx, id).await
   }

   /// Fetches a user by unique username. Exactly-one-row.
   pub async fn get_user_by_username(&mut self, username: &str) -> Result<User> {
      sql::get_user_by_username(&mut *self.tx, username).await
   }

   /// Lists all users ordered by id. Zero-or-more-rows.
   pub async fn list_users(&mut self) -> Result<Vec<User>> {
      sql::list_users(&mut *self.tx).await
   }

   /// Inserts or updates a user by username; empty incoming strings leave
   /// the stored values unchanged. Exactly-one-row.
   pub async fn upsert_user(
      &mut self,
      username: &str,
      display_name: &str,
      email: &str,
   ) -> Result<User> {
      sql::upsert_user(&mut *self.tx, username, display_name, email).await
   }

   /// Deletes a user by id, returning the affected-row count.
   pub async fn delete_user(&mut self, id: i64) -> Result<u64> {
      sql::delete_user(&mut *self.tx, id).await
   }

   /// Inserts a post for a user and returns the created row.
   /// Exactly-one-row.
   pub async fn create_post(&mut self, user_id: i64, title: &str, body: &str) -> Result<Post> {
      sql::create_post(&mut *self.tx, user_id, title, body).await
   }

   /// Lists a user's posts ordered by id. Zero-or-more-rows.
   pub async fn list_posts_by_user(&mut self, user_id: i64) -> Result<Vec<Post>> {
      sql::list_posts_by_user(&mut *self.tx, user_id).await
   }
}

impl Store {
   /// Runs `work` inside a single atomic transaction.
   ///
   /// Protocol:
   /// 1. Begin a transaction on the shared pool; a begin failure is
   ///    returned immediately — there is nothing to clean up.
   /// 2. Rebind the root catalog onto the transaction and invoke `work`
   ///    with the transaction-scoped capability.
   /// 3. If `work` fails, roll back. If the rollback also fails, return
   ///    [`Error::RollbackFailed`] carrying both errors; otherwise return
   ///    the work error unchanged.
   /// 4. If `work` succeeds, commit; a commit failure is returned as
   ///    [`Error::CommitTransaction`].
   ///
   /// Exactly one of commit or rollback is attempted per invocation, so
   /// the work function's mutations are either all durable or all undone.
   ///
   /// Cancellation follows normal future semantics: if the caller times
   /// out or drops the returned future, the in-flight statement inside
   /// `work` fails or is abandoned, and the transaction's connection rolls
   /// back when it returns to the pool.
   ///
   /// # Examples
   ///
   /// ```ignore
   /// store
   ///    .run_in_transaction(|q| {
   ///       Box::pin(async move {
   ///          let author = q.create_user("alice", "Alice", "alice@example.com").await?;
   ///          q.create_post(author.id, "hello", "first post").await?;
   ///          Ok(())
   ///       })
   ///    })
   ///    .await?;
   /// ```
   pub async fn run_in_transaction<T, F>(&self, work: F) -> Result<T>
   where
      F: for<'t> FnOnce(&'t mut TxQueries) -> BoxFuture<'t, Result<T>>,
   {
      let tx = self.pool().begin().await.map_err(Error::BeginTransaction)?;
      let mut queries = self.queries().with_tx(tx);

      match work(&mut queries).await {
         Ok(value) => {
            queries
               .into_inner()
               .commit()
               .await
               .map_err(Error::CommitTransaction)?;
            debug!("transaction committed");
            Ok(value)
         }
         Err(work_err) => match queries.into_inner().rollback().await {
            Ok(()) => {
               debug!("transaction rolled back after work error");
               Err(work_err)
            }
            Err(rollback_err) => Err(Error::RollbackFailed {
               work: Box::new(work_err),
               rollback: rollback_err,
            }),
         },
      }
   }
}
