//! Transactional execution port.
//!
//! A [`UnitOfWork`] opens a [`Transaction`]; the transaction hands out the
//! writers. Use [`run`] rather than driving `begin`/`commit`/`rollback` by
//! hand: it commits on `Ok` and rolls back on `Err`.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::repositories::{SessionWriter, ShortUrlWriter, UserWriter};
use crate::error::{AppError, AppResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of transactions for a backing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn Transaction>>;

    /// Returns true if the store accepts connections.
    async fn health_check(&self) -> bool;
}

/// An open transaction. Dropping it without [`Transaction::commit`] rolls back.
#[async_trait]
pub trait Transaction: Send {
    fn short_urls(&mut self) -> &mut dyn ShortUrlWriter;

    fn users(&mut self) -> &mut dyn UserWriter;

    fn sessions(&mut self) -> &mut dyn SessionWriter;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Runs `work` inside a fresh transaction.
///
/// Commits when `work` returns `Ok`. When it returns `Err` the transaction is
/// rolled back and the error is returned unchanged; a failing rollback is only
/// logged so it cannot mask the original error.
///
/// ```ignore
/// let saved = run(uow, move |tx| {
///     Box::pin(async move { tx.short_urls().save(candidate).await })
/// })
/// .await?;
/// ```
pub async fn run<T, E, F>(uow: &dyn UnitOfWork, work: F) -> Result<T, E>
where
    F: for<'t> FnOnce(&'t mut dyn Transaction) -> BoxFuture<'t, Result<T, E>>,
    E: From<AppError>,
{
    let mut tx = uow.begin().await?;

    match work(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}
