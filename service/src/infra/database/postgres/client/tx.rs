//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

use super::NonTx;

/// Transactional Postgres database client.
///
/// The transaction begins lazily, on the first operation. Clones share the
/// same transaction. If the last clone is dropped without committing, the
/// underlying [`Connection`] is detached from the [`connection::Pool`] and
/// closed, so the server rolls the transaction back.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to check the [`Connection`] out of.
    pool: connection::Pool,

    /// [`Connection`] the transaction runs on, once began.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner(Mutex<Option<connection::Pooled>>);

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(conn) = self.0.get_mut().take() {
            tracing::debug!("dropping uncommitted Postgres transaction");
            drop(connection::Pooled::take(conn));
        }
    }
}

impl Tx {
    /// Creates a new [`Tx`] client sharing the [`connection::Pool`] of the
    /// provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: &NonTx) -> Self {
        Self {
            pool: client.pool().clone(),
            inner: Arc::new(Inner(Mutex::new(None))),
        }
    }

    /// Returns the [`Connection`] of this [`Tx`] client, beginning the
    /// transaction if not yet.
    async fn connection(
        &self,
    ) -> Result<MappedMutexGuard<'_, connection::Pooled>, Traced<database::Error>>
    {
        let mut guard = self.inner.0.lock().await;
        if guard.is_none() {
            let conn = self
                .pool
                .get()
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)?;
            conn.batch_exec("BEGIN").await.map_err(tracerr::wrap!())?;
            *guard = Some(conn);
        }
        Ok(MutexGuard::map(guard, |conn| {
            conn.as_mut().expect("transaction began above")
        }))
    }

    /// Commits this [`Tx`] client.
    ///
    /// Does nothing if no operation has been performed.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let conn = self.inner.0.lock().await.take();
        if let Some(conn) = conn {
            conn.batch_exec("COMMIT").await.map_err(tracerr::wrap!())?;
        }
        Ok(())
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.query(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.query_opt(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.exec(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn batch_exec(
        &self,
        query: &str,
    ) -> Result<(), Traced<database::Error>> {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        conn.batch_exec(query).await.map_err(tracerr::wrap!())
    }
}
