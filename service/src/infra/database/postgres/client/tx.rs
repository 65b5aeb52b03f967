//! [`Tx`] client definitions.

use std::{mem, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

use super::NonTx;

/// Transactional Postgres database client.
///
/// The transaction begins lazily, with the first executed statement.
/// Dropping all the clones of a [`Tx`] before [`Tx::commit()`] rolls it back.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client to check the [`connection::Tx`] out of.
    non_tx: NonTx,

    /// Current [`State`] of the transaction.
    state: Arc<RwLock<State>>,
}

/// State of a [`Tx`] client.
#[derive(Debug)]
enum State {
    /// No statement has been executed yet.
    Pending,

    /// Transaction is running in the [`connection::Tx`].
    Running(connection::Tx),

    /// Transaction has been committed.
    Committed,
}

impl Tx {
    /// Creates a new [`Tx`] client checking its connection out of the
    /// provided [`NonTx`] client.
    #[must_use]
    pub fn new(non_tx: NonTx) -> Self {
        Self {
            non_tx,
            state: Arc::new(RwLock::new(State::Pending)),
        }
    }

    /// Returns the running [`connection::Tx`], beginning it if needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let mut state = self.state.write().await;
        if matches!(*state, State::Pending) {
            let conn =
                self.non_tx.connection().await.map_err(tracerr::wrap!())?;
            *state = State::Running(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }

        RwLockReadGuard::try_map(state.downgrade(), |s| match s {
            State::Running(tx) => Some(tx),
            State::Pending | State::Committed => None,
        })
        .map_err(|_| tracerr::new!(postgres::Error::TxFinished))
        .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`] client.
    ///
    /// Committing a [`Tx`] which executed no statements does nothing.
    ///
    /// # Errors
    ///
    /// If this [`Tx`] has been committed already, or the database fails to
    /// commit it.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let mut state = self.state.write().await;
        match mem::replace(&mut *state, State::Committed) {
            State::Running(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            State::Pending => Ok(()),
            State::Committed => Err(tracerr::map_from(tracerr::new!(
                postgres::Error::TxFinished
            ))),
        }
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
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}
