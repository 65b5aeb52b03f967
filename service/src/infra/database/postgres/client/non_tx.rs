//! [`NonTx`] client definitions.

use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Checks a connection out of its [`connection::Pool`] for each statement,
/// so statements are committed as soon as they're executed.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to check connections out of.
    pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) const fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Checks a [`connection::NonTx`] out of the [`connection::Pool`].
    ///
    /// # Errors
    ///
    /// If the [`connection::Pool`] fails to provide a connection.
    pub(crate) async fn connection(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        Connection::query(&conn, stmt, params)
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
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        Connection::query_opt(&conn, stmt, params)
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
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        Connection::exec(&conn, stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}
