//! Postgres [`Database`] implementation.
//!
//! Status transitions are conditional `UPDATE`s: a row is only updated while
//! its stored status is still the expected one, and the number of updated
//! rows tells whether the transition has happened.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::{Config, PoolConfig};

/// Postgres [`Database`], either pooled ([`NonTx`]) or bound to a single
/// transaction ([`Tx`]).
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a connection pool out of the provided [`Config`].
    ///
    /// Connections are established lazily, so an unreachable database is only
    /// reported by the first statement.
    ///
    /// # Errors
    ///
    /// If the [`Config`] doesn't describe a valid pool.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Error of the [`Postgres`] database.
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed in the database.
    #[display("statement failed: {_0}")]
    Connection(connection::Error),

    /// [`Config`] doesn't describe a valid [`connection::Pool`].
    #[display("invalid pool configuration: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// [`connection::Pool`] failed to provide a connection.
    #[display("no pooled connection: {_0}")]
    PoolError(connection::PoolError),

    /// Statement issued into an already committed [`Tx`].
    #[display("transaction is already committed")]
    #[from(ignore)]
    TxFinished,
}
