//! Ledger-related [`Database`] implementations.
//!
//! Ledger rows are only ever inserted, never updated nor deleted.

use common::{
    operations::{By, Insert, Select},
    Minutes,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{exchange, ledger, user},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `ledger_entries` table, in the order [`from_row()`]
/// expects.
const COLUMNS: &str = "id, user_id, delta, reason, exchange_id, created_at";

/// Builds a [`ledger::Entry`] out of the provided [`Row`] having
/// [`COLUMNS`].
fn from_row(row: &Row) -> ledger::Entry {
    ledger::Entry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        delta: row.get("delta"),
        reason: row.get("reason"),
        exchange_id: row.get("exchange_id"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Insert<ledger::Settlement>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(settlement): Insert<ledger::Settlement>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO ledger_entries (\
                id, user_id, delta, reason, exchange_id, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::INT8, $4::TEXT, $5::UUID, \
                $6::TIMESTAMPTZ \
            )";
        for entry in settlement.entries() {
            _ = self
                .exec(
                    SQL,
                    &[
                        &entry.id,
                        &entry.user_id,
                        &entry.delta,
                        &entry.reason,
                        &entry.exchange_id,
                        &entry.created_at,
                    ],
                )
                .await
                .map_err(tracerr::wrap!())?;
        }
        Ok(())
    }
}

impl<C> Database<Select<By<read::ledger::Balance, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::ledger::Balance;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::ledger::Balance, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COALESCE(SUM(delta), 0)::INT8 AS balance \
            FROM ledger_entries \
            WHERE user_id = $1::UUID";
        let row = self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(read::ledger::Balance(
            row.first()
                .map_or(Minutes::ZERO, |r| r.get::<_, Minutes>("balance")),
        ))
    }
}

impl<C>
    Database<Select<By<Vec<ledger::Entry>, read::ledger::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<ledger::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<ledger::Entry>, read::ledger::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::ledger::list::Selector {
            filter: read::ledger::list::Filter { user_id },
            limit,
        } = by.into_inner();

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM ledger_entries \
             WHERE user_id = $1::UUID \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2::INT8",
        );
        Ok(self
            .query(sql.as_str(), &[&user_id, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<ledger::Entry>, exchange::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<ledger::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<ledger::Entry>, exchange::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let exchange_id: exchange::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM ledger_entries \
             WHERE exchange_id = $1::UUID \
             ORDER BY delta ASC",
        );
        Ok(self
            .query(sql.as_str(), &[&exchange_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}
