//! [`Report`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::Report,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `reports` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "id, reporter_id, target_user_id, offer_id, \
                       exchange_id, reason, note, created_at";

/// Builds a [`Report`] out of the provided [`Row`] having [`COLUMNS`].
fn from_row(row: &Row) -> Report {
    Report {
        id: row.get("id"),
        reporter_id: row.get("reporter_id"),
        target_user_id: row.get("target_user_id"),
        offer_id: row.get("offer_id"),
        exchange_id: row.get("exchange_id"),
        reason: row.get("reason"),
        note: row.get("note"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Vec<Report>, read::report::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Report>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Report>, read::report::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::report::list::Selector {
            filter: read::report::list::Filter { reporter_id },
            limit,
        } = by.into_inner();

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reports \
             WHERE reporter_id = $1::UUID \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2::INT8",
        );
        Ok(self
            .query(sql.as_str(), &[&reporter_id, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Report>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(report): Insert<Report>,
    ) -> Result<Self::Ok, Self::Err> {
        let Report {
            id,
            reporter_id,
            target_user_id,
            offer_id,
            exchange_id,
            reason,
            note,
            created_at,
        } = report;

        const SQL: &str = "\
            INSERT INTO reports (\
                id, reporter_id, target_user_id, offer_id, exchange_id, \
                reason, note, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, $5::UUID, \
                $6::VARCHAR, $7::TEXT, $8::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &reporter_id,
                &target_user_id,
                &offer_id,
                &exchange_id,
                &reason,
                &note,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
