//! [`Exchange`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Swap};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{exchange, user, Exchange},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `exchanges` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "id, offer_id, requester_id, provider_id, minutes, \
                       status, cancelled_by, cancellation_reason, \
                       no_show_by, no_show_against, created_at";

/// Builds an [`Exchange`] out of the provided [`Row`] having [`COLUMNS`].
fn from_row(row: &Row) -> Exchange {
    let cancelled_by: Option<user::Id> = row.get("cancelled_by");
    let no_show_by: Option<user::Id> = row.get("no_show_by");
    let no_show_against: Option<user::Id> = row.get("no_show_against");
    Exchange {
        id: row.get("id"),
        offer_id: row.get("offer_id"),
        requester_id: row.get("requester_id"),
        provider_id: row.get("provider_id"),
        minutes: row.get("minutes"),
        status: row.get("status"),
        cancellation: cancelled_by.map(|by| exchange::Cancellation {
            by,
            reason: row.get("cancellation_reason"),
        }),
        no_show: no_show_by
            .zip(no_show_against)
            .map(|(by, against)| exchange::NoShow { by, against }),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Exchange>, exchange::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Exchange>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Exchange>, exchange::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: exchange::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM exchanges \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Exchange>, read::exchange::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Exchange>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Exchange>, read::exchange::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::exchange::list::Selector {
            filter:
                read::exchange::list::Filter {
                    participant_id,
                    status,
                },
            limit,
        } = by.into_inner();

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &participant_id];

        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM exchanges \
             WHERE (requester_id = $2::UUID OR provider_id = $2::UUID) \
                   {status_filtering} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1::INT8",
            status_filtering = status_idx
                .map(|i| format!("AND status = ${i}::INT2"))
                .unwrap_or_default(),
        );
        Ok(self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Exchange>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(exchange): Insert<Exchange>,
    ) -> Result<Self::Ok, Self::Err> {
        let Exchange {
            id,
            offer_id,
            requester_id,
            provider_id,
            minutes,
            status,
            cancellation,
            no_show,
            created_at,
        } = exchange;
        let cancelled_by = cancellation.as_ref().map(|c| c.by);
        let cancellation_reason = cancellation.and_then(|c| c.reason);
        let (no_show_by, no_show_against) =
            no_show.map(|n| (n.by, n.against)).unzip();

        const SQL: &str = "\
            INSERT INTO exchanges (\
                id, offer_id, requester_id, provider_id, minutes, status, \
                cancelled_by, cancellation_reason, \
                no_show_by, no_show_against, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, $5::INT8, $6::INT2, \
                $7::UUID, $8::TEXT, \
                $9::UUID, $10::UUID, \
                $11::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &offer_id,
                &requester_id,
                &provider_id,
                &minutes,
                &status,
                &cancelled_by,
                &cancellation_reason,
                &no_show_by,
                &no_show_against,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Swap<Exchange, exchange::Status>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Swap { expected, new }: Swap<Exchange, exchange::Status>,
    ) -> Result<Self::Ok, Self::Err> {
        let Exchange {
            id,
            status,
            cancellation,
            no_show,
            ..
        } = new;
        let cancelled_by = cancellation.as_ref().map(|c| c.by);
        let cancellation_reason = cancellation.and_then(|c| c.reason);
        let (no_show_by, no_show_against) =
            no_show.map(|n| (n.by, n.against)).unzip();

        // Only the lifecycle columns are mutable.
        const SQL: &str = "\
            UPDATE exchanges \
            SET status = $3::INT2, \
                cancelled_by = $4::UUID, \
                cancellation_reason = $5::TEXT, \
                no_show_by = $6::UUID, \
                no_show_against = $7::UUID \
            WHERE id = $1::UUID \
              AND status = $2::INT2";
        self.exec(
            SQL,
            &[
                &id,
                &expected,
                &status,
                &cancelled_by,
                &cancellation_reason,
                &no_show_by,
                &no_show_against,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|updated| updated == 1)
    }
}
