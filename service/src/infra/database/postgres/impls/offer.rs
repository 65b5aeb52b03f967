//! [`Offer`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Swap};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{offer, Offer},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `offers` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "id, owner_id, title, description, category, \
                       location_hint, duration, status, created_at";

/// Builds an [`Offer`] out of the provided [`Row`] having [`COLUMNS`].
fn from_row(row: &Row) -> Offer {
    Offer {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        location_hint: row.get("location_hint"),
        duration: row.get("duration"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Offer>, offer::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Offer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Offer>, offer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: offer::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM offers \
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

impl<C> Database<Select<By<Vec<Offer>, read::offer::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Offer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Offer>, read::offer::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::offer::list::Selector {
            filter:
                read::offer::list::Filter {
                    owner_id,
                    category,
                    status,
                },
            limit,
        } = by.into_inner();

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let owner_idx = owner_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let category_idx = category.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM offers \
             WHERE true \
                   {owner_filtering} \
                   {category_filtering} \
                   {status_filtering} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1::INT8",
            owner_filtering = owner_idx
                .map(|i| format!("AND owner_id = ${i}::UUID"))
                .unwrap_or_default(),
            category_filtering = category_idx
                .map(|i| format!("AND category = ${i}::VARCHAR"))
                .unwrap_or_default(),
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

impl<C> Database<Insert<Offer>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(offer): Insert<Offer>,
    ) -> Result<Self::Ok, Self::Err> {
        let Offer {
            id,
            owner_id,
            title,
            description,
            category,
            location_hint,
            duration,
            status,
            created_at,
        } = offer;

        const SQL: &str = "\
            INSERT INTO offers (\
                id, owner_id, title, description, category, location_hint, \
                duration, status, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::TEXT, $5::VARCHAR, \
                $6::VARCHAR, $7::INT8, $8::INT2, $9::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &title,
                &description,
                &category,
                &location_hint,
                &duration,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Swap<Offer, offer::Status>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Swap { expected, new }: Swap<Offer, offer::Status>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            UPDATE offers \
            SET status = $3::INT2 \
            WHERE id = $1::UUID \
              AND status = $2::INT2";
        self.exec(SQL, &[&new.id, &expected, &new.status])
            .await
            .map_err(tracerr::wrap!())
            .map(|updated| updated == 1)
    }
}
