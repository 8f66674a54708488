//! [`Listing`]-related [`Database`] implementations.

use common::operations::{By, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`Listing`] from the provided [`Row`].
fn from_row(row: &Row) -> Listing {
    Listing {
        id: row.get("id"),
        seller_id: row.get("seller_id"),
        status: row.get("status"),
        contact_purchaser_id: row.get("contact_purchaser_id"),
        available_until: row.get("available_until"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, seller_id, status, contact_purchaser_id, \
                   available_until, created_at, updated_at \
            FROM listings \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Lock<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO listings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<By<Listing, listing::AvailabilityDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Listing, listing::AvailabilityDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let deadline: listing::AvailabilityDateTime = by.into_inner();

        const SQL: &str = "\
            UPDATE listings \
            SET status = $1::INT2, \
                updated_at = NOW() \
            WHERE status = $2::INT2 \
              AND available_until <= $3::TIMESTAMPTZ";
        self.exec(
            SQL,
            &[
                &listing::Status::Inactive,
                &listing::Status::Active,
                &deadline,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}
