//! Negotiation-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        listing, location_negotiation, time_negotiation, LocationNegotiation,
        TimeNegotiation,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::Triple,
};

/// Builds a [`TimeNegotiation`] from the provided [`Row`].
fn time_from_row(row: &Row) -> TimeNegotiation {
    TimeNegotiation {
        id: row.get("id"),
        listing_id: row.get("listing_id"),
        buyer_id: row.get("buyer_id"),
        proposed_by: row.get("proposed_by"),
        meeting_time: row.get("meeting_time"),
        accepted_at: row.get("accepted_at"),
        rejected_at: row.get("rejected_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Builds a [`LocationNegotiation`] from the provided [`Row`].
fn location_from_row(row: &Row) -> LocationNegotiation {
    LocationNegotiation {
        id: row.get("id"),
        listing_id: row.get("listing_id"),
        buyer_id: row.get("buyer_id"),
        proposed_by: row.get("proposed_by"),
        name: row.get("name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        accepted_at: row.get("accepted_at"),
        rejected_at: row.get("rejected_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// `SELECT` list of the `time_negotiations` table.
const TIME_COLUMNS: &str = "\
    id, listing_id, buyer_id, proposed_by, meeting_time, \
    accepted_at, rejected_at, created_at, updated_at";

/// `SELECT` list of the `location_negotiations` table.
const LOCATION_COLUMNS: &str = "\
    id, listing_id, buyer_id, proposed_by, name, latitude, longitude, \
    accepted_at, rejected_at, created_at, updated_at";

impl<C> Database<Select<By<Triple, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Triple;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Triple, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let listing_id: listing::Id = by.into_inner();

        let time_sql = format!(
            "SELECT {TIME_COLUMNS} \
             FROM time_negotiations \
             WHERE listing_id = $1::UUID",
        );
        let time = self
            .query_opt(&time_sql, &[&listing_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(time_from_row);

        let location_sql = format!(
            "SELECT {LOCATION_COLUMNS} \
             FROM location_negotiations \
             WHERE listing_id = $1::UUID",
        );
        let location = self
            .query_opt(&location_sql, &[&listing_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(location_from_row);

        const PAYMENT_SQL: &str = "\
            SELECT id, listing_id, buyer_id, \
                   buyer_paid_at, buyer_transaction_reference, \
                   seller_paid_at, seller_transaction_reference, \
                   created_at, updated_at \
            FROM payments \
            WHERE listing_id = $1::UUID";
        let payment = self
            .query_opt(PAYMENT_SQL, &[&listing_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(super::payment::from_row);

        Ok(Triple {
            time,
            location,
            payment,
        })
    }
}

impl<C> Database<Select<By<Option<TimeNegotiation>, time_negotiation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<TimeNegotiation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<TimeNegotiation>, time_negotiation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: time_negotiation::Id = by.into_inner();

        let sql = format!(
            "SELECT {TIME_COLUMNS} \
             FROM time_negotiations \
             WHERE id = $1::UUID",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(time_from_row))
    }
}

impl<C>
    Database<Select<By<Option<LocationNegotiation>, location_negotiation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<LocationNegotiation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<LocationNegotiation>, location_negotiation::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: location_negotiation::Id = by.into_inner();

        let sql = format!(
            "SELECT {LOCATION_COLUMNS} \
             FROM location_negotiations \
             WHERE id = $1::UUID",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(location_from_row))
    }
}

impl<C> Database<Insert<TimeNegotiation>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<TimeNegotiation>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(negotiation): Insert<TimeNegotiation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(negotiation))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<TimeNegotiation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(negotiation): Update<TimeNegotiation>,
    ) -> Result<Self::Ok, Self::Err> {
        let TimeNegotiation {
            id,
            listing_id,
            buyer_id,
            proposed_by,
            meeting_time,
            accepted_at,
            rejected_at,
            created_at,
            updated_at,
        } = negotiation;

        const SQL: &str = "\
            INSERT INTO time_negotiations (\
                id, listing_id, buyer_id, proposed_by, meeting_time, \
                accepted_at, rejected_at, created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, $5::TIMESTAMPTZ, \
                $6::TIMESTAMPTZ, $7::TIMESTAMPTZ, $8::TIMESTAMPTZ, \
                $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (listing_id) DO UPDATE \
            SET proposed_by = EXCLUDED.proposed_by, \
                meeting_time = EXCLUDED.meeting_time, \
                accepted_at = EXCLUDED.accepted_at, \
                rejected_at = EXCLUDED.rejected_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &listing_id,
                &buyer_id,
                &proposed_by,
                &meeting_time,
                &accepted_at,
                &rejected_at,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Insert<LocationNegotiation>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<LocationNegotiation>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(negotiation): Insert<LocationNegotiation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(negotiation))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<LocationNegotiation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(negotiation): Update<LocationNegotiation>,
    ) -> Result<Self::Ok, Self::Err> {
        let LocationNegotiation {
            id,
            listing_id,
            buyer_id,
            proposed_by,
            name,
            latitude,
            longitude,
            accepted_at,
            rejected_at,
            created_at,
            updated_at,
        } = negotiation;

        const SQL: &str = "\
            INSERT INTO location_negotiations (\
                id, listing_id, buyer_id, proposed_by, name, \
                latitude, longitude, \
                accepted_at, rejected_at, created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, $5::VARCHAR, \
                $6::DOUBLE PRECISION, $7::DOUBLE PRECISION, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ, $10::TIMESTAMPTZ, \
                $11::TIMESTAMPTZ\
            ) \
            ON CONFLICT (listing_id) DO UPDATE \
            SET proposed_by = EXCLUDED.proposed_by, \
                name = EXCLUDED.name, \
                latitude = EXCLUDED.latitude, \
                longitude = EXCLUDED.longitude, \
                accepted_at = EXCLUDED.accepted_at, \
                rejected_at = EXCLUDED.rejected_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &listing_id,
                &buyer_id,
                &proposed_by,
                &name,
                &latitude,
                &longitude,
                &accepted_at,
                &rejected_at,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<LocationNegotiation, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<LocationNegotiation, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let listing_id: listing::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM location_negotiations \
            WHERE listing_id = $1::UUID";
        self.exec(SQL, &[&listing_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
