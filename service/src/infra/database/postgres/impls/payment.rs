//! [`Payment`]-related [`Database`] implementations.

use common::operations::{Insert, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::Payment,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`Payment`] from the provided [`Row`].
pub(super) fn from_row(row: &Row) -> Payment {
    Payment {
        id: row.get("id"),
        listing_id: row.get("listing_id"),
        buyer_id: row.get("buyer_id"),
        buyer_paid_at: row.get("buyer_paid_at"),
        buyer_transaction_reference: row.get("buyer_transaction_reference"),
        seller_paid_at: row.get("seller_paid_at"),
        seller_transaction_reference: row.get("seller_transaction_reference"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(payment)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            listing_id,
            buyer_id,
            buyer_paid_at,
            buyer_transaction_reference,
            seller_paid_at,
            seller_transaction_reference,
            created_at,
            updated_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, listing_id, buyer_id, \
                buyer_paid_at, buyer_transaction_reference, \
                seller_paid_at, seller_transaction_reference, \
                created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::TIMESTAMPTZ, $5::VARCHAR, \
                $6::TIMESTAMPTZ, $7::VARCHAR, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (listing_id) DO UPDATE \
            SET buyer_paid_at = EXCLUDED.buyer_paid_at, \
                buyer_transaction_reference = \
                    EXCLUDED.buyer_transaction_reference, \
                seller_paid_at = EXCLUDED.seller_paid_at, \
                seller_transaction_reference = \
                    EXCLUDED.seller_transaction_reference, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &listing_id,
                &buyer_id,
                &buyer_paid_at,
                &buyer_transaction_reference,
                &seller_paid_at,
                &seller_transaction_reference,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
