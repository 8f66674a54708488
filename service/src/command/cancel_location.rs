//! [`Command`] for cancelling a meeting location negotiation.

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, LocationNegotiation},
    infra::{database, Database},
    read::Triple,
    Service,
};

use super::Command;

/// [`Command`] for cancelling a meeting location negotiation.
///
/// Cancellation is total: the record is hard-deleted, no history is kept.
/// Refused once a payment record exists, so the payment invariant can never
/// be left dangling.
#[derive(Clone, Copy, Debug)]
pub struct CancelLocation {
    /// ID of the [`Listing`] to cancel the location negotiation of.
    pub listing_id: listing::Id,

    /// ID of the authenticated [`user`] issuing the cancellation.
    pub user_id: user::Id,
}

impl<Db> Command<CancelLocation> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Triple, listing::Id>>,
            Ok = Triple,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<LocationNegotiation, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Triple;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CancelLocation) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelLocation {
            listing_id,
            user_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Listing`.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        let mut triple = tx
            .execute(Select(By::<Triple, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            triple
                .role_of(&listing, user_id)
                .ok_or(E::NotAParty(user_id))
                .map_err(tracerr::wrap!())?,
        );

        if triple.payment.is_some() {
            return Err(tracerr::new!(E::PaymentAlreadyRecorded(listing.id)));
        }

        // Cancelling an absent location is a no-op.
        if triple.location.take().is_some() {
            tx.execute(Delete(By::<LocationNegotiation, _>::new(listing.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(triple)
    }
}

/// Error of [`CancelLocation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// The caller is not a party to the listing.
    #[display("`User(id: {_0})` is not a party to the listing")]
    NotAParty(#[error(not(source))] user::Id),

    /// A payment record already exists for the listing.
    #[display(
        "`Listing(id: {_0})` already has a recorded payment; the location \
         cannot be cancelled"
    )]
    PaymentAlreadyRecorded(#[error(not(source))] listing::Id),
}
