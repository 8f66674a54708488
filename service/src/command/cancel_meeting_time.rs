//! [`Command`] for cancelling an agreed meeting time.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, TimeNegotiation},
    infra::{database, Database},
    read::Triple,
    Service,
};

use super::Command;

/// [`Command`] for cancelling an agreed meeting time.
///
/// Clears only the acceptance, preserving the proposed time and its
/// proposer, so the agreement can be un-locked without losing context.
#[derive(Clone, Copy, Debug)]
pub struct CancelMeetingTime {
    /// ID of the [`Listing`] to cancel the agreed time of.
    pub listing_id: listing::Id,

    /// ID of the authenticated [`user`] issuing the cancellation.
    pub user_id: user::Id,
}

impl<Db> Command<CancelMeetingTime> for Service<Db>
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
        > + Database<Update<TimeNegotiation>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Triple;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelMeetingTime,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelMeetingTime {
            listing_id,
            user_id,
        } = cmd;

        let now = DateTime::now();

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

        // Clearing the time acceptance under a live location record would
        // leave the location without an agreed time; the location has to be
        // cancelled first.
        if triple.location.is_some() {
            return Err(tracerr::new!(E::LocationStillNegotiated(listing.id)));
        }

        let tn = triple
            .time
            .as_mut()
            .ok_or(E::NegotiationNotExists(listing.id))
            .map_err(tracerr::wrap!())?;
        tn.clear_acceptance(now);
        tx.execute(Update(*tn))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(triple)
    }
}

/// Error of [`CancelMeetingTime`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// A location negotiation still exists for the listing.
    #[display(
        "`Listing(id: {_0})` still has a location negotiation; cancel it \
         first"
    )]
    LocationStillNegotiated(#[error(not(source))] listing::Id),

    /// No time negotiation exists for the listing.
    #[display("`Listing(id: {_0})` has no time negotiation")]
    NegotiationNotExists(#[error(not(source))] listing::Id),

    /// The caller is not a party to the listing.
    #[display("`User(id: {_0})` is not a party to the listing")]
    NotAParty(#[error(not(source))] user::Id),
}
