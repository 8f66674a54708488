//! [`Query`] for the full negotiation snapshot of a listing.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    read::{Snapshot, Triple},
    Service,
};

use super::Query;

/// [`Query`] for the full negotiation [`Snapshot`] of a listing, as seen by
/// the provided viewer.
///
/// All derived statuses are recomputed from the sibling records on every
/// execution.
#[derive(Clone, Copy, Debug)]
pub struct MeetingProposals {
    /// ID of the [`Listing`] to read.
    pub listing_id: listing::Id,

    /// ID of the authenticated [`user`] viewing the negotiation.
    pub user_id: user::Id,
}

impl<Db> Query<MeetingProposals> for Service<Db>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Triple, listing::Id>>,
            Ok = Triple,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Snapshot;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: MeetingProposals,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MeetingProposals {
            listing_id,
            user_id,
        } = query;

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        let triple = self
            .database()
            .execute(Select(By::<Triple, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let role = triple
            .role_of(&listing, user_id)
            .ok_or(E::NotAParty(user_id))
            .map_err(tracerr::wrap!())?;

        Ok(Snapshot::new(&listing, triple, role))
    }
}

/// Error of [`MeetingProposals`] [`Query`] execution.
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
}
