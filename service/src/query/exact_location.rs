//! [`Query`] for the disclosure-gated meeting location of a listing.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    read::{disclosure, Disclosure, Triple},
    Service,
};

use super::Query;

/// [`Query`] for the disclosure-gated meeting location of a listing.
///
/// Non-parties and listings without an agreed meeting are indistinguishable:
/// both read as "no meeting", so the existence of a negotiation never leaks.
#[derive(Clone, Copy, Debug)]
pub struct ExactLocation {
    /// ID of the [`Listing`] to read.
    pub listing_id: listing::Id,

    /// ID of the authenticated [`user`] viewing the location.
    pub user_id: user::Id,
}

impl<Db> Query<ExactLocation> for Service<Db>
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
    type Ok = Disclosure;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ExactLocation) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ExactLocation {
            listing_id,
            user_id,
        } = query;

        let now = DateTime::now();

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NoMeeting(listing_id))
            .map_err(tracerr::wrap!())?;

        let triple = self
            .database()
            .execute(Select(By::<Triple, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            triple
                .role_of(&listing, user_id)
                .ok_or(E::NoMeeting(listing_id))
                .map_err(tracerr::wrap!())?,
        );

        disclosure::disclose(&triple, now)
            .ok_or(E::NoMeeting(listing_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`ExactLocation`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// No agreed meeting is visible to the caller for the listing.
    #[display("`Listing(id: {_0})` has no agreed meeting")]
    NoMeeting(#[error(not(source))] listing::Id),
}
