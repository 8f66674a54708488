//! [`Command`] for responding to a meeting proposal.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        listing, location_negotiation,
        notification::{self, Intent},
        status,
        time_negotiation, user, Listing, LocationNegotiation, TimeNegotiation,
    },
    infra::{database, Database},
    read::Triple,
    Service,
};

use super::Command;

/// [`Command`] for accepting or rejecting the latest meeting proposal.
///
/// Turn-taking is enforced: the party who made the proposal cannot respond
/// to it.
#[derive(Clone, Copy, Debug)]
pub struct RespondToMeeting {
    /// ID of the authenticated [`user`] issuing the response.
    pub user_id: user::Id,

    /// The proposal record being responded to.
    pub target: Target,

    /// The response itself.
    pub decision: Decision,
}

/// Proposal record targeted by a [`RespondToMeeting`] [`Command`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    /// The time negotiation with the provided ID.
    Time(time_negotiation::Id),

    /// The location negotiation with the provided ID.
    Location(location_negotiation::Id),
}

/// Decision of a [`RespondToMeeting`] [`Command`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// The proposal is accepted, unlocking the next negotiation phase.
    Accepted,

    /// The proposal is rejected, leaving the record re-proposable.
    Rejected,
}

/// Result of a [`RespondToMeeting`] [`Command`] execution.
#[derive(Clone, Debug)]
pub struct Output {
    /// ID of the listing the proposal belongs to.
    pub listing_id: listing::Id,

    /// Sibling records after the command committed.
    pub triple: Triple,
}

impl<Db> Command<RespondToMeeting> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<TimeNegotiation>, time_negotiation::Id>>,
            Ok = Option<TimeNegotiation>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<Option<LocationNegotiation>, location_negotiation::Id>,
            >,
            Ok = Option<LocationNegotiation>,
            Err = Traced<database::Error>,
        >,
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
        + Database<
            Update<LocationNegotiation>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: RespondToMeeting,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RespondToMeeting {
            user_id,
            target,
            decision,
        } = cmd;

        let now = DateTime::now();

        // Resolve the listing the proposal belongs to before locking it.
        let listing_id = match target {
            Target::Time(id) => self
                .database()
                .execute(Select(By::<Option<TimeNegotiation>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ProposalNotExists(id.into()))
                .map_err(tracerr::wrap!())?
                .listing_id,
            Target::Location(id) => self
                .database()
                .execute(Select(By::<Option<LocationNegotiation>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ProposalNotExists(id.into()))
                .map_err(tracerr::wrap!())?
                .listing_id,
        };

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

        let role = triple
            .role_of(&listing, user_id)
            .ok_or(E::NotAParty(user_id))
            .map_err(tracerr::wrap!())?;

        let counterparty = triple
            .counterparty_of(&listing, role)
            .ok_or(E::NoCounterparty(listing.id))
            .map_err(tracerr::wrap!())?;

        let (kind, meeting_time, location_name) = match target {
            Target::Time(id) => {
                let tn = triple
                    .time
                    .as_mut()
                    .filter(|t| t.id == id)
                    .ok_or(E::ProposalNotExists(id.into()))
                    .map_err(tracerr::wrap!())?;
                match decision {
                    Decision::Accepted => tn.accept(role, now),
                    Decision::Rejected => tn.reject(role, now),
                }
                .map_err(tracerr::from_and_wrap!(=> E))?;
                tx.execute(Update(*tn))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                (
                    match decision {
                        Decision::Accepted => notification::Kind::TimeAccepted,
                        Decision::Rejected => notification::Kind::TimeRejected,
                    },
                    Some(tn.meeting_time),
                    None,
                )
            }
            Target::Location(id) => {
                let ln = triple
                    .location
                    .as_mut()
                    .filter(|l| l.id == id)
                    .ok_or(E::ProposalNotExists(id.into()))
                    .map_err(tracerr::wrap!())?;
                match decision {
                    Decision::Accepted => ln.accept(role, now),
                    Decision::Rejected => ln.reject(role, now),
                }
                .map_err(tracerr::from_and_wrap!(=> E))?;
                tx.execute(Update(ln.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                (
                    match decision {
                        Decision::Accepted => {
                            notification::Kind::LocationAccepted
                        }
                        Decision::Rejected => {
                            notification::Kind::LocationRejected
                        }
                    },
                    None,
                    Some(ln.name.clone()),
                )
            }
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.notify(Intent {
            recipient: counterparty,
            kind,
            listing_id: listing.id,
            meeting_time,
            location_name,
            message: None,
        });

        Ok(Output {
            listing_id: listing.id,
            triple,
        })
    }
}

/// Error of [`RespondToMeeting`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] the proposal refers to does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID has no designated counterparty.
    #[display("`Listing(id: {_0})` has no designated buyer")]
    NoCounterparty(#[error(not(source))] listing::Id),

    /// The caller is not a party to the listing.
    #[display("`User(id: {_0})` is not a party to the listing")]
    NotAParty(#[error(not(source))] user::Id),

    /// No proposal record with the provided ID exists.
    #[display("proposal `{_0}` does not exist")]
    ProposalNotExists(#[error(not(source))] Uuid),

    /// The response violates the record's sub-state or turn-taking.
    #[display("cannot respond to the proposal: {_0}")]
    #[from]
    Respond(status::RespondError),
}
