//! [`Command`] for proposing a meeting time and/or location.

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Latitude, Longitude,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        listing,
        location_negotiation,
        notification::{self, Intent},
        status::{RecordState, Role},
        time_negotiation, user, Listing, LocationNegotiation, TimeNegotiation,
    },
    infra::{database, Database},
    read::Triple,
    Service,
};

use super::Command;

/// [`Command`] for proposing a meeting time and/or location on a listing.
///
/// The first proposal on a listing establishes the buyer identity; later
/// proposals counter the latest one, overwriting it. A location proposal is
/// admitted only once the meeting time is agreed.
#[derive(Clone, Debug)]
pub struct ProposeMeeting {
    /// ID of the [`Listing`] to negotiate on.
    pub listing_id: listing::Id,

    /// ID of the authenticated [`user`] issuing the proposal.
    pub user_id: user::Id,

    /// Proposed meeting time, if any.
    pub meeting_time: Option<time_negotiation::MeetingDateTime>,

    /// Proposed meeting location, if any.
    pub location: Option<ProposedLocation>,

    /// Free-text note to attach to the notification, if any.
    pub message: Option<notification::Message>,
}

/// Location part of a [`ProposeMeeting`] [`Command`].
#[derive(Clone, Debug)]
pub struct ProposedLocation {
    /// Human-readable name of the proposed meeting place.
    pub name: location_negotiation::Name,

    /// [`Latitude`] of the proposed meeting place.
    pub latitude: Latitude,

    /// [`Longitude`] of the proposed meeting place.
    pub longitude: Longitude,
}

/// Result of a [`ProposeMeeting`] [`Command`] execution.
#[derive(Clone, Debug)]
pub struct Output {
    /// The proposal record the command touched.
    pub proposal: Proposal,

    /// Sibling records after the command committed.
    pub triple: Triple,
}

/// Reference to the proposal record a [`ProposeMeeting`] touched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Proposal {
    /// The time negotiation was created or overwritten.
    Time(time_negotiation::Id),

    /// The location negotiation was created or overwritten.
    Location(location_negotiation::Id),
}

impl Proposal {
    /// Returns the raw ID of the touched record.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match *self {
            Self::Time(id) => id.into(),
            Self::Location(id) => id.into(),
        }
    }
}

impl<Db> Command<ProposeMeeting> for Service<Db>
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
        > + Database<Insert<TimeNegotiation>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<TimeNegotiation>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<LocationNegotiation>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Update<LocationNegotiation>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: ProposeMeeting) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ProposeMeeting {
            listing_id,
            user_id,
            meeting_time,
            location,
            message,
        } = cmd;

        if meeting_time.is_none() && location.is_none() {
            return Err(tracerr::new!(E::EmptyProposal));
        }

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

        let role = triple
            .role_of(&listing, user_id)
            .ok_or(E::NotAParty(user_id))
            .map_err(tracerr::wrap!())?;

        if !listing.is_active(now) {
            return Err(tracerr::new!(E::ListingNotActive(listing.id)));
        }

        let counterparty = triple
            .counterparty_of(&listing, role)
            .ok_or(E::NoCounterparty(listing.id))
            .map_err(tracerr::wrap!())?;
        let buyer_id = match role {
            Role::Buyer => user_id,
            Role::Seller => counterparty,
        };

        let mut touched = None;

        if let Some(meeting_time) = meeting_time {
            if let Some(tn) = &mut triple.time {
                if tn.state() == RecordState::Accepted {
                    // An agreed time stays agreed: with a location attached
                    // the location below is the actual proposal, without one
                    // the agreement must be cancelled first.
                    if location.is_none() {
                        return Err(tracerr::new!(E::Propose(
                            time_negotiation::ProposeError::AlreadyAccepted,
                        )));
                    }
                } else {
                    tn.counter_propose(role, meeting_time, now)
                        .map_err(tracerr::from_and_wrap!(=> E))?;
                    tx.execute(Update(*tn))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))
                        .map(drop)?;
                    touched = Some(Proposal::Time(tn.id));
                }
            } else {
                let tn = TimeNegotiation::propose(
                    listing.id,
                    buyer_id,
                    role,
                    meeting_time,
                    now,
                )
                .map_err(tracerr::from_and_wrap!(=> E))?;
                tx.execute(Insert(tn))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                touched = Some(Proposal::Time(tn.id));
                triple.time = Some(tn);
            }
        }

        if let Some(ProposedLocation {
            name,
            latitude,
            longitude,
        }) = location
        {
            if triple.time_state() != RecordState::Accepted {
                return Err(tracerr::new!(if touched.is_some() {
                    E::LocationOnPendingTime
                } else {
                    E::LocationBeforeTimeAgreed(listing.id)
                }));
            }
            if triple.payment.is_some() {
                return Err(tracerr::new!(E::PaymentAlreadyRecorded(
                    listing.id,
                )));
            }
            if let Some(ln) = &mut triple.location {
                ln.counter_propose(role, name, latitude, longitude, now);
                tx.execute(Update(ln.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                touched = Some(Proposal::Location(ln.id));
            } else {
                let ln = LocationNegotiation::propose(
                    listing.id, buyer_id, role, name, latitude, longitude, now,
                );
                tx.execute(Insert(ln.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                touched = Some(Proposal::Location(ln.id));
                triple.location = Some(ln);
            }
        }

        let proposal = touched
            .ok_or(E::EmptyProposal)
            .map_err(tracerr::wrap!())?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let (kind, meeting_time, location_name) = match proposal {
            Proposal::Time(_) => (
                notification::Kind::TimeProposed,
                triple.time.as_ref().map(|t| t.meeting_time),
                None,
            ),
            Proposal::Location(_) => (
                notification::Kind::LocationProposed,
                None,
                triple.location.as_ref().map(|l| l.name.clone()),
            ),
        };
        self.notify(Intent {
            recipient: counterparty,
            kind,
            listing_id: listing.id,
            meeting_time,
            location_name,
            message,
        });

        Ok(Output { proposal, triple })
    }
}

/// Error of [`ProposeMeeting`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Neither a time nor a location was provided.
    #[display("nothing is proposed")]
    EmptyProposal,

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID is not open for negotiation.
    #[display("`Listing(id: {_0})` is not active")]
    ListingNotActive(#[error(not(source))] listing::Id),

    /// A location cannot be proposed before the meeting time is agreed.
    #[display(
        "`Listing(id: {_0})` has no agreed meeting time to attach a location \
         to"
    )]
    LocationBeforeTimeAgreed(#[error(not(source))] listing::Id),

    /// A location rode along with a time that is not immediately agreed.
    #[display(
        "the proposed location must wait until the proposed time is accepted"
    )]
    LocationOnPendingTime,

    /// [`Listing`] with the provided ID has no designated counterparty yet.
    #[display("`Listing(id: {_0})` has no designated buyer")]
    NoCounterparty(#[error(not(source))] listing::Id),

    /// The caller is not a party to the listing.
    #[display("`User(id: {_0})` is not a party to the listing")]
    NotAParty(#[error(not(source))] user::Id),

    /// A location cannot be re-proposed once a payment is recorded.
    #[display("`Listing(id: {_0})` already has a recorded payment")]
    PaymentAlreadyRecorded(#[error(not(source))] listing::Id),

    /// The time proposal itself is invalid.
    #[display("invalid time proposal: {_0}")]
    #[from]
    Propose(time_negotiation::ProposeError),
}
