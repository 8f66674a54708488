//! [`TimeNegotiation`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    listing,
    status::{RecordState, RespondError, Role},
    user,
};

/// Negotiation of an in-person meeting time for a listing.
///
/// At most one live record exists per listing: a counter-proposal overwrites
/// the previous one, so only the latest proposal is ever kept.
#[derive(Clone, Copy, Debug)]
pub struct TimeNegotiation {
    /// ID of this [`TimeNegotiation`].
    pub id: Id,

    /// ID of the [`listing::Listing`] this negotiation is about.
    pub listing_id: listing::Id,

    /// ID of the buyer party, fixed for the lifetime of this record.
    pub buyer_id: user::Id,

    /// Party who made the latest proposal.
    pub proposed_by: Role,

    /// Proposed meeting [`DateTime`].
    pub meeting_time: MeetingDateTime,

    /// [`DateTime`] when the latest proposal was accepted, if it was.
    pub accepted_at: Option<AcceptanceDateTime>,

    /// [`DateTime`] when the latest proposal was rejected, if it was.
    pub rejected_at: Option<RejectionDateTime>,

    /// [`DateTime`] when this record was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this record was last updated.
    pub updated_at: UpdateDateTime,
}

impl TimeNegotiation {
    /// Creates a new [`TimeNegotiation`] with the provided proposal.
    ///
    /// # Errors
    ///
    /// If the proposed `meeting_time` is not strictly in the future.
    pub fn propose(
        listing_id: listing::Id,
        buyer_id: user::Id,
        proposed_by: Role,
        meeting_time: MeetingDateTime,
        now: common::DateTime,
    ) -> Result<Self, ProposeError> {
        if meeting_time <= now.coerce() {
            return Err(ProposeError::MeetingTimeNotInFuture);
        }
        Ok(Self {
            id: Id::new(),
            listing_id,
            buyer_id,
            proposed_by,
            meeting_time,
            accepted_at: None,
            rejected_at: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        })
    }

    /// Returns the [`RecordState`] of this record.
    #[must_use]
    pub fn state(&self) -> RecordState {
        if self.rejected_at.is_some() {
            RecordState::Rejected
        } else if self.accepted_at.is_some() {
            RecordState::Accepted
        } else {
            RecordState::Proposed
        }
    }

    /// Checks whether the provided `viewer` has to respond to this record.
    #[must_use]
    pub fn action_required(&self, viewer: Role) -> bool {
        self.state() == RecordState::Proposed && self.proposed_by != viewer
    }

    /// Overwrites this record with a counter-proposal, clearing any previous
    /// acceptance or rejection.
    ///
    /// # Errors
    ///
    /// - If the current proposal is already accepted (an agreed time must be
    ///   unlocked first).
    /// - If the proposed `meeting_time` is not strictly in the future.
    pub fn counter_propose(
        &mut self,
        proposed_by: Role,
        meeting_time: MeetingDateTime,
        now: common::DateTime,
    ) -> Result<(), ProposeError> {
        if self.state() == RecordState::Accepted {
            return Err(ProposeError::AlreadyAccepted);
        }
        if meeting_time <= now.coerce() {
            return Err(ProposeError::MeetingTimeNotInFuture);
        }
        self.proposed_by = proposed_by;
        self.meeting_time = meeting_time;
        self.accepted_at = None;
        self.rejected_at = None;
        self.updated_at = now.coerce();
        Ok(())
    }

    /// Accepts the current proposal on behalf of the provided `actor`.
    ///
    /// # Errors
    ///
    /// If the record is not awaiting a response, or the `actor` is the
    /// proposing party.
    pub fn accept(
        &mut self,
        actor: Role,
        now: common::DateTime,
    ) -> Result<(), RespondError> {
        self.ensure_respondable(actor)?;
        self.accepted_at = Some(now.coerce());
        self.rejected_at = None;
        self.updated_at = now.coerce();
        Ok(())
    }

    /// Rejects the current proposal on behalf of the provided `actor`.
    ///
    /// # Errors
    ///
    /// If the record is not awaiting a response, or the `actor` is the
    /// proposing party.
    pub fn reject(
        &mut self,
        actor: Role,
        now: common::DateTime,
    ) -> Result<(), RespondError> {
        self.ensure_respondable(actor)?;
        self.rejected_at = Some(now.coerce());
        self.accepted_at = None;
        self.updated_at = now.coerce();
        Ok(())
    }

    /// Clears the acceptance of this record, leaving the proposed time and
    /// its proposer intact.
    ///
    /// Re-opens an agreed time without losing context.
    pub fn clear_acceptance(&mut self, now: common::DateTime) {
        self.accepted_at = None;
        self.updated_at = now.coerce();
    }

    /// Checks that the provided `actor` may respond to this record.
    fn ensure_respondable(&self, actor: Role) -> Result<(), RespondError> {
        let state = self.state();
        if state != RecordState::Proposed {
            return Err(RespondError::NotProposed(state));
        }
        if actor == self.proposed_by {
            return Err(RespondError::OwnProposal(actor));
        }
        Ok(())
    }
}

/// ID of a [`TimeNegotiation`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Error of proposing a meeting time.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum ProposeError {
    /// The current proposal is accepted and must be unlocked first.
    #[display("the agreed time must be cancelled before re-proposing")]
    AlreadyAccepted,

    /// The proposed meeting time is not strictly in the future.
    #[display("the proposed meeting time is not in the future")]
    MeetingTimeNotInFuture,
}

/// Proposed meeting [`DateTime`] of a [`TimeNegotiation`].
pub type MeetingDateTime = DateTimeOf<(TimeNegotiation, unit::Meeting)>;

/// [`DateTime`] when a [`TimeNegotiation`] was accepted.
pub type AcceptanceDateTime = DateTimeOf<(TimeNegotiation, unit::Acceptance)>;

/// [`DateTime`] when a [`TimeNegotiation`] was rejected.
pub type RejectionDateTime = DateTimeOf<(TimeNegotiation, unit::Rejection)>;

/// [`DateTime`] when a [`TimeNegotiation`] was created.
pub type CreationDateTime = DateTimeOf<(TimeNegotiation, unit::Creation)>;

/// [`DateTime`] when a [`TimeNegotiation`] was last updated.
pub type UpdateDateTime = DateTimeOf<(TimeNegotiation, unit::Update)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::domain::{
        listing,
        status::{RecordState, RespondError, Role},
        user,
    };

    use super::{ProposeError, TimeNegotiation};

    const HOUR: Duration = Duration::from_secs(3600);

    fn proposed(by: Role, now: DateTime) -> TimeNegotiation {
        TimeNegotiation::propose(
            listing::Id::new(),
            user::Id::new(),
            by,
            (now + HOUR).coerce(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn rejects_past_meeting_time() {
        let now = DateTime::now();
        assert_eq!(
            TimeNegotiation::propose(
                listing::Id::new(),
                user::Id::new(),
                Role::Buyer,
                now.coerce(),
                now,
            )
            .unwrap_err(),
            ProposeError::MeetingTimeNotInFuture,
        );
    }

    #[test]
    fn proposer_cannot_respond() {
        let now = DateTime::now();
        let mut tn = proposed(Role::Buyer, now);
        assert_eq!(
            tn.accept(Role::Buyer, now).unwrap_err(),
            RespondError::OwnProposal(Role::Buyer),
        );
        assert_eq!(
            tn.reject(Role::Buyer, now).unwrap_err(),
            RespondError::OwnProposal(Role::Buyer),
        );
    }

    #[test]
    fn accept_then_reject_is_refused() {
        let now = DateTime::now();
        let mut tn = proposed(Role::Buyer, now);
        tn.accept(Role::Seller, now).unwrap();
        assert_eq!(tn.state(), RecordState::Accepted);
        assert_eq!(
            tn.reject(Role::Seller, now).unwrap_err(),
            RespondError::NotProposed(RecordState::Accepted),
        );
    }

    #[test]
    fn counter_proposal_clears_rejection() {
        let now = DateTime::now();
        let mut tn = proposed(Role::Buyer, now);
        tn.reject(Role::Seller, now).unwrap();
        assert_eq!(tn.state(), RecordState::Rejected);

        let t1 = (now + HOUR + HOUR).coerce();
        tn.counter_propose(Role::Seller, t1, now).unwrap();
        assert_eq!(tn.state(), RecordState::Proposed);
        assert_eq!(tn.proposed_by, Role::Seller);
        assert_eq!(tn.meeting_time, t1);
        assert!(tn.rejected_at.is_none());
    }

    #[test]
    fn counter_proposal_refused_while_accepted() {
        let now = DateTime::now();
        let mut tn = proposed(Role::Buyer, now);
        tn.accept(Role::Seller, now).unwrap();
        assert_eq!(
            tn.counter_propose(Role::Buyer, (now + HOUR).coerce(), now)
                .unwrap_err(),
            ProposeError::AlreadyAccepted,
        );
    }

    #[test]
    fn cancel_then_accept_round_trip() {
        let now = DateTime::now();
        let mut tn = proposed(Role::Buyer, now);
        tn.accept(Role::Seller, now).unwrap();

        let time_before = tn.meeting_time;
        tn.clear_acceptance(now);
        assert_eq!(tn.state(), RecordState::Proposed);
        assert_eq!(tn.meeting_time, time_before);
        assert_eq!(tn.proposed_by, Role::Buyer);

        tn.accept(Role::Seller, now).unwrap();
        assert_eq!(tn.state(), RecordState::Accepted);
    }

    #[test]
    fn action_required_only_for_responder() {
        let now = DateTime::now();
        let mut tn = proposed(Role::Buyer, now);
        assert!(tn.action_required(Role::Seller));
        assert!(!tn.action_required(Role::Buyer));

        tn.accept(Role::Seller, now).unwrap();
        assert!(!tn.action_required(Role::Seller));
    }
}
