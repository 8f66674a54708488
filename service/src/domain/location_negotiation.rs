//! [`LocationNegotiation`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Latitude, Longitude};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    listing,
    status::{RecordState, RespondError, Role},
    user,
};

/// Negotiation of an in-person meeting location for a listing.
///
/// Exists only once the corresponding time negotiation is agreed; a
/// counter-proposal overwrites the previous one.
#[derive(Clone, Debug)]
pub struct LocationNegotiation {
    /// ID of this [`LocationNegotiation`].
    pub id: Id,

    /// ID of the [`listing::Listing`] this negotiation is about.
    pub listing_id: listing::Id,

    /// ID of the buyer party, fixed for the lifetime of this record.
    pub buyer_id: user::Id,

    /// Party who made the latest proposal.
    pub proposed_by: Role,

    /// Human-readable [`Name`] of the proposed meeting place.
    pub name: Name,

    /// [`Latitude`] of the proposed meeting place.
    pub latitude: Latitude,

    /// [`Longitude`] of the proposed meeting place.
    pub longitude: Longitude,

    /// [`DateTime`] when the latest proposal was accepted, if it was.
    pub accepted_at: Option<AcceptanceDateTime>,

    /// [`DateTime`] when the latest proposal was rejected, if it was.
    pub rejected_at: Option<RejectionDateTime>,

    /// [`DateTime`] when this record was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this record was last updated.
    pub updated_at: UpdateDateTime,
}

impl LocationNegotiation {
    /// Creates a new [`LocationNegotiation`] with the provided proposal.
    #[must_use]
    pub fn propose(
        listing_id: listing::Id,
        buyer_id: user::Id,
        proposed_by: Role,
        name: Name,
        latitude: Latitude,
        longitude: Longitude,
        now: common::DateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            listing_id,
            buyer_id,
            proposed_by,
            name,
            latitude,
            longitude,
            accepted_at: None,
            rejected_at: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
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
    pub fn counter_propose(
        &mut self,
        proposed_by: Role,
        name: Name,
        latitude: Latitude,
        longitude: Longitude,
        now: common::DateTime,
    ) {
        self.proposed_by = proposed_by;
        self.name = name;
        self.latitude = latitude;
        self.longitude = longitude;
        self.accepted_at = None;
        self.rejected_at = None;
        self.updated_at = now.coerce();
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

/// ID of a [`LocationNegotiation`].
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

/// Human-readable name of a meeting place.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[serde(try_from = "String")]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl std::str::FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

impl TryFrom<String> for Name {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// [`DateTime`] when a [`LocationNegotiation`] was accepted.
pub type AcceptanceDateTime =
    DateTimeOf<(LocationNegotiation, unit::Acceptance)>;

/// [`DateTime`] when a [`LocationNegotiation`] was rejected.
pub type RejectionDateTime =
    DateTimeOf<(LocationNegotiation, unit::Rejection)>;

/// [`DateTime`] when a [`LocationNegotiation`] was created.
pub type CreationDateTime = DateTimeOf<(LocationNegotiation, unit::Creation)>;

/// [`DateTime`] when a [`LocationNegotiation`] was last updated.
pub type UpdateDateTime = DateTimeOf<(LocationNegotiation, unit::Update)>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Latitude, Longitude};

    use crate::domain::{
        listing,
        status::{RecordState, RespondError, Role},
        user,
    };

    use super::{LocationNegotiation, Name};

    fn proposed(by: Role, now: DateTime) -> LocationNegotiation {
        LocationNegotiation::propose(
            listing::Id::new(),
            user::Id::new(),
            by,
            Name::new("Central Station cafe").unwrap(),
            Latitude::new(52.52).unwrap(),
            Longitude::new(13.405).unwrap(),
            now,
        )
    }

    #[test]
    fn name_validation() {
        assert!(Name::new("Cafe").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new("  padded  ").is_none());
        assert!(Name::new("x".repeat(513)).is_none());
    }

    #[test]
    fn counter_proposal_overwrites_acceptance() {
        let now = DateTime::now();
        let mut ln = proposed(Role::Seller, now);
        ln.accept(Role::Buyer, now).unwrap();
        assert_eq!(ln.state(), RecordState::Accepted);

        ln.counter_propose(
            Role::Buyer,
            Name::new("Park entrance").unwrap(),
            Latitude::new(52.51).unwrap(),
            Longitude::new(13.40).unwrap(),
            now,
        );
        assert_eq!(ln.state(), RecordState::Proposed);
        assert_eq!(ln.proposed_by, Role::Buyer);
        assert!(ln.accepted_at.is_none());
    }

    #[test]
    fn turn_taking_enforced() {
        let now = DateTime::now();
        let mut ln = proposed(Role::Seller, now);
        assert_eq!(
            ln.accept(Role::Seller, now).unwrap_err(),
            RespondError::OwnProposal(Role::Seller),
        );
        ln.reject(Role::Buyer, now).unwrap();
        assert_eq!(
            ln.accept(Role::Buyer, now).unwrap_err(),
            RespondError::NotProposed(RecordState::Rejected),
        );
    }
}
