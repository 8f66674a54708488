//! [`Listing`] definitions.
//!
//! Listings are owned by the out-of-core catalog subsystem; the negotiation
//! engine reads the narrow projection below and never mutates anything but
//! the expiry-driven `status` flip.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user;

/// Listing of a cash-currency exchange offer.
#[derive(Clone, Copy, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the [`user`] who created this [`Listing`] and owns the offered
    /// currency.
    pub seller_id: user::Id,

    /// [`Status`] of this [`Listing`].
    pub status: Status,

    /// ID of the single [`user`] (if any) to whom the seller's contact
    /// information has been released by the catalog.
    pub contact_purchaser_id: Option<user::Id>,

    /// [`DateTime`] until which this [`Listing`] is available.
    pub available_until: AvailabilityDateTime,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Listing`] was last updated.
    pub updated_at: UpdateDateTime,
}

impl Listing {
    /// Checks whether this [`Listing`] accepts negotiation commands at the
    /// provided instant.
    #[must_use]
    pub fn is_active(&self, now: common::DateTime) -> bool {
        self.status == Status::Active && self.available_until > now.coerce()
    }
}

/// ID of a [`Listing`].
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

define_kind! {
    #[doc = "Status of a [`Listing`]."]
    enum Status {
        #[doc = "The offer is open and may be negotiated."]
        Active = 1,

        #[doc = "The offer is withdrawn or expired."]
        Inactive = 2,

        #[doc = "The exchange has been completed."]
        Completed = 3,
    }
}

/// [`DateTime`] until which a [`Listing`] is available.
pub type AvailabilityDateTime = DateTimeOf<(Listing, unit::Availability)>;

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// [`DateTime`] when a [`Listing`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Listing, unit::Update)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::{user, Id, Listing, Status};

    fn listing(status: Status, now: DateTime) -> Listing {
        Listing {
            id: Id::new(),
            seller_id: user::Id::new(),
            status,
            contact_purchaser_id: None,
            available_until: (now + Duration::from_secs(3600)).coerce(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    #[test]
    fn active_within_availability() {
        let now = DateTime::now();
        assert!(listing(Status::Active, now).is_active(now));
        assert!(!listing(Status::Inactive, now).is_active(now));
        assert!(!listing(Status::Completed, now).is_active(now));
    }

    #[test]
    fn inactive_past_availability() {
        let now = DateTime::now();
        let stale = listing(Status::Active, now - Duration::from_secs(7200));
        assert!(!stale.is_active(now));
    }
}
