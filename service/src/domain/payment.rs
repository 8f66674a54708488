//! [`Payment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{listing, status::PaymentState, status::Role, user};

/// Two-sided platform-fee payment record for a listing.
///
/// Carries only timestamped acknowledgements from the payment gateway; the
/// captured amounts live in the out-of-core payment subsystem.
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`listing::Listing`] this payment is for.
    pub listing_id: listing::Id,

    /// ID of the buyer party, fixed for the lifetime of this record.
    pub buyer_id: user::Id,

    /// [`DateTime`] when the buyer's fee was captured, if it was.
    pub buyer_paid_at: Option<PaymentDateTime>,

    /// Opaque gateway reference of the buyer's capture.
    pub buyer_transaction_reference: Option<TransactionReference>,

    /// [`DateTime`] when the seller's fee was captured, if it was.
    pub seller_paid_at: Option<PaymentDateTime>,

    /// Opaque gateway reference of the seller's capture.
    pub seller_transaction_reference: Option<TransactionReference>,

    /// [`DateTime`] when this record was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this record was last updated.
    pub updated_at: UpdateDateTime,
}

impl Payment {
    /// Creates a new empty [`Payment`] record.
    #[must_use]
    pub fn new(
        listing_id: listing::Id,
        buyer_id: user::Id,
        now: common::DateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            listing_id,
            buyer_id,
            buyer_paid_at: None,
            buyer_transaction_reference: None,
            seller_paid_at: None,
            seller_transaction_reference: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    /// Returns the [`PaymentState`] of this record.
    #[must_use]
    pub fn state(&self) -> PaymentState {
        match (&self.buyer_paid_at, &self.seller_paid_at) {
            (Some(_), Some(_)) => PaymentState::PaidComplete,
            (Some(_), None) | (None, Some(_)) => PaymentState::PaidPartial,
            (None, None) => PaymentState::Unpaid,
        }
    }

    /// Checks whether the provided `payer`'s side is already recorded.
    #[must_use]
    pub fn side_paid(&self, payer: Role) -> bool {
        match payer {
            Role::Buyer => self.buyer_paid_at.is_some(),
            Role::Seller => self.seller_paid_at.is_some(),
        }
    }

    /// Records the provided `payer`'s capture.
    ///
    /// Idempotent per payer: a repeated call for an already-recorded side
    /// changes nothing and returns `false`.
    pub fn record(
        &mut self,
        payer: Role,
        reference: TransactionReference,
        now: common::DateTime,
    ) -> bool {
        if self.side_paid(payer) {
            return false;
        }
        match payer {
            Role::Buyer => {
                self.buyer_paid_at = Some(now.coerce());
                self.buyer_transaction_reference = Some(reference);
            }
            Role::Seller => {
                self.seller_paid_at = Some(now.coerce());
                self.seller_transaction_reference = Some(reference);
            }
        }
        self.updated_at = now.coerce();
        true
    }
}

/// ID of a [`Payment`].
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

/// Opaque transaction reference minted by the payment gateway.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[serde(try_from = "String")]
pub struct TransactionReference(String);

impl TransactionReference {
    /// Creates a new [`TransactionReference`] if the given `reference` is
    /// valid.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Option<Self> {
        let reference = reference.into();
        Self::check(&reference).then_some(Self(reference))
    }

    /// Checks whether the given `reference` is a valid
    /// [`TransactionReference`].
    fn check(reference: impl AsRef<str>) -> bool {
        let reference = reference.as_ref();
        reference.trim() == reference
            && !reference.is_empty()
            && reference.len() <= 512
    }
}

impl std::str::FromStr for TransactionReference {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `TransactionReference`")
    }
}

impl TryFrom<String> for TransactionReference {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `TransactionReference`")
    }
}

/// [`DateTime`] when a [`Payment`] side was captured.
pub type PaymentDateTime = DateTimeOf<(Payment, unit::Payment)>;

/// [`DateTime`] when a [`Payment`] was created.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;

/// [`DateTime`] when a [`Payment`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Payment, unit::Update)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{listing, status::PaymentState, status::Role, user};

    use super::{Payment, TransactionReference};

    fn reference(s: &str) -> TransactionReference {
        TransactionReference::new(s).unwrap()
    }

    #[test]
    fn state_progression() {
        let now = DateTime::now();
        let mut p = Payment::new(listing::Id::new(), user::Id::new(), now);
        assert_eq!(p.state(), PaymentState::Unpaid);

        assert!(p.record(Role::Buyer, reference("pp-1"), now));
        assert_eq!(p.state(), PaymentState::PaidPartial);

        assert!(p.record(Role::Seller, reference("pp-2"), now));
        assert_eq!(p.state(), PaymentState::PaidComplete);
    }

    #[test]
    fn repeated_capture_is_ignored() {
        let now = DateTime::now();
        let mut p = Payment::new(listing::Id::new(), user::Id::new(), now);
        assert!(p.record(Role::Buyer, reference("pp-1"), now));
        let first_paid_at = p.buyer_paid_at;

        let later = DateTime::now();
        assert!(!p.record(Role::Buyer, reference("pp-other"), later));
        assert_eq!(p.buyer_paid_at, first_paid_at);
        assert_eq!(
            p.buyer_transaction_reference,
            Some(reference("pp-1")),
        );
        assert_eq!(p.state(), PaymentState::PaidPartial);
    }

    #[test]
    fn reference_validation() {
        assert!(TransactionReference::new("PAYPAL-8GW12345").is_some());
        assert!(TransactionReference::new("").is_none());
        assert!(TransactionReference::new(" ref ").is_none());
    }
}
