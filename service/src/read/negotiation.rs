//! Sibling-triple read model definitions.

use crate::domain::{
    listing::{self, Listing},
    status::{self, DisplayStatus, Overall, PaymentState, RecordState, Role},
    user, LocationNegotiation, Payment, TimeNegotiation,
};

/// The three sibling records of a single listing.
///
/// Any of them may be absent. All derived statuses are recomputed from this
/// snapshot on every read and never stored.
#[derive(Clone, Debug, Default)]
pub struct Triple {
    /// Time negotiation of the listing, if any.
    pub time: Option<TimeNegotiation>,

    /// Location negotiation of the listing, if any.
    pub location: Option<LocationNegotiation>,

    /// Payment record of the listing, if any.
    pub payment: Option<Payment>,
}

impl Triple {
    /// Returns the [`RecordState`] of the time negotiation.
    #[must_use]
    pub fn time_state(&self) -> RecordState {
        self.time
            .as_ref()
            .map_or(RecordState::None, TimeNegotiation::state)
    }

    /// Returns the [`RecordState`] of the location negotiation.
    #[must_use]
    pub fn location_state(&self) -> RecordState {
        self.location
            .as_ref()
            .map_or(RecordState::None, LocationNegotiation::state)
    }

    /// Returns the [`PaymentState`] of the payment record.
    #[must_use]
    pub fn payment_state(&self) -> PaymentState {
        self.payment
            .as_ref()
            .map_or(PaymentState::Unpaid, Payment::state)
    }

    /// Derives the [`Overall`] status of this [`Triple`].
    #[must_use]
    pub fn overall(&self) -> Overall {
        status::overall(
            self.time_state(),
            self.location_state(),
            self.payment_state(),
        )
    }

    /// Returns the buyer already bound to this [`Triple`], if any record
    /// exists.
    ///
    /// Once bound, the buyer identity is immutable: a later change of the
    /// catalog's contact-purchaser never steps into an in-flight negotiation.
    #[must_use]
    pub fn bound_buyer_id(&self) -> Option<user::Id> {
        self.time
            .as_ref()
            .map(|t| t.buyer_id)
            .or_else(|| self.location.as_ref().map(|l| l.buyer_id))
            .or_else(|| self.payment.as_ref().map(|p| p.buyer_id))
    }

    /// Resolves the [`Role`] of the provided `user` on the given `listing`.
    ///
    /// [`None`] is returned for users who are neither the seller nor the
    /// (bound or catalog-designated) buyer.
    #[must_use]
    pub fn role_of(&self, listing: &Listing, user: user::Id) -> Option<Role> {
        if user == listing.seller_id {
            return Some(Role::Seller);
        }
        let buyer =
            self.bound_buyer_id().or(listing.contact_purchaser_id);
        (buyer == Some(user)).then_some(Role::Buyer)
    }

    /// Returns the counterparty of the provided `role` on the given
    /// `listing`, if one exists.
    #[must_use]
    pub fn counterparty_of(
        &self,
        listing: &Listing,
        role: Role,
    ) -> Option<user::Id> {
        match role {
            Role::Seller => {
                self.bound_buyer_id().or(listing.contact_purchaser_id)
            }
            Role::Buyer => Some(listing.seller_id),
        }
    }

    /// Returns the per-`viewer` action-required flags for the time and the
    /// location negotiations.
    #[must_use]
    pub fn action_required(&self, viewer: Role) -> (bool, bool) {
        (
            self.time
                .as_ref()
                .is_some_and(|t| t.action_required(viewer)),
            self.location
                .as_ref()
                .is_some_and(|l| l.action_required(viewer)),
        )
    }

    /// Derives the per-`viewer` [`DisplayStatus`] of this [`Triple`].
    #[must_use]
    pub fn display_for(&self, viewer: Role) -> DisplayStatus {
        let (time_action, location_action) = self.action_required(viewer);
        let viewer_paid = self
            .payment
            .as_ref()
            .is_some_and(|p| p.side_paid(viewer));
        status::display(self.overall(), time_action, location_action, viewer_paid)
    }
}

/// Per-viewer snapshot of a negotiation, as served to the API.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// ID of the listing the negotiation is about.
    pub listing_id: listing::Id,

    /// [`Role`] of the viewing party.
    pub viewer_role: Role,

    /// Derived [`Overall`] status.
    pub overall: Overall,

    /// Derived per-viewer [`DisplayStatus`].
    pub display_status: DisplayStatus,

    /// Whether the viewer has to respond to the time proposal.
    pub time_action_required: bool,

    /// Whether the viewer has to respond to the location proposal.
    pub location_action_required: bool,

    /// The sibling records themselves.
    pub triple: Triple,
}

impl Snapshot {
    /// Builds a new [`Snapshot`] of the provided `triple` for the given
    /// `viewer`.
    #[must_use]
    pub fn new(listing: &Listing, triple: Triple, viewer: Role) -> Self {
        let (time_action_required, location_action_required) =
            triple.action_required(viewer);
        let display_status = if listing.status == listing::Status::Completed {
            DisplayStatus::Completed
        } else {
            triple.display_for(viewer)
        };
        Self {
            listing_id: listing.id,
            viewer_role: viewer,
            overall: triple.overall(),
            display_status,
            time_action_required,
            location_action_required,
            triple,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{DateTime, Latitude, Longitude};

    use crate::domain::{
        listing::{self, Listing},
        location_negotiation::{self, LocationNegotiation},
        payment::{Payment, TransactionReference},
        status::{DisplayStatus, Overall, Role},
        time_negotiation::TimeNegotiation,
        user,
    };

    use super::{Snapshot, Triple};

    const HOUR: Duration = Duration::from_secs(3600);

    struct Scene {
        listing: Listing,
        seller: user::Id,
        buyer: user::Id,
        now: DateTime,
    }

    fn scene() -> Scene {
        let now = DateTime::now();
        let seller = user::Id::new();
        let buyer = user::Id::new();
        Scene {
            listing: Listing {
                id: listing::Id::new(),
                seller_id: seller,
                status: listing::Status::Active,
                contact_purchaser_id: Some(buyer),
                available_until: (now + Duration::from_secs(86400)).coerce(),
                created_at: now.coerce(),
                updated_at: now.coerce(),
            },
            seller,
            buyer,
            now,
        }
    }

    fn location(s: &Scene, by: Role) -> LocationNegotiation {
        LocationNegotiation::propose(
            s.listing.id,
            s.buyer,
            by,
            location_negotiation::Name::new("Cafe").unwrap(),
            Latitude::new(48.8566).unwrap(),
            Longitude::new(2.3522).unwrap(),
            s.now,
        )
    }

    #[test]
    fn empty_triple_is_negotiating() {
        let triple = Triple::default();
        assert_eq!(triple.overall(), Overall::Negotiating);
        assert_eq!(triple.action_required(Role::Buyer), (false, false));
    }

    #[test]
    fn happy_path() {
        let s = scene();
        let mut triple = Triple::default();

        // Buyer proposes a time.
        let mut tn = TimeNegotiation::propose(
            s.listing.id,
            s.buyer,
            Role::Buyer,
            (s.now + HOUR).coerce(),
            s.now,
        )
        .unwrap();
        assert_eq!(
            Snapshot::new(
                &s.listing,
                Triple {
                    time: Some(tn),
                    ..Triple::default()
                },
                Role::Buyer,
            )
            .display_status,
            DisplayStatus::WaitingForAcceptance,
        );

        // Seller accepts; still negotiating (no location yet).
        tn.accept(Role::Seller, s.now).unwrap();
        triple.time = Some(tn);
        assert_eq!(triple.overall(), Overall::Negotiating);

        // Seller proposes a location; buyer accepts.
        let mut ln = location(&s, Role::Seller);
        assert!(ln.action_required(Role::Buyer));
        ln.accept(Role::Buyer, s.now).unwrap();
        triple.location = Some(ln);
        assert_eq!(triple.overall(), Overall::Agreed);

        // Both fees get paid.
        let mut payment = Payment::new(s.listing.id, s.buyer, s.now);
        assert!(payment.record(
            Role::Buyer,
            TransactionReference::new("pp-1").unwrap(),
            s.now,
        ));
        triple.payment = Some(payment.clone());
        assert_eq!(triple.overall(), Overall::PaidPartial);
        assert_eq!(
            triple.display_for(Role::Buyer),
            DisplayStatus::WaitingForPayment,
        );
        assert_eq!(
            triple.display_for(Role::Seller),
            DisplayStatus::PaymentRequired,
        );

        assert!(payment.record(
            Role::Seller,
            TransactionReference::new("pp-2").unwrap(),
            s.now,
        ));
        triple.payment = Some(payment);
        assert_eq!(triple.overall(), Overall::PaidComplete);
        assert_eq!(triple.display_for(Role::Buyer), DisplayStatus::ReadyToMeet);
    }

    #[test]
    fn reject_then_reopen() {
        let s = scene();
        let mut tn = TimeNegotiation::propose(
            s.listing.id,
            s.buyer,
            Role::Buyer,
            (s.now + HOUR).coerce(),
            s.now,
        )
        .unwrap();
        tn.reject(Role::Seller, s.now).unwrap();

        let triple = Triple {
            time: Some(tn),
            ..Triple::default()
        };
        assert_eq!(triple.overall(), Overall::Rejected);

        let mut tn = triple.time.unwrap();
        tn.counter_propose(Role::Buyer, (s.now + HOUR + HOUR).coerce(), s.now)
            .unwrap();
        let triple = Triple {
            time: Some(tn),
            ..Triple::default()
        };
        assert_eq!(triple.overall(), Overall::Negotiating);
    }

    #[test]
    fn role_resolution() {
        let s = scene();
        let triple = Triple::default();

        assert_eq!(
            triple.role_of(&s.listing, s.seller),
            Some(Role::Seller),
        );
        assert_eq!(triple.role_of(&s.listing, s.buyer), Some(Role::Buyer));
        assert_eq!(triple.role_of(&s.listing, user::Id::new()), None);

        assert_eq!(
            triple.counterparty_of(&s.listing, Role::Seller),
            Some(s.buyer),
        );
        assert_eq!(
            triple.counterparty_of(&s.listing, Role::Buyer),
            Some(s.seller),
        );
    }

    #[test]
    fn bound_buyer_wins_over_catalog_change() {
        let mut s = scene();
        let bound = s.buyer;
        let tn = TimeNegotiation::propose(
            s.listing.id,
            bound,
            Role::Buyer,
            (s.now + HOUR).coerce(),
            s.now,
        )
        .unwrap();
        let triple = Triple {
            time: Some(tn),
            ..Triple::default()
        };

        // The catalog re-sells contact access to someone else.
        let newcomer = user::Id::new();
        s.listing.contact_purchaser_id = Some(newcomer);

        assert_eq!(triple.role_of(&s.listing, bound), Some(Role::Buyer));
        assert_eq!(triple.role_of(&s.listing, newcomer), None);
        assert_eq!(
            triple.counterparty_of(&s.listing, Role::Seller),
            Some(bound),
        );
    }

    #[test]
    fn completed_listing_overlays_display() {
        let mut s = scene();
        s.listing.status = listing::Status::Completed;
        let snapshot =
            Snapshot::new(&s.listing, Triple::default(), Role::Buyer);
        assert_eq!(snapshot.display_status, DisplayStatus::Completed);
    }
}
