//! Derived negotiation status definitions.
//!
//! Nothing here is ever persisted as a status column: every value is
//! recomputed from the timestamped sibling records on each read, so the data
//! stays self-consistent under concurrent edits and out-of-band fixes.

use common::define_kind;
use derive_more::{Display, Error};
use serde::Serialize;

#[cfg(doc)]
use super::{LocationNegotiation, Payment, TimeNegotiation};

define_kind! {
    #[doc = "Party of a negotiation."]
    enum Role {
        #[doc = "The user who purchased contact access to the listing."]
        Buyer = 1,

        #[doc = "The user who owns the listing."]
        Seller = 2,
    }
}

impl Role {
    /// Returns the counterpart of this [`Role`].
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Buyer => Self::Seller,
            Self::Seller => Self::Buyer,
        }
    }
}

/// Sub-state of a single negotiation record ([`TimeNegotiation`] or
/// [`LocationNegotiation`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordState {
    /// The record is absent.
    None,

    /// The record awaits a response from the non-proposing party.
    Proposed,

    /// The proposal has been accepted.
    Accepted,

    /// The proposal has been rejected.
    Rejected,
}

/// Sub-state of a [`Payment`] record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// No side has paid yet (or no record exists).
    Unpaid,

    /// Exactly one side has paid.
    PaidPartial,

    /// Both sides have paid.
    PaidComplete,
}

/// Overall status of a negotiation, derived from the sibling triple.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Overall {
    /// Time or location is still being negotiated.
    Negotiating,

    /// Time and location are both agreed; platform fees are not paid yet.
    Agreed,

    /// Exactly one party has paid its platform fee.
    PaidPartial,

    /// Both parties have paid; the meeting may happen.
    PaidComplete,

    /// The latest proposal in the current phase was rejected.
    Rejected,
}

/// Derives the [`Overall`] status from the sub-states of the sibling records.
///
/// The first matching rule wins, in this order: time rejection, time not yet
/// agreed, location rejection, location not yet agreed, payment progress.
#[must_use]
pub fn overall(
    time: RecordState,
    location: RecordState,
    payment: PaymentState,
) -> Overall {
    if time == RecordState::Rejected {
        return Overall::Rejected;
    }
    if time != RecordState::Accepted {
        return Overall::Negotiating;
    }
    if location == RecordState::Rejected {
        return Overall::Rejected;
    }
    if location != RecordState::Accepted {
        return Overall::Negotiating;
    }
    match payment {
        PaymentState::PaidComplete => Overall::PaidComplete,
        PaymentState::PaidPartial => Overall::PaidPartial,
        PaymentState::Unpaid => Overall::Agreed,
    }
}

/// Per-viewer presentation status of a negotiation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    /// The viewer proposed last and waits for the counterparty.
    WaitingForAcceptance,

    /// The ball is in the viewer's court.
    ActionRequired,

    /// The viewer still has to pay its platform fee.
    PaymentRequired,

    /// The viewer has paid; the counterparty has not.
    WaitingForPayment,

    /// Both fees are paid; the parties may meet.
    ReadyToMeet,

    /// The exchange has been completed.
    Completed,

    /// The latest proposal was rejected.
    Rejected,
}

/// Derives the per-viewer [`DisplayStatus`].
///
/// `time_action_required` and `location_action_required` are the viewer's
/// action flags; `viewer_paid` tells whether the viewer's own side of the
/// payment is already recorded.
#[must_use]
pub fn display(
    overall: Overall,
    time_action_required: bool,
    location_action_required: bool,
    viewer_paid: bool,
) -> DisplayStatus {
    match overall {
        Overall::Rejected => DisplayStatus::Rejected,
        Overall::Negotiating => {
            if time_action_required || location_action_required {
                DisplayStatus::ActionRequired
            } else {
                DisplayStatus::WaitingForAcceptance
            }
        }
        Overall::Agreed => DisplayStatus::PaymentRequired,
        Overall::PaidPartial => {
            if viewer_paid {
                DisplayStatus::WaitingForPayment
            } else {
                DisplayStatus::PaymentRequired
            }
        }
        Overall::PaidComplete => DisplayStatus::ReadyToMeet,
    }
}

/// Error of responding to a proposal record.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum RespondError {
    /// The record is not awaiting a response.
    #[display("record is `{_0}`, not `proposed`")]
    NotProposed(#[error(not(source))] RecordState),

    /// The proposing party cannot respond to its own proposal.
    #[display("`{_0}` cannot respond to its own proposal")]
    OwnProposal(#[error(not(source))] Role),
}

#[cfg(test)]
mod spec {
    use super::{
        display, overall, DisplayStatus, Overall, PaymentState, RecordState,
        Role,
    };

    #[test]
    fn role_other_is_involutive() {
        assert_eq!(Role::Buyer.other(), Role::Seller);
        assert_eq!(Role::Seller.other(), Role::Buyer);
        assert_eq!(Role::Buyer.other().other(), Role::Buyer);
    }

    #[test]
    fn time_rejection_wins_over_everything() {
        assert_eq!(
            overall(
                RecordState::Rejected,
                RecordState::Accepted,
                PaymentState::PaidComplete,
            ),
            Overall::Rejected,
        );
    }

    #[test]
    fn unaccepted_time_is_negotiating() {
        for time in [RecordState::None, RecordState::Proposed] {
            assert_eq!(
                overall(time, RecordState::None, PaymentState::Unpaid),
                Overall::Negotiating,
            );
        }
    }

    #[test]
    fn location_rejection_after_time_agreement() {
        assert_eq!(
            overall(
                RecordState::Accepted,
                RecordState::Rejected,
                PaymentState::Unpaid,
            ),
            Overall::Rejected,
        );
    }

    #[test]
    fn unaccepted_location_is_negotiating() {
        for location in [RecordState::None, RecordState::Proposed] {
            assert_eq!(
                overall(RecordState::Accepted, location, PaymentState::Unpaid),
                Overall::Negotiating,
            );
        }
    }

    #[test]
    fn payment_progress_after_both_agreements() {
        let derive = |p| overall(RecordState::Accepted, RecordState::Accepted, p);
        assert_eq!(derive(PaymentState::Unpaid), Overall::Agreed);
        assert_eq!(derive(PaymentState::PaidPartial), Overall::PaidPartial);
        assert_eq!(derive(PaymentState::PaidComplete), Overall::PaidComplete);
    }

    #[test]
    fn display_mapping() {
        assert_eq!(
            display(Overall::Negotiating, true, false, false),
            DisplayStatus::ActionRequired,
        );
        assert_eq!(
            display(Overall::Negotiating, false, false, false),
            DisplayStatus::WaitingForAcceptance,
        );
        assert_eq!(
            display(Overall::Agreed, false, false, false),
            DisplayStatus::PaymentRequired,
        );
        assert_eq!(
            display(Overall::PaidPartial, false, false, true),
            DisplayStatus::WaitingForPayment,
        );
        assert_eq!(
            display(Overall::PaidPartial, false, false, false),
            DisplayStatus::PaymentRequired,
        );
        assert_eq!(
            display(Overall::PaidComplete, false, false, true),
            DisplayStatus::ReadyToMeet,
        );
        assert_eq!(
            display(Overall::Rejected, false, false, false),
            DisplayStatus::Rejected,
        );
    }
}
