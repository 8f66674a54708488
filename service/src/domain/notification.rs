//! Notification [`Intent`] definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

use super::{listing, location_negotiation, time_negotiation, user};

/// Intent to notify a user about a negotiation event.
///
/// Produced by every successful mutating command after its transaction
/// commits; handed to the out-of-core push dispatcher fire-and-forget.
#[derive(Clone, Debug)]
pub struct Intent {
    /// ID of the [`user`] to notify.
    pub recipient: user::Id,

    /// [`Kind`] of the event.
    pub kind: Kind,

    /// ID of the [`listing::Listing`] the event is about.
    pub listing_id: listing::Id,

    /// Meeting time, for time-related [`Kind`]s.
    pub meeting_time: Option<time_negotiation::MeetingDateTime>,

    /// Meeting place name, for location-related [`Kind`]s.
    pub location_name: Option<location_negotiation::Name>,

    /// Free-text note attached by the acting party, if any.
    pub message: Option<Message>,
}

/// Kind of a notification [`Intent`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    /// A meeting time was proposed.
    TimeProposed,

    /// The proposed meeting time was accepted.
    TimeAccepted,

    /// The proposed meeting time was rejected.
    TimeRejected,

    /// A meeting location was proposed.
    LocationProposed,

    /// The proposed meeting location was accepted.
    LocationAccepted,

    /// The proposed meeting location was rejected.
    LocationRejected,

    /// The counterparty paid its platform fee.
    PaymentReceived,

    /// Both fees are paid; the meeting may happen.
    ReadyToMeet,
}

/// Free-text note attached to a proposal.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(forward)]
#[serde(try_from = "String")]
pub struct Message(String);

impl Message {
    /// Creates a new [`Message`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Message`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text && !text.is_empty() && text.len() <= 1024
    }
}

impl FromStr for Message {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Message`")
    }
}

impl TryFrom<String> for Message {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Message`")
    }
}

#[cfg(test)]
mod spec {
    use super::Kind;

    #[test]
    fn kind_wire_names() {
        assert_eq!(Kind::TimeProposed.to_string(), "TIME_PROPOSED");
        assert_eq!(Kind::LocationAccepted.to_string(), "LOCATION_ACCEPTED");
        assert_eq!(Kind::PaymentReceived.to_string(), "PAYMENT_RECEIVED");
        assert_eq!(Kind::ReadyToMeet.to_string(), "READY_TO_MEET");
    }
}
