//! [`Command`] definition.

pub mod authorize_session;
pub mod cancel_location;
pub mod cancel_meeting_time;
pub mod propose_meeting;
pub mod record_payment;
pub mod respond_to_meeting;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_session::AuthorizeSession, cancel_location::CancelLocation,
    cancel_meeting_time::CancelMeetingTime, propose_meeting::ProposeMeeting,
    record_payment::RecordPayment, respond_to_meeting::RespondToMeeting,
};
