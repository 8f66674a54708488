//! [`Query`] definition.

pub mod exact_location;
pub mod meeting_proposals;

/// [`Query`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Query;

pub use self::{
    exact_location::ExactLocation, meeting_proposals::MeetingProposals,
};
