//! Domain definitions.

pub mod listing;
pub mod location_negotiation;
pub mod notification;
pub mod payment;
pub mod session;
pub mod status;
pub mod time_negotiation;
pub mod user;

pub use self::{
    listing::Listing, location_negotiation::LocationNegotiation,
    payment::Payment, session::Session, status::Role,
    time_negotiation::TimeNegotiation,
};
