//! Read model definitions.

pub mod disclosure;
pub mod negotiation;

pub use self::{
    disclosure::Disclosure,
    negotiation::{Snapshot, Triple},
};
