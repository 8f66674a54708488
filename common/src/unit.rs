//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity update.
#[derive(Clone, Copy, Debug)]
pub struct Update;

/// Marker type describing a proposal acceptance.
#[derive(Clone, Copy, Debug)]
pub struct Acceptance;

/// Marker type describing a proposal rejection.
#[derive(Clone, Copy, Debug)]
pub struct Rejection;

/// Marker type describing an in-person meeting.
#[derive(Clone, Copy, Debug)]
pub struct Meeting;

/// Marker type describing a payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// Marker type describing an availability deadline.
#[derive(Clone, Copy, Debug)]
pub struct Availability;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
