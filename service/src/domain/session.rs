//! [`Session`] definitions.
//!
//! Session issuance and expiry live in the out-of-core account subsystem;
//! the engine only resolves an opaque bearer token to a [`user::Id`].

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};

use super::user;

/// Authorized session of a [`user`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`user`] this [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(
        rename = "exp",
        with = "common::datetime::serde::unix_timestamp"
    )]
    pub expires_at: ExpirationDateTime,
}

/// Opaque session token.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[as_ref(forward)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] from the provided opaque string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// [`DateTime`] when a [`Session`] expires.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
