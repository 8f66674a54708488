//! [`Command`] for resolving a [`Session`] token to a user.

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for resolving a [`Session`] token to a user.
///
/// Session issuance lives in the out-of-core account subsystem; this command
/// only verifies the token signature and expiry.
#[derive(Clone, Debug, From)]
pub struct AuthorizeSession {
    /// [`Session`] token to resolve.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeSession { token } = cmd;

        jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}
