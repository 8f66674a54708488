//! [`Session`]-extraction definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use service::{
    command::{self, Command as _},
    domain::{session, user},
};

use crate::{
    error::{AsError, Error, Kind},
    Service,
};

/// Authorized session of the current request.
///
/// Extracted from the `Authorization: Bearer` header and resolved to a user
/// through the session-resolver command; every endpoint requires one.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the authenticated user.
    pub user_id: user::Id,

    /// [`DateTime`] when the session expires.
    pub expires_at: DateTime,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                Error::internal(&"missing `Service` extension")
            })?;

        match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => {
                let token = session::Token::new(bearer.token().to_owned());
                service
                    .execute(command::AuthorizeSession { token })
                    .await
                    .map(|s| Session {
                        user_id: s.user_id,
                        expires_at: s.expires_at.coerce(),
                    })
                    .map_err(AsError::into_error)
            }
            Err(e) => Err(if e.is_missing() {
                Error::new(Kind::Forbidden, "authorization required")
            } else {
                e.into_error()
            }),
        }
    }
}
