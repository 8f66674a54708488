//! [`Error`]-related definitions.

use std::fmt;

use axum::response::{IntoResponse, Response};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::{Display, Error as StdError};
use itertools::Itertools as _;
use serde_json::json;
use service::{command, infra::database, query};
use tracerr::{Trace, Traced};

/// Machine-readable kind of a JSON API [`Error`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Kind {
    /// The caller is not a party to the listing.
    #[display("forbidden")]
    Forbidden,

    /// The listing or proposal does not exist.
    #[display("not_found")]
    NotFound,

    /// The request would violate a negotiation invariant.
    #[display("conflict")]
    Conflict,

    /// The sub-state is not right for the requested transition.
    #[display("precondition_failed")]
    PreconditionFailed,

    /// The command deadline was exceeded.
    #[display("timeout")]
    Timeout,

    /// A database or collaborator failure.
    #[display("internal")]
    Internal,
}

impl Kind {
    /// Returns the [`http::StatusCode`] of this [`Kind`].
    #[must_use]
    pub fn status_code(self) -> http::StatusCode {
        match self {
            Self::Forbidden => http::StatusCode::FORBIDDEN,
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::Conflict => http::StatusCode::CONFLICT,
            Self::PreconditionFailed => {
                http::StatusCode::PRECONDITION_FAILED
            }
            Self::Timeout => http::StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Kind`] of this [`Error`].
    pub kind: Kind,

    /// User-safe message of this [`Error`].
    pub message: String,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,
}

impl Error {
    /// Creates a new [`Error`] of the provided [`Kind`].
    #[must_use]
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(Kind::Internal, msg.to_string())
    }

    /// Creates a new [`Error`] representing an exceeded command deadline.
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(Kind::Timeout, "command deadline exceeded")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            kind,
            message,
            backtrace,
        } = self;

        write!(
            f,
            "[{kind}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.kind.status_code(),
            axum::Json(json!({
                "success": false,
                "error": self.kind.to_string(),
                "message": self.message,
            })),
        )
            .into_response()
    }
}

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new(Kind::Forbidden, self.to_string()))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for command::authorize_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::authorize_session::ExecutionError as E;

        match self {
            E::JsonWebTokenDecodeError(_) => Some(Error::new(
                Kind::Forbidden,
                "invalid or expired session token",
            )),
        }
    }
}

impl AsError for command::propose_meeting::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::propose_meeting::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::ListingNotExists(_) => Kind::NotFound,
            E::NotAParty(_) => Kind::Forbidden,
            E::ListingNotActive(_)
            | E::LocationBeforeTimeAgreed(_)
            | E::NoCounterparty(_)
            | E::PaymentAlreadyRecorded(_) => Kind::Conflict,
            E::EmptyProposal
            | E::LocationOnPendingTime
            | E::Propose(_) => Kind::PreconditionFailed,
        };
        Some(Error::new(kind, self.to_string()))
    }
}

impl AsError for command::respond_to_meeting::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::respond_to_meeting::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::ListingNotExists(_) | E::ProposalNotExists(_) => Kind::NotFound,
            E::NotAParty(_) => Kind::Forbidden,
            E::NoCounterparty(_) => Kind::Conflict,
            E::Respond(_) => Kind::PreconditionFailed,
        };
        Some(Error::new(kind, self.to_string()))
    }
}

impl AsError for command::cancel_meeting_time::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::cancel_meeting_time::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::ListingNotExists(_) | E::NegotiationNotExists(_) => {
                Kind::NotFound
            }
            E::NotAParty(_) => Kind::Forbidden,
            E::LocationStillNegotiated(_) => Kind::Conflict,
        };
        Some(Error::new(kind, self.to_string()))
    }
}

impl AsError for command::cancel_location::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::cancel_location::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::ListingNotExists(_) => Kind::NotFound,
            E::NotAParty(_) => Kind::Forbidden,
            E::PaymentAlreadyRecorded(_) => Kind::Conflict,
        };
        Some(Error::new(kind, self.to_string()))
    }
}

impl AsError for command::record_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::record_payment::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::ListingNotExists(_) => Kind::NotFound,
            E::NotAParty(_) | E::RoleMismatch(_) => Kind::Forbidden,
            E::NoCounterparty(_) => Kind::Conflict,
            E::NotPayable(_) => Kind::PreconditionFailed,
        };
        Some(Error::new(kind, self.to_string()))
    }
}

impl AsError for query::meeting_proposals::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use query::meeting_proposals::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::ListingNotExists(_) => Kind::NotFound,
            E::NotAParty(_) => Kind::Forbidden,
        };
        Some(Error::new(kind, self.to_string()))
    }
}

impl AsError for query::exact_location::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use query::exact_location::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::NoMeeting(_) => Kind::NotFound,
        };
        Some(Error::new(kind, self.to_string()))
    }
}

#[cfg(test)]
mod spec {
    use super::Kind;

    #[test]
    fn kind_wire_names_and_statuses() {
        assert_eq!(Kind::Forbidden.to_string(), "forbidden");
        assert_eq!(Kind::Forbidden.status_code().as_u16(), 403);
        assert_eq!(Kind::NotFound.to_string(), "not_found");
        assert_eq!(Kind::NotFound.status_code().as_u16(), 404);
        assert_eq!(Kind::Conflict.status_code().as_u16(), 409);
        assert_eq!(
            Kind::PreconditionFailed.to_string(),
            "precondition_failed",
        );
        assert_eq!(Kind::PreconditionFailed.status_code().as_u16(), 412);
        assert_eq!(Kind::Timeout.status_code().as_u16(), 504);
        assert_eq!(Kind::Internal.status_code().as_u16(), 500);
    }
}
