//! JSON API definitions.
//!
//! Every endpoint maps 1:1 to one engine command or query. Responses are
//! JSON objects carrying a `success` boolean; failures additionally carry a
//! machine-readable `error` kind and a user-safe `message`.

pub mod location;
pub mod meeting;
pub mod payment;

use std::future::Future;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use service::domain::Role;
use tracerr::Traced;

use crate::{AsError, CommandDeadline, Error};

/// Builds the [`Router`] of the JSON API.
pub fn router() -> Router {
    Router::new()
        .route("/meetings/propose", post(meeting::propose))
        .route("/meetings/respond", post(meeting::respond))
        .route("/meetings/:listing_id", get(meeting::proposals))
        .route("/meetings/:listing_id/location", get(location::exact))
        .route(
            "/meetings/:listing_id/cancel-time",
            post(meeting::cancel_time),
        )
        .route(
            "/meetings/:listing_id/cancel-location",
            post(meeting::cancel_location),
        )
        .route("/meetings/:listing_id/payment", post(payment::record))
}

/// Successful JSON API response, enveloping its payload with
/// `"success": true`.
#[derive(Debug)]
pub struct Success<T>(pub T);

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(self.0) {
            Ok(Value::Object(mut fields)) => {
                drop(
                    fields
                        .insert("success".to_owned(), Value::Bool(true)),
                );
                Json(Value::Object(fields)).into_response()
            }
            Ok(other) => Json(serde_json::json!({
                "success": true,
                "result": other,
            }))
            .into_response(),
            Err(e) => Error::internal(&e).into_response(),
        }
    }
}

/// Executes the provided command (or query) future under the configured
/// deadline, converting both its error and an exceeded deadline into an
/// [`Error`].
pub(crate) async fn respond<F, T, E>(
    deadline: CommandDeadline,
    future: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, Traced<E>>>,
    Traced<E>: AsError + std::fmt::Display,
{
    tokio::time::timeout(deadline.0, future)
        .await
        .map_err(|_| Error::timeout())?
        .map_err(AsError::into_error)
}

/// Returns the wire name of the provided [`Role`].
pub(crate) fn role_name(role: Role) -> &'static str {
    match role {
        Role::Buyer => "buyer",
        Role::Seller => "seller",
    }
}
