//! Disclosure-gated location endpoint.

use axum::{extract::Path, Extension};
use serde::Serialize;
use service::{
    domain::{listing, location_negotiation},
    query::{self, Query as _},
    read::Disclosure,
};

use crate::{CommandDeadline, Error, Service, Session};

use super::Success;

/// Response of the [`exact`] endpoint.
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    /// Human-readable name of the meeting place.
    pub name: location_negotiation::Name,

    /// Exact latitude, present only within the disclosure window.
    pub latitude: Option<f64>,

    /// Exact longitude, present only within the disclosure window.
    pub longitude: Option<f64>,

    /// Agreed meeting time, as an RFC 3339 string.
    pub meeting_time: String,

    /// Human-readable note on coordinate availability, when the exact
    /// coordinates are withheld.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Disclosure> for LocationResponse {
    fn from(disclosure: Disclosure) -> Self {
        match disclosure {
            Disclosure::Exact {
                name,
                latitude,
                longitude,
                meeting_time,
            } => Self {
                name,
                latitude: Some(latitude.degrees()),
                longitude: Some(longitude.degrees()),
                meeting_time: meeting_time.to_rfc3339(),
                message: None,
            },
            Disclosure::Approximate {
                name,
                meeting_time,
                coordinates_available_at,
            } => Self {
                name,
                latitude: None,
                longitude: None,
                meeting_time: meeting_time.to_rfc3339(),
                message: Some(coordinates_available_at.map_or_else(
                    || "The meeting window has closed.".to_owned(),
                    |at| {
                        format!(
                            "Exact coordinates will be available from {}.",
                            at.to_rfc3339(),
                        )
                    },
                )),
            },
        }
    }
}

/// `GET /meetings/:listing_id/location`: the disclosure-gated meeting
/// location.
#[tracing::instrument(
    skip_all,
    fields(
        http.name = "getExactLocation",
        listing = %listing_id,
    ),
)]
pub async fn exact(
    Extension(service): Extension<Service>,
    Extension(deadline): Extension<CommandDeadline>,
    session: Session,
    Path(listing_id): Path<listing::Id>,
) -> Result<Success<LocationResponse>, Error> {
    let disclosure = super::respond(
        deadline,
        service.execute(query::ExactLocation {
            listing_id,
            user_id: session.user_id,
        }),
    )
    .await?;

    Ok(Success(disclosure.into()))
}
