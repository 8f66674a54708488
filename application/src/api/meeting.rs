//! Meeting negotiation endpoints.

use axum::{extract::Path, Extension, Json};
use common::{DateTime, DateTimeOf, Latitude, Longitude};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, propose_meeting, respond_to_meeting, Command as _},
    domain::{
        listing, location_negotiation, notification,
        status::{DisplayStatus, Overall, PaymentState, RecordState},
    },
    query::{self, Query as _},
    read::Snapshot,
};
use uuid::Uuid;

use crate::{error::Kind, CommandDeadline, Error, Service, Session};

use super::{role_name, Success};

/// Request of the [`propose`] endpoint.
#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    /// ID of the listing to negotiate on.
    pub listing_id: listing::Id,

    /// Proposed meeting time, as an RFC 3339 string.
    pub proposed_time: Option<String>,

    /// Human-readable name of the proposed meeting place.
    pub proposed_location: Option<location_negotiation::Name>,

    /// Latitude of the proposed meeting place, in decimal degrees.
    pub lat: Option<f64>,

    /// Longitude of the proposed meeting place, in decimal degrees.
    pub lng: Option<f64>,

    /// Free-text note to attach to the notification.
    pub message: Option<notification::Message>,
}

/// Response of the [`propose`] endpoint.
#[derive(Debug, Serialize)]
pub struct ProposeResponse {
    /// ID of the proposal record the command touched.
    pub proposal_id: Uuid,

    /// Derived overall status after the command.
    pub overall_status: Overall,
}

/// `POST /meetings/propose`: proposes a meeting time and/or location.
#[tracing::instrument(
    skip_all,
    fields(
        http.name = "proposeMeeting",
        listing = %req.listing_id,
    ),
)]
pub async fn propose(
    Extension(service): Extension<Service>,
    Extension(deadline): Extension<CommandDeadline>,
    session: Session,
    Json(req): Json<ProposeRequest>,
) -> Result<Success<ProposeResponse>, Error> {
    let meeting_time = req
        .proposed_time
        .as_deref()
        .map(DateTime::from_rfc3339)
        .transpose()
        .map_err(|e| {
            Error::new(
                Kind::PreconditionFailed,
                format!("invalid `proposed_time`: {e}"),
            )
        })?
        .map(DateTimeOf::coerce);

    let location = match (req.proposed_location, req.lat, req.lng) {
        (None, None, None) => None,
        (Some(name), Some(lat), Some(lng)) => {
            Some(propose_meeting::ProposedLocation {
                name,
                latitude: Latitude::new(lat).ok_or_else(|| {
                    Error::new(Kind::PreconditionFailed, "invalid `lat`")
                })?,
                longitude: Longitude::new(lng).ok_or_else(|| {
                    Error::new(Kind::PreconditionFailed, "invalid `lng`")
                })?,
            })
        }
        (_, _, _) => {
            return Err(Error::new(
                Kind::PreconditionFailed,
                "a location proposal needs `proposed_location`, `lat` and \
                 `lng` together",
            ))
        }
    };

    let output = super::respond(
        deadline,
        service.execute(command::ProposeMeeting {
            listing_id: req.listing_id,
            user_id: session.user_id,
            meeting_time,
            location,
            message: req.message,
        }),
    )
    .await?;

    Ok(Success(ProposeResponse {
        proposal_id: output.proposal.id(),
        overall_status: output.triple.overall(),
    }))
}

/// Request of the [`respond()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// ID of the proposal record being responded to.
    pub proposal_id: Uuid,

    /// Which negotiation the proposal belongs to.
    pub proposal_type: ProposalType,

    /// The response itself.
    pub response: ResponseKind,
}

/// Negotiation a proposal belongs to.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    /// The time negotiation.
    Time,

    /// The location negotiation.
    Location,
}

/// Response of a party to a proposal.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// The proposal is accepted.
    Accepted,

    /// The proposal is rejected.
    Rejected,
}

/// Response of the [`respond()`] endpoint.
#[derive(Debug, Serialize)]
pub struct RespondResponse {
    /// ID of the listing the proposal belongs to.
    pub listing_id: listing::Id,

    /// Derived overall status after the command.
    pub overall_status: Overall,
}

/// `POST /meetings/respond`: accepts or rejects the latest proposal.
#[tracing::instrument(
    skip_all,
    fields(
        http.name = "respondToMeeting",
        proposal = %req.proposal_id,
    ),
)]
pub async fn respond(
    Extension(service): Extension<Service>,
    Extension(deadline): Extension<CommandDeadline>,
    session: Session,
    Json(req): Json<RespondRequest>,
) -> Result<Success<RespondResponse>, Error> {
    let target = match req.proposal_type {
        ProposalType::Time => {
            respond_to_meeting::Target::Time(req.proposal_id.into())
        }
        ProposalType::Location => {
            respond_to_meeting::Target::Location(req.proposal_id.into())
        }
    };
    let decision = match req.response {
        ResponseKind::Accepted => respond_to_meeting::Decision::Accepted,
        ResponseKind::Rejected => respond_to_meeting::Decision::Rejected,
    };

    let output = super::respond(
        deadline,
        service.execute(command::RespondToMeeting {
            user_id: session.user_id,
            target,
            decision,
        }),
    )
    .await?;

    Ok(Success(RespondResponse {
        listing_id: output.listing_id,
        overall_status: output.triple.overall(),
    }))
}

/// Time negotiation record, as served to the API.
#[derive(Debug, Serialize)]
pub struct TimeView {
    /// ID of the proposal record.
    pub proposal_id: Uuid,

    /// Party who made the latest proposal.
    pub proposed_by: &'static str,

    /// Proposed meeting time, as an RFC 3339 string.
    pub meeting_time: String,

    /// Sub-state of the record.
    pub state: RecordState,
}

/// Location negotiation record, as served to the API.
///
/// Exact coordinates are deliberately absent: the disclosure-gated location
/// endpoint is the only coordinate source.
#[derive(Debug, Serialize)]
pub struct LocationView {
    /// ID of the proposal record.
    pub proposal_id: Uuid,

    /// Party who made the latest proposal.
    pub proposed_by: &'static str,

    /// Human-readable name of the meeting place.
    pub name: location_negotiation::Name,

    /// Sub-state of the record.
    pub state: RecordState,
}

/// Payment record, as served to the API.
#[derive(Debug, Serialize)]
pub struct PaymentView {
    /// Sub-state of the record.
    pub state: PaymentState,

    /// Whether the buyer's fee is captured.
    pub buyer_paid: bool,

    /// Whether the seller's fee is captured.
    pub seller_paid: bool,
}

/// Response of the [`proposals`] endpoint.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    /// ID of the listing the negotiation is about.
    pub listing_id: listing::Id,

    /// Role of the viewing party.
    pub viewer_role: &'static str,

    /// Derived overall status.
    pub overall_status: Overall,

    /// Derived per-viewer display status.
    pub display_status: DisplayStatus,

    /// Whether the viewer has to respond to the time proposal.
    pub time_action_required: bool,

    /// Whether the viewer has to respond to the location proposal.
    pub location_action_required: bool,

    /// Time negotiation record, if any.
    pub time: Option<TimeView>,

    /// Location negotiation record, if any.
    pub location: Option<LocationView>,

    /// Payment record, if any.
    pub payment: Option<PaymentView>,
}

impl From<Snapshot> for SnapshotResponse {
    fn from(snapshot: Snapshot) -> Self {
        let Snapshot {
            listing_id,
            viewer_role,
            overall,
            display_status,
            time_action_required,
            location_action_required,
            triple,
        } = snapshot;

        Self {
            listing_id,
            viewer_role: role_name(viewer_role),
            overall_status: overall,
            display_status,
            time_action_required,
            location_action_required,
            time: triple.time.as_ref().map(|t| TimeView {
                proposal_id: t.id.into(),
                proposed_by: role_name(t.proposed_by),
                meeting_time: t.meeting_time.to_rfc3339(),
                state: t.state(),
            }),
            location: triple.location.as_ref().map(|l| LocationView {
                proposal_id: l.id.into(),
                proposed_by: role_name(l.proposed_by),
                name: l.name.clone(),
                state: l.state(),
            }),
            payment: triple.payment.as_ref().map(|p| PaymentView {
                state: p.state(),
                buyer_paid: p.buyer_paid_at.is_some(),
                seller_paid: p.seller_paid_at.is_some(),
            }),
        }
    }
}

/// `GET /meetings/:listing_id`: the full negotiation snapshot.
#[tracing::instrument(
    skip_all,
    fields(
        http.name = "getMeetingProposals",
        listing = %listing_id,
    ),
)]
pub async fn proposals(
    Extension(service): Extension<Service>,
    Extension(deadline): Extension<CommandDeadline>,
    session: Session,
    Path(listing_id): Path<listing::Id>,
) -> Result<Success<SnapshotResponse>, Error> {
    let snapshot = super::respond(
        deadline,
        service.execute(query::MeetingProposals {
            listing_id,
            user_id: session.user_id,
        }),
    )
    .await?;

    Ok(Success(snapshot.into()))
}

/// Response of the cancellation endpoints.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Derived overall status after the command.
    pub overall_status: Overall,
}

/// `POST /meetings/:listing_id/cancel-time`: un-locks an agreed meeting
/// time.
#[tracing::instrument(
    skip_all,
    fields(
        http.name = "cancelMeetingTime",
        listing = %listing_id,
    ),
)]
pub async fn cancel_time(
    Extension(service): Extension<Service>,
    Extension(deadline): Extension<CommandDeadline>,
    session: Session,
    Path(listing_id): Path<listing::Id>,
) -> Result<Success<StatusResponse>, Error> {
    let triple = super::respond(
        deadline,
        service.execute(command::CancelMeetingTime {
            listing_id,
            user_id: session.user_id,
        }),
    )
    .await?;

    Ok(Success(StatusResponse {
        overall_status: triple.overall(),
    }))
}

/// `POST /meetings/:listing_id/cancel-location`: drops the location
/// negotiation entirely.
#[tracing::instrument(
    skip_all,
    fields(
        http.name = "cancelLocation",
        listing = %listing_id,
    ),
)]
pub async fn cancel_location(
    Extension(service): Extension<Service>,
    Extension(deadline): Extension<CommandDeadline>,
    session: Session,
    Path(listing_id): Path<listing::Id>,
) -> Result<Success<StatusResponse>, Error> {
    let triple = super::respond(
        deadline,
        service.execute(command::CancelLocation {
            listing_id,
            user_id: session.user_id,
        }),
    )
    .await?;

    Ok(Success(StatusResponse {
        overall_status: triple.overall(),
    }))
}
