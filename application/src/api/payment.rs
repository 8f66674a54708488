//! Platform-fee payment endpoint.

use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{listing, payment, status::Overall, Role},
};

use crate::{CommandDeadline, Error, Service, Session};

use super::Success;

/// Request of the [`record`] endpoint.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    /// Side the payment is recorded for; must match the caller's own role.
    pub payer_role: PayerRole,

    /// Opaque capture reference minted by the payment gateway.
    pub transaction_reference: payment::TransactionReference,
}

/// Side of a payment.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayerRole {
    /// The buyer's platform fee.
    Buyer,

    /// The seller's platform fee.
    Seller,
}

impl From<PayerRole> for Role {
    fn from(role: PayerRole) -> Self {
        match role {
            PayerRole::Buyer => Self::Buyer,
            PayerRole::Seller => Self::Seller,
        }
    }
}

/// Response of the [`record`] endpoint.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    /// Derived overall status after the command.
    pub overall_status: Overall,
}

/// `POST /meetings/:listing_id/payment`: records a platform-fee capture.
#[tracing::instrument(
    skip_all,
    fields(
        http.name = "recordPayment",
        listing = %listing_id,
    ),
)]
pub async fn record(
    Extension(service): Extension<Service>,
    Extension(deadline): Extension<CommandDeadline>,
    session: Session,
    Path(listing_id): Path<listing::Id>,
    Json(req): Json<RecordRequest>,
) -> Result<Success<RecordResponse>, Error> {
    let triple = super::respond(
        deadline,
        service.execute(command::RecordPayment {
            listing_id,
            user_id: session.user_id,
            payer_role: req.payer_role.into(),
            transaction_reference: req.transaction_reference,
        }),
    )
    .await?;

    Ok(Success(RecordResponse {
        overall_status: triple.overall(),
    }))
}
