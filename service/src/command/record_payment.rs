//! [`Command`] for recording a platform-fee payment.

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing,
        notification::{self, Intent},
        payment,
        status::{Overall, PaymentState, Role},
        user, Listing, Payment,
    },
    infra::{database, Database},
    read::Triple,
    Service,
};

use super::Command;

/// [`Command`] for recording a platform-fee capture acknowledged by the
/// payment gateway.
///
/// Idempotent per payer role: repeating the call for an already-recorded
/// side changes nothing.
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// ID of the [`Listing`] the fee is paid for.
    pub listing_id: listing::Id,

    /// ID of the authenticated [`user`] who paid.
    pub user_id: user::Id,

    /// [`Role`] the payment is recorded for; must match the caller's own.
    pub payer_role: Role,

    /// Opaque capture reference minted by the payment gateway.
    pub transaction_reference: payment::TransactionReference,
}

impl<Db> Command<RecordPayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Triple, listing::Id>>,
            Ok = Triple,
            Err = Traced<database::Error>,
        > + Database<Insert<Payment>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Triple;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RecordPayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment {
            listing_id,
            user_id,
            payer_role,
            transaction_reference,
        } = cmd;

        let now = DateTime::now();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Listing`.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        let mut triple = tx
            .execute(Select(By::<Triple, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let role = triple
            .role_of(&listing, user_id)
            .ok_or(E::NotAParty(user_id))
            .map_err(tracerr::wrap!())?;
        if payer_role != role {
            return Err(tracerr::new!(E::RoleMismatch(payer_role)));
        }

        let overall = triple.overall();
        if !matches!(overall, Overall::Agreed | Overall::PaidPartial) {
            return Err(tracerr::new!(E::NotPayable(overall)));
        }

        let counterparty = triple
            .counterparty_of(&listing, role)
            .ok_or(E::NoCounterparty(listing.id))
            .map_err(tracerr::wrap!())?;

        // The location record exists and is agreed whenever the overall
        // status admits a payment.
        let buyer_id = triple
            .location
            .as_ref()
            .map(|l| l.buyer_id)
            .ok_or(E::NotPayable(overall))
            .map_err(tracerr::wrap!())?;

        let created = triple.payment.is_none();
        let mut record = triple
            .payment
            .take()
            .unwrap_or_else(|| Payment::new(listing.id, buyer_id, now));

        let changed = record.record(payer_role, transaction_reference, now);
        if changed {
            if created {
                tx.execute(Insert(record.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            } else {
                tx.execute(Update(record.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
        }
        triple.payment = Some(record);

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if changed {
            let kind = if triple.payment_state() == PaymentState::PaidComplete
            {
                notification::Kind::ReadyToMeet
            } else {
                notification::Kind::PaymentReceived
            };
            self.notify(Intent {
                recipient: counterparty,
                kind,
                listing_id: listing.id,
                meeting_time: triple.time.as_ref().map(|t| t.meeting_time),
                location_name: triple.location.as_ref().map(|l| l.name.clone()),
                message: None,
            });
        }

        Ok(triple)
    }
}

/// Error of [`RecordPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID has no designated counterparty.
    #[display("`Listing(id: {_0})` has no designated buyer")]
    NoCounterparty(#[error(not(source))] listing::Id),

    /// The caller is not a party to the listing.
    #[display("`User(id: {_0})` is not a party to the listing")]
    NotAParty(#[error(not(source))] user::Id),

    /// The negotiation is not at a payable stage.
    #[display("the negotiation is not payable while `{_0:?}`")]
    NotPayable(#[error(not(source))] Overall),

    /// The declared payer role does not match the caller's own.
    #[display("the caller is not the `{_0}` of the listing")]
    RoleMismatch(#[error(not(source))] Role),
}
