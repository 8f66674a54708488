//! [`DeactivateExpiredListings`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start, Update};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`DeactivateExpiredListings`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between expiry sweeps.
    pub interval: time::Duration,
}

/// [`Task`] marking [`Listing`]s past their availability deadline as
/// inactive.
///
/// Listing expiry is the terminal-abandonment path of a negotiation: once
/// the listing goes inactive, no further commands are admitted on it.
#[derive(Clone, Copy, Debug)]
pub struct DeactivateExpiredListings<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<DeactivateExpiredListings<Self>, Config>>>
    for Service<Db>
where
    DeactivateExpiredListings<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<DeactivateExpiredListings<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = DeactivateExpiredListings {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::DeactivateExpiredListings` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for DeactivateExpiredListings<Service<Db>>
where
    Db: Database<
        Update<By<Listing, listing::AvailabilityDateTime>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = listing::AvailabilityDateTime::now();
        let deactivated = self
            .service
            .database()
            .execute(Update(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if deactivated > 0 {
            log::info!("deactivated {deactivated} expired listings");
        }
        Ok(())
    }
}

/// Error of [`DeactivateExpiredListings`] execution.
pub type ExecutionError = Traced<database::Error>;
