//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::operations::{By, Start};
use derive_more::Debug;

use crate::{domain::notification::Intent, infra::Notifier};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] decoding key the session tokens are verified with.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`task::DeactivateExpiredListings`] configuration.
    pub deactivate_expired_listings:
        task::deactivate_expired_listings::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// Database of this [`Service`].
    database: Db,

    /// [`Notifier`] the notification [`Intent`]s are handed to.
    notifier: Notifier,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::DeactivateExpiredListings<Self>,
                        task::deactivate_expired_listings::Config,
                    >,
                >,
                Ok = (),
                Err: std::error::Error,
            > + Clone
            + 'static,
    {
        let (notifier, inbox) = Notifier::channel();
        let this = Service {
            config,
            database,
            notifier,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(
                svc.config().deactivate_expired_listings,
            )))
            .await
        });
        bg.spawn(infra::notifier::Dispatcher::new(inbox).run());

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns database of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Hands the provided notification [`Intent`] to the dispatcher.
    ///
    /// Fire-and-forget: delivery failures are logged and never surface to the
    /// caller.
    pub fn notify(&self, intent: Intent) {
        self.notifier.dispatch(intent);
    }
}
