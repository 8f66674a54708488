//! Fire-and-forget notification dispatch.
//!
//! Commands hand their [`Intent`]s over only after their transaction has
//! committed; a lost intent is logged and never surfaces to the caller, as
//! push delivery reliability is not part of the engine's contract.

use std::convert::Infallible;

use tokio::sync::mpsc;
use tracing as log;

use crate::domain::notification::Intent;

/// Sending side of the notification channel, held by the service.
#[derive(Clone, Debug)]
pub struct Notifier {
    /// Sender of the [`Intent`] channel.
    sender: mpsc::UnboundedSender<Intent>,
}

impl Notifier {
    /// Creates a new [`Notifier`] along with the [`Inbox`] its [`Intent`]s
    /// are drained from.
    #[must_use]
    pub fn channel() -> (Self, Inbox) {
        let (sender, inbox) = mpsc::unbounded_channel();
        (Self { sender }, inbox)
    }

    /// Hands the provided [`Intent`] to the dispatcher, fire-and-forget.
    pub fn dispatch(&self, intent: Intent) {
        if let Err(e) = self.sender.send(intent) {
            log::warn!("notification intent dropped: {e}");
        }
    }
}

/// Receiving side of the notification channel.
pub type Inbox = mpsc::UnboundedReceiver<Intent>;

/// Background drain of the notification [`Inbox`].
///
/// Logs every intent it forwards; the transport push delivery itself lives
/// in the out-of-core dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    /// [`Inbox`] this [`Dispatcher`] drains.
    inbox: Inbox,
}

impl Dispatcher {
    /// Creates a new [`Dispatcher`] draining the provided [`Inbox`].
    #[must_use]
    pub fn new(inbox: Inbox) -> Self {
        Self { inbox }
    }

    /// Runs this [`Dispatcher`] until the sending side is dropped.
    pub async fn run(mut self) -> Result<(), Infallible> {
        while let Some(intent) = self.inbox.recv().await {
            log::info!(
                recipient = %intent.recipient,
                kind = %intent.kind,
                listing = %intent.listing_id,
                "dispatching push notification",
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{listing, notification, user};

    use super::Notifier;

    #[test]
    fn dispatch_reaches_inbox() {
        let (notifier, mut inbox) = Notifier::channel();
        notifier.dispatch(notification::Intent {
            recipient: user::Id::new(),
            kind: notification::Kind::TimeProposed,
            listing_id: listing::Id::new(),
            meeting_time: Some(DateTime::now().coerce()),
            location_name: None,
            message: None,
        });
        let intent = inbox.try_recv().unwrap();
        assert_eq!(intent.kind, notification::Kind::TimeProposed);
    }

    #[test]
    fn dropped_inbox_does_not_panic() {
        let (notifier, inbox) = Notifier::channel();
        drop(inbox);
        notifier.dispatch(notification::Intent {
            recipient: user::Id::new(),
            kind: notification::Kind::ReadyToMeet,
            listing_id: listing::Id::new(),
            meeting_time: None,
            location_name: None,
            message: None,
        });
    }
}
