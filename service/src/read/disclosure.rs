//! Location disclosure gate definitions.
//!
//! Exact coordinates are released only within a bounded window around the
//! agreed meeting time: suppressed until the meeting is imminent and
//! re-suppressed well after it concludes.

use std::time::Duration;

use common::{DateTime, Latitude, Longitude};

use crate::domain::{
    location_negotiation, status::RecordState, time_negotiation,
};

use super::Triple;

/// How long before the meeting the exact coordinates unlock.
pub const EXACT_BEFORE: Duration = Duration::from_secs(60 * 60);

/// How long after the meeting the exact coordinates stay unlocked.
pub const EXACT_AFTER: Duration = Duration::from_secs(2 * 60 * 60);

/// Disclosure-gated view of an agreed meeting location.
#[derive(Clone, Debug)]
pub enum Disclosure {
    /// The meeting is imminent (or just concluded): full coordinates.
    Exact {
        /// Human-readable name of the meeting place.
        name: location_negotiation::Name,

        /// Exact [`Latitude`] of the meeting place.
        latitude: Latitude,

        /// Exact [`Longitude`] of the meeting place.
        longitude: Longitude,

        /// Agreed meeting time.
        meeting_time: time_negotiation::MeetingDateTime,
    },

    /// Outside the disclosure window: the name only.
    Approximate {
        /// Human-readable name of the meeting place.
        name: location_negotiation::Name,

        /// Agreed meeting time.
        meeting_time: time_negotiation::MeetingDateTime,

        /// When the exact coordinates unlock; [`None`] once the window has
        /// already closed.
        coordinates_available_at: Option<DateTime>,
    },
}

/// Applies the disclosure gate to the provided sibling `triple`.
///
/// [`None`] means "no meeting": either the location negotiation is absent or
/// it is not agreed yet.
#[must_use]
pub fn disclose(triple: &Triple, now: DateTime) -> Option<Disclosure> {
    if triple.location_state() != RecordState::Accepted {
        return None;
    }
    let location = triple.location.as_ref()?;
    // The time record exists and is accepted whenever the location is.
    let meeting_time = triple.time.as_ref()?.meeting_time;

    let opens_at = meeting_time - EXACT_BEFORE;
    let closes_at = meeting_time + EXACT_AFTER;
    let now_t: time_negotiation::MeetingDateTime = now.coerce();

    Some(if now_t >= opens_at && now_t <= closes_at {
        Disclosure::Exact {
            name: location.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            meeting_time,
        }
    } else {
        Disclosure::Approximate {
            name: location.name.clone(),
            meeting_time,
            coordinates_available_at: (now_t < opens_at)
                .then(|| opens_at.coerce()),
        }
    })
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{DateTime, Latitude, Longitude};

    use crate::{
        domain::{
            listing, location_negotiation,
            status::Role,
            time_negotiation::TimeNegotiation,
            user, LocationNegotiation,
        },
        read::Triple,
    };

    use super::{disclose, Disclosure, EXACT_AFTER, EXACT_BEFORE};

    const SECOND: Duration = Duration::from_secs(1);

    fn agreed_triple(meeting_in: Duration, now: DateTime) -> Triple {
        let listing_id = listing::Id::new();
        let buyer = user::Id::new();

        let mut tn = TimeNegotiation::propose(
            listing_id,
            buyer,
            Role::Buyer,
            (now + meeting_in).coerce(),
            now,
        )
        .unwrap();
        tn.accept(Role::Seller, now).unwrap();

        let mut ln = LocationNegotiation::propose(
            listing_id,
            buyer,
            Role::Seller,
            location_negotiation::Name::new("Harbor bridge").unwrap(),
            Latitude::new(59.3293).unwrap(),
            Longitude::new(18.0686).unwrap(),
            now,
        );
        ln.accept(Role::Buyer, now).unwrap();

        Triple {
            time: Some(tn),
            location: Some(ln),
            payment: None,
        }
    }

    fn is_exact(d: &Disclosure) -> bool {
        matches!(d, Disclosure::Exact { .. })
    }

    #[test]
    fn no_meeting_without_agreed_location() {
        let now = DateTime::now();
        let mut triple = agreed_triple(Duration::from_secs(4 * 3600), now);
        assert!(disclose(&triple, now).is_some());

        triple.location.as_mut().unwrap().accepted_at = None;
        assert!(disclose(&triple, now).is_none());
        assert!(disclose(&Triple::default(), now).is_none());
    }

    #[test]
    fn window_boundaries() {
        let now = DateTime::now();
        let meeting_in = Duration::from_secs(24 * 3600);
        let triple = agreed_triple(meeting_in, now);
        let meeting = now + meeting_in;

        // One second before the window opens.
        let d = disclose(&triple, meeting - EXACT_BEFORE - SECOND).unwrap();
        assert!(!is_exact(&d));

        // Exactly at the opening boundary.
        let d = disclose(&triple, meeting - EXACT_BEFORE).unwrap();
        assert!(is_exact(&d));

        // Exactly at the closing boundary.
        let d = disclose(&triple, meeting + EXACT_AFTER).unwrap();
        assert!(is_exact(&d));

        // One second past the window.
        let d = disclose(&triple, meeting + EXACT_AFTER + SECOND).unwrap();
        assert!(!is_exact(&d));
    }

    #[test]
    fn approximate_reports_unlock_instant_only_before_window() {
        let now = DateTime::now();
        let meeting_in = Duration::from_secs(24 * 3600);
        let triple = agreed_triple(meeting_in, now);
        let meeting = now + meeting_in;

        match disclose(&triple, now).unwrap() {
            Disclosure::Approximate {
                coordinates_available_at,
                ..
            } => {
                assert_eq!(
                    coordinates_available_at,
                    Some(meeting - EXACT_BEFORE),
                );
            }
            Disclosure::Exact { .. } => panic!("window not yet open"),
        }

        match disclose(&triple, meeting + EXACT_AFTER + SECOND).unwrap() {
            Disclosure::Approximate {
                coordinates_available_at,
                ..
            } => assert_eq!(coordinates_available_at, None),
            Disclosure::Exact { .. } => panic!("window already closed"),
        }
    }
}
