//! Geographic coordinate definitions.

use std::str::FromStr;

use derive_more::{Debug, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

/// Latitude of a geographic point, in decimal degrees.
#[derive(Clone, Copy, Debug, Display, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Latitude(f64);

impl Latitude {
    /// Creates a new [`Latitude`] if the given `degrees` value is valid.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        (degrees.is_finite() && (-90.0..=90.0).contains(&degrees))
            .then_some(Self(degrees))
    }

    /// Returns this [`Latitude`] as decimal degrees.
    #[must_use]
    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl FromStr for Latitude {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Latitude`")
    }
}

/// Longitude of a geographic point, in decimal degrees.
#[derive(Clone, Copy, Debug, Display, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Longitude(f64);

impl Longitude {
    /// Creates a new [`Longitude`] if the given `degrees` value is valid.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        (degrees.is_finite() && (-180.0..=180.0).contains(&degrees))
            .then_some(Self(degrees))
    }

    /// Returns this [`Longitude`] as decimal degrees.
    #[must_use]
    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl FromStr for Longitude {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Longitude`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Latitude, Longitude};

    #[test]
    fn latitude_bounds() {
        assert!(Latitude::new(0.0).is_some());
        assert!(Latitude::new(90.0).is_some());
        assert!(Latitude::new(-90.0).is_some());
        assert!(Latitude::new(90.0001).is_none());
        assert!(Latitude::new(f64::NAN).is_none());
    }

    #[test]
    fn longitude_bounds() {
        assert!(Longitude::new(180.0).is_some());
        assert!(Longitude::new(-180.0).is_some());
        assert!(Longitude::new(-180.0001).is_none());
        assert!(Longitude::new(f64::INFINITY).is_none());
    }

    #[test]
    fn from_str() {
        assert_eq!(
            "55.7558".parse::<Latitude>().unwrap().degrees(),
            55.7558,
        );
        assert!("91".parse::<Latitude>().is_err());
        assert!("east".parse::<Longitude>().is_err());
    }
}
