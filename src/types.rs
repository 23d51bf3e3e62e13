//! Core data structures for locations and sky quality samples.
//!
//! - [`Coordinate`] - Latitude/longitude pair with distance calculations
//! - [`Location`] - Deduplicated place holding references to samples
//! - [`Sample`] - One sky brightness measurement and its submitter
//! - [`LocationView`], [`SampleView`], [`NearbyLocation`] - Plain projections handed
//!   back to callers

use crate::geo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Accepted sky brightness range in magnitudes per square arcsecond.
pub const MPAS_RANGE: RangeInclusive<f64> = 12.0..=21.0;

/// Accepted search radius range in miles.
pub const SEARCH_MILES_RANGE: RangeInclusive<f64> = 5.0..=12500.0;

/// Identifier of a stored [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub u64);

/// Identifier of a stored [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleId(pub u64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 exclusive to 180 inclusive)
    pub longitude: f64,
}

impl Coordinate {
    /// Constructs a new Coordinate.
    ///
    /// ```
    /// use skyglow::Coordinate;
    ///
    /// let co = Coordinate::new(40.0, -75.0);
    /// assert_eq!(co.latitude, 40.0);
    /// assert_eq!(co.longitude, -75.0);
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns this coordinate rounded to two decimal places.
    pub fn rounded(&self) -> Self {
        let (latitude, longitude) = geo::round_coordinate(self.latitude, self.longitude);
        Self::new(latitude, longitude)
    }

    /// Whether latitude lies in `[-90, 90]` and longitude in `(-180, 180]`.
    ///
    /// ```
    /// use skyglow::Coordinate;
    ///
    /// assert!(Coordinate::new(90.0, 180.0).is_valid());
    /// assert!(!Coordinate::new(0.0, -180.0).is_valid());
    /// assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && self.longitude > -180.0
            && self.longitude <= 180.0
    }

    /// Great-circle distance to another coordinate in miles.
    ///
    /// ```
    /// use skyglow::Coordinate;
    ///
    /// let a = Coordinate::new(40.0, -75.0);
    /// let b = Coordinate::new(41.0, -75.0);
    /// assert!((a.distance_to(&b) - 69.1).abs() < 0.1);
    /// ```
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        geo::distance_miles(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub(crate) fn grid_key(&self) -> (i64, i64) {
        geo::grid_key(self.latitude, self.longitude)
    }
}

/// A place where sky quality has been measured.
///
/// Locations never hold brightness values directly, only references to
/// [`Sample`]s, so an edited or deleted sample is reflected on the next read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Identifier assigned by the store at creation
    pub id: LocationId,
    /// Coordinate as stored, already rounded by the caller
    pub coordinate: Coordinate,
    /// References to samples measured here, without duplicates
    pub sample_refs: Vec<SampleId>,
}

impl Location {
    /// Whether this location references the given sample.
    pub fn has_ref(&self, sample: SampleId) -> bool {
        self.sample_refs.contains(&sample)
    }

    /// Projection returned to callers.
    pub fn to_view(&self) -> LocationView {
        LocationView {
            id: self.id,
            lat: self.coordinate.latitude,
            lon: self.coordinate.longitude,
        }
    }
}

/// A single sky brightness measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Identifier assigned by the store at creation
    pub id: SampleId,
    /// Sky brightness in magnitudes per square arcsecond, within [`MPAS_RANGE`]
    pub mpas: f64,
    /// Submitter identity; empty means anonymous
    pub owner_id: String,
    /// Creation time, never modified
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    /// Whether the sample was submitted without an identity.
    pub fn is_anonymous(&self) -> bool {
        self.owner_id.is_empty()
    }

    /// Projection returned to callers.
    pub fn to_view(&self) -> SampleView {
        SampleView {
            id: self.id,
            mpas: self.mpas,
            timestamp: self.timestamp,
        }
    }
}

/// Caller-facing representation of a [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationView {
    /// Location identifier
    pub id: LocationId,
    /// Stored latitude
    pub lat: f64,
    /// Stored longitude
    pub lon: f64,
}

/// Caller-facing representation of a [`Sample`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleView {
    /// Sample identifier
    pub id: SampleId,
    /// Sky brightness in magnitudes per square arcsecond
    pub mpas: f64,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl SampleView {
    /// Timestamp formatted as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Aggregated brightness for one rounded coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrightnessSummary {
    /// Coordinate rounded to two decimals
    pub coordinate: Coordinate,
    /// Number of live samples folded into the average
    pub sample_count: usize,
    /// Mean sky brightness in magnitudes per square arcsecond
    pub average_mpas: f64,
}

/// A ranked result of a proximity query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyLocation {
    /// Rounded latitude of the group
    pub lat: f64,
    /// Rounded longitude of the group
    pub lon: f64,
    /// Number of live samples folded into the average
    pub sample_count: usize,
    /// Mean sky brightness in magnitudes per square arcsecond
    pub average_mpas: f64,
    /// Naked eye limiting magnitude derived from `average_mpas`
    pub nelm: f64,
    /// Distance from the query origin in miles
    pub distance_miles: f64,
}

/// Outcome of deleting a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionReport {
    /// The deleted sample
    pub sample_id: SampleId,
    /// Locations whose reference to the sample was removed
    pub affected_location_ids: Vec<LocationId>,
    /// Locations still holding the reference because their update failed
    pub failed_location_ids: Vec<LocationId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_bounds() {
        assert!(Coordinate::new(-90.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 179.99).is_valid());
        assert!(!Coordinate::new(90.01, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.01).is_valid());
        assert!(Coordinate::new(0.0, -179.99).is_valid());
    }

    #[test]
    fn rounded_coordinate_is_stable() {
        let co = Coordinate::new(39.996, -75.004).rounded();
        assert_eq!(co.rounded(), co);
        assert_eq!(co.grid_key(), (4000, -7500));
    }

    #[test]
    fn sample_view_formats_timestamp() {
        let timestamp = DateTime::parse_from_rfc3339("2016-03-04T21:15:09.250Z")
            .map(|t| t.with_timezone(&Utc))
            .unwrap();
        let sample = Sample {
            id: SampleId(7),
            mpas: 19.25,
            owner_id: String::new(),
            timestamp,
        };
        assert!(sample.is_anonymous());
        let view = sample.to_view();
        assert_eq!(view.id, SampleId(7));
        assert_eq!(view.timestamp_string(), "2016-03-04T21:15:09Z");
    }

    #[test]
    fn location_refs() {
        let location = Location {
            id: LocationId(1),
            coordinate: Coordinate::new(40.0, -75.0),
            sample_refs: vec![SampleId(3), SampleId(5)],
        };
        assert!(location.has_ref(SampleId(5)));
        assert!(!location.has_ref(SampleId(4)));
        assert_eq!(location.to_view().lat, 40.0);
    }
}
