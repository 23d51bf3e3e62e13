//! Great-circle math and coordinate rounding.
//!
//! Distances are computed with the spherical law of cosines on a unit sphere and
//! scaled to miles with [`EARTH_RADIUS_MILES`]. Coordinates used as deduplication
//! keys always pass through [`round_coordinate`] first, so display and comparison
//! never drift apart.

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Number of decimal places kept by [`round_coordinate`].
pub const COORDINATE_PRECISION: u32 = 2;

const SCALE: f64 = 10_i64.pow(COORDINATE_PRECISION) as f64;

/// Angular distance in radians between two points given in decimal degrees.
///
/// Latitudes are converted to colatitudes (`90° - lat`) and combined as
/// `acos(sin φ1 · sin φ2 · cos(θ1 - θ2) + cos φ1 · cos φ2)`. The cosine is
/// clamped to `[-1, 1]` so identical and antipodal points do not produce `NaN`.
///
/// # Examples
///
/// ```
/// use skyglow::geo::distance;
///
/// assert!(distance(40.0, -75.0, 40.0, -75.0).abs() < 1e-9);
/// assert!((distance(0.0, 0.0, 0.0, 180.0) - std::f64::consts::PI).abs() < 1e-9);
/// ```
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = (90.0 - lat1).to_radians();
    let phi2 = (90.0 - lat2).to_radians();
    let theta1 = lon1.to_radians();
    let theta2 = lon2.to_radians();

    let cos = phi1.sin() * phi2.sin() * (theta1 - theta2).cos() + phi1.cos() * phi2.cos();
    cos.clamp(-1.0, 1.0).acos()
}

/// Great-circle distance in miles between two points given in decimal degrees.
///
/// ```
/// use skyglow::geo::distance_miles;
///
/// // Philadelphia to New York, roughly 80 miles
/// let d = distance_miles(39.95, -75.17, 40.71, -74.01);
/// assert!(d > 75.0 && d < 85.0);
/// ```
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance(lat1, lon1, lat2, lon2) * EARTH_RADIUS_MILES
}

/// Rounds a coordinate pair to [`COORDINATE_PRECISION`] decimal places.
///
/// Halves round away from zero on the scaled value, so `0.125` becomes `0.13`.
/// Formatting with `{:.2}` rounds the binary value instead and prints `0.12`;
/// keys and displayed coordinates must both come from this function.
///
/// ```
/// use skyglow::geo::round_coordinate;
///
/// assert_eq!(round_coordinate(40.004, -74.996), (40.0, -75.0));
/// assert_eq!(round_coordinate(12.346, 0.125), (12.35, 0.13));
/// ```
pub fn round_coordinate(latitude: f64, longitude: f64) -> (f64, f64) {
    (round2(latitude), round2(longitude))
}

/// Integer key for a coordinate pair at [`COORDINATE_PRECISION`] decimals.
///
/// Two coordinates share a key exactly when [`round_coordinate`] maps them to the
/// same pair, and `-0.0` and `0.0` collapse to the same key.
pub fn grid_key(latitude: f64, longitude: f64) -> (i64, i64) {
    (
        (latitude * SCALE).round() as i64,
        (longitude * SCALE).round() as i64,
    )
}

fn round2(value: f64) -> f64 {
    let rounded = (value * SCALE).round() / SCALE;
    // normalise negative zero
    rounded + 0.0
}
