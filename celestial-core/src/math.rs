//! Great-circle separation on the unit sphere.
//!
//! Two formulas live here:
//!
//! | Function | Formula | Used for |
//! |----------|---------|----------|
//! | [`angular_distance`] | spherical law of cosines, clamped | the unindexed predicate, in numeric form |
//! | [`vincenty_angular_separation`] | Vincenty (atan2 form) | index engines and independent checks |
//!
//! The law-of-cosines form is what gets emitted as a query expression, so its
//! numeric twin must produce the same values the query engine would.

use crate::constants::{ARCSEC_TO_RAD, DEG_TO_RAD};

#[inline]
pub fn fmod(x: f64, y: f64) -> f64 {
    libm::fmod(x, y)
}

#[inline]
pub fn vincenty_angular_separation(
    sin_lat1: f64,
    cos_lat1: f64,
    sin_lat2: f64,
    cos_lat2: f64,
    delta_lon: f64,
) -> f64 {
    let (sin_delta_lon, cos_delta_lon) = libm::sincos(delta_lon);

    let num = libm::sqrt(
        (cos_lat2 * sin_delta_lon).powi(2)
            + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_delta_lon).powi(2),
    );
    let den = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_delta_lon;

    libm::atan2(num, den)
}

/// Vincenty separation between two (lon, lat) points given in degrees, in radians.
///
/// The endpoints are put in a fixed order first, so swapping them gives a
/// bit-identical result.
pub fn separation_rad(lon1_deg: f64, lat1_deg: f64, lon2_deg: f64, lat2_deg: f64) -> f64 {
    let ((lon1, lat1), (lon2, lat2)) = if (lon1_deg, lat1_deg) <= (lon2_deg, lat2_deg) {
        ((lon1_deg, lat1_deg), (lon2_deg, lat2_deg))
    } else {
        ((lon2_deg, lat2_deg), (lon1_deg, lat1_deg))
    };
    let (sin1, cos1) = libm::sincos(lat1 * DEG_TO_RAD);
    let (sin2, cos2) = libm::sincos(lat2 * DEG_TO_RAD);
    vincenty_angular_separation(sin1, cos1, sin2, cos2, (lon2 - lon1) * DEG_TO_RAD)
}

/// Clamp a great-circle cosine into the domain of `acos`.
///
/// Roundoff pushes the law-of-cosines sum slightly past ±1 near zero and
/// near antipodal separations; `acos` of that is NaN.
#[inline]
pub fn clamp_unit(cosine: f64) -> f64 {
    cosine.max(-1.0).min(1.0)
}

/// Cosine of the separation between two sky positions, degrees in.
///
/// With colatitudes θ = 90° − dec this is
/// `cos θ1·cos θ2 + sin θ1·sin θ2·cos Δra`, evaluated as
/// `cos(θ1 − θ2) − sin θ1·sin θ2·(1 − cos Δra)` so coincident points give exactly 1.
pub fn great_circle_cosine(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let theta1 = (90.0 - dec1) * DEG_TO_RAD;
    let theta2 = (90.0 - dec2) * DEG_TO_RAD;
    let cos_delta_ra = libm::cos((ra1 - ra2) * DEG_TO_RAD);
    libm::cos(theta1 - theta2) - libm::sin(theta1) * libm::sin(theta2) * (1.0 - cos_delta_ra)
}

/// Angular distance between two sky positions, degrees in, arcseconds out.
///
/// # Example
///
/// ```
/// use celestial_core::math::angular_distance;
///
/// let d = angular_distance(10.0, 0.0, 10.0, 0.01);
/// assert!((d - 36.0).abs() < 1e-6);
/// ```
pub fn angular_distance(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let cosine = clamp_unit(great_circle_cosine(ra1, dec1, ra2, dec2));
    libm::acos(cosine) / ARCSEC_TO_RAD
}
