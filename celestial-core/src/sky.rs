//! Unit-sphere directions for sky positions.
//!
//! A [`SkyPosition`] is the Cartesian form of an (ra, dec) pair. It is what a
//! coordinate carrier exposes as its derived position, and what spatial index
//! buckets use to bound their members: separations between unit vectors obey
//! the triangle inequality, which makes bucket pruning exact.
//!
//! ```
//! use celestial_core::SkyPosition;
//!
//! let a = SkyPosition::from_degrees(0.0, 0.0);
//! let b = SkyPosition::from_degrees(90.0, 0.0);
//! assert!((a.separation_rad(&b) - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
//! ```

use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};
use crate::math::fmod;

/// A direction on the unit sphere.
///
/// Components follow the equatorial convention: `x` toward (ra 0°, dec 0°),
/// `y` toward (ra 90°, dec 0°), `z` toward the north celestial pole.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkyPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SkyPosition {
    /// Creates a position from raw components without normalizing.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Direction for right ascension and declination in degrees.
    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        let (sin_ra, cos_ra) = libm::sincos(ra_deg * DEG_TO_RAD);
        let (sin_dec, cos_dec) = libm::sincos(dec_deg * DEG_TO_RAD);
        Self::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    /// Back to (ra, dec) in degrees, with ra in [0, 360).
    pub fn to_degrees(&self) -> (f64, f64) {
        let d2 = self.x * self.x + self.y * self.y;
        let ra = if d2 == 0.0 {
            0.0
        } else {
            libm::atan2(self.y, self.x) * RAD_TO_DEG
        };
        let dec = if self.z == 0.0 {
            0.0
        } else {
            libm::atan2(self.z, libm::sqrt(d2)) * RAD_TO_DEG
        };
        let ra = fmod(ra + 360.0, 360.0);
        (ra, dec)
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.dot(self))
    }

    /// Angle between two directions in radians, stable at all separations.
    pub fn separation_rad(&self, other: &Self) -> f64 {
        libm::atan2(self.cross(other).magnitude(), self.dot(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_trip_degrees() {
        for (ra, dec) in [(0.0, 0.0), (45.0, 30.0), (359.5, -89.0), (180.0, 12.25)] {
            let (ra2, dec2) = SkyPosition::from_degrees(ra, dec).to_degrees();
            assert_abs_diff_eq!(ra2, ra, epsilon = 1e-10);
            assert_abs_diff_eq!(dec2, dec, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_unit_length() {
        let p = SkyPosition::from_degrees(123.0, -45.0);
        assert_abs_diff_eq!(p.magnitude(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_separation() {
        let north = SkyPosition::from_degrees(0.0, 90.0);
        let south = SkyPosition::from_degrees(0.0, -90.0);
        let equator = SkyPosition::from_degrees(75.0, 0.0);
        assert_abs_diff_eq!(north.separation_rad(&south), std::f64::consts::PI, epsilon = 1e-15);
        assert_abs_diff_eq!(
            north.separation_rad(&equator),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-15
        );
        assert_eq!(equator.separation_rad(&equator), 0.0);
    }
}
