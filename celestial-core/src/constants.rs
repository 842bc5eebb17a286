#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// Reciprocal of [`ARCSEC_PER_DEGREE`], used to hand radii to degree-native index functions.
pub const DEGREES_PER_ARCSEC: f64 = 1.0 / ARCSEC_PER_DEGREE;

/// One radian in arcseconds: `3600 / (π/180)`.
#[allow(clippy::excessive_precision)]
pub const ARCSEC_PER_RAD: f64 = 206264.8062470963551564734;

/// One arcsecond in radians. Equal to `DEG_TO_RAD / 3600` in f64.
#[allow(clippy::excessive_precision)]
pub const ARCSEC_TO_RAD: f64 = 4.848136811095359935899141e-6;

/// Half a turn in arcseconds, the largest possible separation on the sphere.
pub const ANTIPODAL_ARCSEC: f64 = 180.0 * ARCSEC_PER_DEGREE;
