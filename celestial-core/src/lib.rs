//! Numeric foundation for sky-position queries.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Angle unit conversions (degrees, radians, arcseconds) |
//! | [`errors`] | [`AstroError`], [`MathErrorKind`], [`AstroResult`] |
//! | [`math`] | Clamped law-of-cosines distance, Vincenty separation |
//! | [`sky`] | [`SkyPosition`] unit vectors |
//! | [`validate`] | Right ascension / declination domain checks |

pub mod constants;
pub mod errors;
pub mod math;
pub mod sky;
pub mod validate;

pub use errors::{AstroError, AstroResult, MathErrorKind};
pub use sky::SkyPosition;
