use crate::math::fmod;
use crate::{AstroError, MathErrorKind};

/// Validates right ascension in degrees and wraps it into [0°, 360°).
pub fn validate_right_ascension(ra_deg: f64) -> Result<f64, AstroError> {
    if ra_deg.is_finite() {
        let wrapped = fmod(ra_deg, 360.0);
        let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
        // -1e-20 + 360.0 rounds to 360.0
        return Ok(if wrapped >= 360.0 { 0.0 } else { wrapped });
    }

    Err(AstroError::math_error(
        "validate_right_ascension",
        MathErrorKind::NotFinite,
        "RA Not Finite",
    ))
}

/// Validates declination in degrees against [-90°, +90°].
pub fn validate_declination(dec_deg: f64) -> Result<f64, AstroError> {
    if !dec_deg.is_finite() {
        return Err(AstroError::math_error(
            "validate_declination",
            MathErrorKind::NotFinite,
            "Dec not Finite",
        ));
    }

    if (-90.0..=90.0).contains(&dec_deg) {
        return Ok(dec_deg);
    }

    Err(AstroError::math_error(
        "validate_declination",
        MathErrorKind::OutOfRange,
        &format!("Dec {:.2}° out of range [-90°, +90°]", dec_deg),
    ))
}
