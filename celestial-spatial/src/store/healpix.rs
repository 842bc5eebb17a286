//! Nested HEALPix pixel ids at one fixed resolution.
//!
//! `q3c_ang2ipix` in the reference store returns these ids. Nearby points
//! share id prefixes, so [`coarsen`] gives the enclosing pixel that the
//! index buckets rows by.

use celestial_core::constants::DEG_TO_RAD;

/// Order of the pixel ids returned by `q3c_ang2ipix` in the reference store.
pub const PIXEL_ORDER: u32 = 12;

const NSIDE: i64 = 1 << PIXEL_ORDER;

/// Nested pixel id of a position in degrees. RA is taken modulo 360°.
pub fn ang2pix(ra_deg: f64, dec_deg: f64) -> u64 {
    let z = libm::sin(dec_deg * DEG_TO_RAD);
    // Longitude in quarter turns, [0, 4).
    let tt = ra_deg.rem_euclid(360.0) / 90.0;
    let tt = if tt >= 4.0 { 0.0 } else { tt };

    let (face, ix, iy) = if libm::fabs(z) <= 2.0 / 3.0 {
        equatorial(tt, z)
    } else {
        polar(tt, z)
    };
    (face * NSIDE * NSIDE) as u64 + interleave(ix as u64, iy as u64)
}

/// The pixel containing `pixel` at the coarser `order`.
pub(crate) fn coarsen(pixel: u64, order: u32) -> u64 {
    pixel >> (2 * PIXEL_ORDER.saturating_sub(order))
}

fn equatorial(tt: f64, z: f64) -> (i64, i64, i64) {
    let n = NSIDE as f64;
    let along = n * (0.5 + tt);
    let across = n * z * 0.75;
    let ascending = (along - across) as i64;
    let descending = (along + across) as i64;
    let (fa, fd) = (ascending / NSIDE, descending / NSIDE);
    let face = match fa.cmp(&fd) {
        std::cmp::Ordering::Equal => fa | 4,
        std::cmp::Ordering::Less => fa,
        std::cmp::Ordering::Greater => fd + 8,
    };
    (
        face,
        descending.rem_euclid(NSIDE),
        NSIDE - 1 - ascending.rem_euclid(NSIDE),
    )
}

fn polar(tt: f64, z: f64) -> (i64, i64, i64) {
    let quadrant = libm::floor(tt) as i64;
    let frac = tt - quadrant as f64;
    let ring = NSIDE as f64 * libm::sqrt(3.0 * (1.0 - libm::fabs(z)));
    let last = NSIDE - 1;
    let jp = ((frac * ring) as i64).min(last);
    let jm = (((1.0 - frac) * ring) as i64).min(last);
    if z > 0.0 {
        (quadrant, last - jm, last - jp)
    } else {
        (quadrant + 8, jp, jm)
    }
}

/// Spreads the low 32 bits of `v` onto the even bit positions.
fn spread(v: u64) -> u64 {
    let mut v = v & 0xFFFF_FFFF;
    v = (v | (v << 16)) & 0x0000_FFFF_0000_FFFF;
    v = (v | (v << 8)) & 0x00FF_00FF_00FF_00FF;
    v = (v | (v << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    v = (v | (v << 2)) & 0x3333_3333_3333_3333;
    (v | (v << 1)) & 0x5555_5555_5555_5555
}

/// Z-order cell of an (x, y) grid position: x bits even, y bits odd.
pub(crate) fn interleave(x: u64, y: u64) -> u64 {
    spread(x) | (spread(y) << 1)
}
