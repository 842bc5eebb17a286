//! Packed lon/lat storage for the geodesic strategy.
//!
//! Geography indexes want one point value per row, with longitude in
//! [-180°, 180°). Right ascension lives in [0°, 360°), so it is stored shifted
//! by [`RA_OFFSET_DEG`] and shifted back on read.
//!
//! Because ra and dec arrive through separate setters, the stored value has
//! to represent "only one half known". [`PackedPoint`] makes that explicit:
//!
//! ```text
//!            set_ra / set_dec               set_dec / set_ra
//!   Empty ───────────────────► PartiallySet ─────────────────► Complete
//!                                  │  ▲                           │
//!                                  └──┘ same half again           └─► Complete (rewritten)
//! ```
//!
//! Reads return `None` until the point is complete; a half-written point is
//! never reported as a number and never persisted.
//!
//! Points travel as WKT text or as (extended) well-known binary. In WKB an
//! unknown half is NaN, and `POINT EMPTY` is a point with both halves NaN.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SpatialError};

/// Offset between right ascension and stored longitude.
pub const RA_OFFSET_DEG: f64 = 180.0;

/// SRID of the geodetic point values (WGS84 lon/lat).
pub const SRID_WGS84: i64 = 4326;

const WKB_POINT: u32 = 1;
const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;

/// A complete stored point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Storage form of a sky position.
    pub fn from_radec(ra: f64, dec: f64) -> Self {
        Self::new(ra - RA_OFFSET_DEG, dec)
    }

    pub fn ra(&self) -> f64 {
        self.lon + RA_OFFSET_DEG
    }

    pub fn dec(&self) -> f64 {
        self.lat
    }
}

/// The half of a point that has been written so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinate {
    /// Stored longitude (ra − 180).
    Lon(f64),
    Lat(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PackedPoint {
    #[default]
    Empty,
    PartiallySet(Coordinate),
    Complete(LonLat),
}

impl PackedPoint {
    pub fn from_radec(ra: f64, dec: f64) -> Self {
        Self::Complete(LonLat::from_radec(ra, dec))
    }

    fn from_halves(lon: Option<f64>, lat: Option<f64>) -> Self {
        match (lon, lat) {
            (None, None) => Self::Empty,
            (Some(lon), None) => Self::PartiallySet(Coordinate::Lon(lon)),
            (None, Some(lat)) => Self::PartiallySet(Coordinate::Lat(lat)),
            (Some(lon), Some(lat)) => Self::Complete(LonLat::new(lon, lat)),
        }
    }

    /// Stored (lon, lat), each `None` while unwritten.
    fn halves(&self) -> (Option<f64>, Option<f64>) {
        match self {
            Self::Empty => (None, None),
            Self::PartiallySet(Coordinate::Lon(lon)) => (Some(*lon), None),
            Self::PartiallySet(Coordinate::Lat(lat)) => (None, Some(*lat)),
            Self::Complete(p) => (Some(p.lon), Some(p.lat)),
        }
    }

    pub fn set_ra(&mut self, ra: f64) {
        let lon = ra - RA_OFFSET_DEG;
        *self = match *self {
            Self::Empty | Self::PartiallySet(Coordinate::Lon(_)) => {
                Self::PartiallySet(Coordinate::Lon(lon))
            }
            Self::PartiallySet(Coordinate::Lat(lat)) => Self::Complete(LonLat::new(lon, lat)),
            Self::Complete(p) => Self::Complete(LonLat::new(lon, p.lat)),
        };
    }

    pub fn set_dec(&mut self, dec: f64) {
        *self = match *self {
            Self::Empty | Self::PartiallySet(Coordinate::Lat(_)) => {
                Self::PartiallySet(Coordinate::Lat(dec))
            }
            Self::PartiallySet(Coordinate::Lon(lon)) => Self::Complete(LonLat::new(lon, dec)),
            Self::Complete(p) => Self::Complete(LonLat::new(p.lon, dec)),
        };
    }

    pub fn lon_lat(&self) -> Option<LonLat> {
        match self {
            Self::Complete(p) => Some(*p),
            _ => None,
        }
    }

    pub fn ra(&self) -> Option<f64> {
        self.lon_lat().map(|p| p.ra())
    }

    pub fn dec(&self) -> Option<f64> {
        self.lon_lat().map(|p| p.dec())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Well-known-text form. Unknown halves are written as `NULL`.
    pub fn to_wkt(&self) -> String {
        self.to_string()
    }

    /// Little-endian EWKB point tagged with SRID 4326, as `ST_GeogFromWKB`
    /// accepts it. Unknown halves are written as NaN.
    pub fn to_ewkb(&self) -> Vec<u8> {
        let (lon, lat) = self.halves();
        let mut out = Vec::with_capacity(25);
        out.push(1);
        out.extend_from_slice(&(WKB_POINT | EWKB_SRID_FLAG).to_le_bytes());
        out.extend_from_slice(&(SRID_WGS84 as u32).to_le_bytes());
        out.extend_from_slice(&lon.unwrap_or(f64::NAN).to_le_bytes());
        out.extend_from_slice(&lat.unwrap_or(f64::NAN).to_le_bytes());
        out
    }

    /// Parses a 2D point in WKB or EWKB, either byte order. An SRID, when
    /// present, must be 4326. NaN coordinates read back as unset halves.
    pub fn from_wkb(buf: &[u8]) -> Result<Self> {
        let mut reader = WkbReader::new(buf)?;
        let type_code = reader.u32()?;
        if type_code & (EWKB_Z_FLAG | EWKB_M_FLAG) != 0 || type_code & 0xFFFF != WKB_POINT {
            return Err(SpatialError::Wkb(format!(
                "expected a 2D point, found geometry type {:#x}",
                type_code
            )));
        }
        if type_code & EWKB_SRID_FLAG != 0 {
            let srid = reader.u32()?;
            if i64::from(srid) != SRID_WGS84 {
                return Err(SpatialError::Wkb(format!(
                    "SRID {} is not {}",
                    srid, SRID_WGS84
                )));
            }
        }
        let lon = reader.f64()?;
        let lat = reader.f64()?;
        reader.finish()?;
        let known = |v: f64| (!v.is_nan()).then_some(v);
        Ok(Self::from_halves(known(lon), known(lat)))
    }
}

/// Cursor over a WKB buffer in the byte order its first byte names.
struct WkbReader<'a> {
    buf: &'a [u8],
    offset: usize,
    little_endian: bool,
}

impl<'a> WkbReader<'a> {
    fn new(buf: &'a [u8]) -> Result<Self> {
        let little_endian = match buf.first() {
            Some(0) => false,
            Some(1) => true,
            Some(other) => {
                return Err(SpatialError::Wkb(format!("unknown byte order {}", other)));
            }
            None => return Err(SpatialError::Wkb("empty buffer".to_string())),
        };
        Ok(Self {
            buf,
            offset: 1,
            little_endian,
        })
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes: [u8; N] = self
            .buf
            .get(self.offset..self.offset + N)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                SpatialError::Wkb(format!(
                    "buffer too small at offset {}: need {} bytes",
                    self.offset, N
                ))
            })?;
        self.offset += N;
        Ok(bytes)
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take::<4>()?;
        Ok(if self.little_endian {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }

    fn f64(&mut self) -> Result<f64> {
        let b = self.take::<8>()?;
        Ok(if self.little_endian {
            f64::from_le_bytes(b)
        } else {
            f64::from_be_bytes(b)
        })
    }

    fn finish(&self) -> Result<()> {
        match self.buf.len() - self.offset {
            0 => Ok(()),
            extra => Err(SpatialError::Wkb(format!("{} trailing bytes", extra))),
        }
    }
}

fn wkt_number(v: Option<f64>) -> String {
    v.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}

impl fmt::Display for PackedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lon, lat) = self.halves();
        write!(f, "POINT({} {})", wkt_number(lon), wkt_number(lat))
    }
}

impl FromStr for PackedPoint {
    type Err = SpatialError;

    /// Parses `POINT(lon lat)`, optionally prefixed by `SRID=4326;`, where
    /// either number may be `NULL`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SpatialError::Wkt(s.to_string());

        let text = s.trim();
        let text = match text.split_once(';') {
            Some((srid, rest)) if srid.trim().to_ascii_uppercase().starts_with("SRID=") => rest,
            Some(_) => return Err(invalid()),
            None => text,
        };
        let text = text.trim();
        let body = match (text.get(..5), text.get(5..)) {
            (Some(tag), Some(rest)) if tag.eq_ignore_ascii_case("POINT") => rest,
            _ => return Err(invalid()),
        };
        let body = body
            .trim()
            .strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let mut parts = body.split_whitespace();
        let (lon, lat) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lon), Some(lat), None) => (lon, lat),
            _ => return Err(invalid()),
        };
        let parse = |token: &str| -> Result<Option<f64>> {
            if token.eq_ignore_ascii_case("NULL") {
                return Ok(None);
            }
            token.parse::<f64>().map(Some).map_err(|_| invalid())
        };

        Ok(Self::from_halves(parse(lon)?, parse(lat)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ra_only_reads_unset() {
        let mut p = PackedPoint::default();
        p.set_ra(10.0);
        assert_eq!(p.ra(), None);
        assert_eq!(p.dec(), None);
        assert!(!p.is_resolved());
    }

    #[test]
    fn test_dec_only_reads_unset() {
        let mut p = PackedPoint::default();
        p.set_dec(-33.0);
        assert_eq!(p.ra(), None);
        assert_eq!(p.dec(), None);
    }

    #[test]
    fn test_two_step_set_either_order() {
        let mut a = PackedPoint::default();
        a.set_ra(250.5);
        a.set_dec(-12.25);

        let mut b = PackedPoint::default();
        b.set_dec(-12.25);
        b.set_ra(250.5);

        assert_eq!(a, b);
        assert_eq!(a.ra(), Some(250.5));
        assert_eq!(a.dec(), Some(-12.25));
        assert_eq!(a.lon_lat(), Some(LonLat::new(70.5, -12.25)));
    }

    #[test]
    fn test_rewrite_keeps_other_half() {
        let mut p = PackedPoint::from_radec(10.0, 20.0);
        p.set_ra(30.0);
        assert_eq!(p.ra(), Some(30.0));
        assert_eq!(p.dec(), Some(20.0));
        p.set_dec(-5.0);
        assert_eq!(p.ra(), Some(30.0));
        assert_eq!(p.dec(), Some(-5.0));
    }

    #[test]
    fn test_repeated_half_overwrites() {
        let mut p = PackedPoint::default();
        p.set_ra(1.0);
        p.set_ra(2.0);
        assert_eq!(p, PackedPoint::PartiallySet(Coordinate::Lon(2.0 - RA_OFFSET_DEG)));
        p.set_dec(3.0);
        assert_eq!(p.ra(), Some(2.0));
    }

    #[test]
    fn test_storage_longitude_in_geodetic_range() {
        for ra in [0.0, 90.0, 179.999, 180.0, 359.999] {
            let lon = LonLat::from_radec(ra, 0.0).lon;
            assert!((-180.0..180.0).contains(&lon), "ra {} -> lon {}", ra, lon);
        }
    }

    #[test]
    fn test_wkt_rendering() {
        assert_eq!(PackedPoint::Empty.to_wkt(), "POINT(NULL NULL)");
        assert_eq!(PackedPoint::from_radec(190.0, 45.5).to_wkt(), "POINT(10 45.5)");
        let mut p = PackedPoint::default();
        p.set_ra(0.0);
        assert_eq!(p.to_wkt(), "POINT(-180 NULL)");
    }

    #[test]
    fn test_wkt_parsing() {
        let p: PackedPoint = "POINT(-170 12.5)".parse().unwrap();
        assert_eq!(p.ra(), Some(10.0));
        assert_eq!(p.dec(), Some(12.5));

        let p: PackedPoint = "SRID=4326;point( 1.5  NULL )".parse().unwrap();
        assert_eq!(p, PackedPoint::PartiallySet(Coordinate::Lon(1.5)));

        assert_eq!("POINT(NULL NULL)".parse::<PackedPoint>().unwrap(), PackedPoint::Empty);

        for bad in ["", "POINT", "POINT(1)", "POINT(1 2 3)", "LINESTRING(1 2)", "POINT(a b)", "x;POINT(1 2)"] {
            assert!(bad.parse::<PackedPoint>().is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_wkt_preserves_value() {
        let p = PackedPoint::from_radec(123.456789012345, -0.000123456789);
        let back: PackedPoint = p.to_wkt().parse().unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_ewkb_layout() {
        let bytes = PackedPoint::from_radec(190.0, 45.5).to_ewkb();
        assert_eq!(bytes.len(), 25);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1..5], [0x01u8, 0x00, 0x00, 0x20]);
        assert_eq!(bytes[5..9], 4326u32.to_le_bytes());
        assert_eq!(bytes[9..17], 10.0f64.to_le_bytes());
        assert_eq!(bytes[17..25], 45.5f64.to_le_bytes());
    }

    #[test]
    fn test_wkb_keeps_every_state() {
        let mut ra_only = PackedPoint::default();
        ra_only.set_ra(250.5);
        let mut dec_only = PackedPoint::default();
        dec_only.set_dec(-89.75);
        for p in [
            PackedPoint::Empty,
            ra_only,
            dec_only,
            PackedPoint::from_radec(123.456789012345, -0.000123456789),
            PackedPoint::from_radec(0.0, 90.0),
        ] {
            assert_eq!(PackedPoint::from_wkb(&p.to_ewkb()).unwrap(), p);
        }
    }

    #[test]
    fn test_wkb_big_endian_without_srid() {
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&(-170.0f64).to_be_bytes());
        bytes.extend_from_slice(&12.5f64.to_be_bytes());
        let p = PackedPoint::from_wkb(&bytes).unwrap();
        assert_eq!(p.ra(), Some(10.0));
        assert_eq!(p.dec(), Some(12.5));
    }

    #[test]
    fn test_wkb_rejects_other_geometry() {
        let point = PackedPoint::from_radec(10.0, 20.0).to_ewkb();

        let mut wrong_srid = point.clone();
        wrong_srid[5..9].copy_from_slice(&3857u32.to_le_bytes());
        let mut linestring = point.clone();
        linestring[1] = 2;
        let mut with_z = point.clone();
        with_z[1..5].copy_from_slice(&(1u32 | 0x8000_0000 | 0x2000_0000).to_le_bytes());
        let mut iso_z = point.clone();
        iso_z[1..5].copy_from_slice(&(1001u32 | 0x2000_0000).to_le_bytes());
        let mut bad_order = point.clone();
        bad_order[0] = 7;
        let mut trailing = point.clone();
        trailing.push(0);

        for bad in [
            wrong_srid,
            linestring,
            with_z,
            iso_z,
            bad_order,
            trailing,
            point[..20].to_vec(),
            Vec::new(),
        ] {
            assert!(
                matches!(PackedPoint::from_wkb(&bad), Err(SpatialError::Wkb(_))),
                "{:?}",
                bad
            );
        }
    }
}
