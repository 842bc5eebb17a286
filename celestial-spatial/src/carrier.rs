//! Coordinate carriers: records that have a position on the sky.
//!
//! A carrier stores its position in the layout of the active strategy
//! ([`StoredPosition`]) and exposes it through [`SpatialCarrier`]. Any record
//! type can become a carrier by holding a `StoredPosition`; [`SkyRecord`]
//! wraps an arbitrary record for the common case.
//!
//! Predicates take [`Operand`]s: either a bound instance (validated into a
//! [`SkyPoint`]) or a [`Relation`], an aliased table of carriers used on the
//! other side of a join.
//!
//! ```
//! use celestial_spatial::carrier::{Layout, SkyRecord, SpatialCarrier};
//!
//! let mut star = SkyRecord::new("HD 48915", Layout::Packed);
//! star.set_ra(101.287);
//! assert_eq!(star.ra(), None);
//! star.set_dec(-16.716);
//! assert!(star.sky_position().is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use celestial_core::validate::{validate_declination, validate_right_ascension};
use celestial_core::SkyPosition;

use crate::error::{Result, SpatialError};
use crate::expr::{ColumnType, Expr, Value};
use crate::geography::PackedPoint;
use crate::selector;
use crate::strategy::SpatialStrategy;

pub const RA_COLUMN: &str = "ra";
pub const DEC_COLUMN: &str = "dec";
pub const RADEC_COLUMN: &str = "radec";

/// A complete, validated sky coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPoint {
    ra: f64,
    dec: f64,
}

impl SkyPoint {
    /// Validates both coordinates. Right ascension is wrapped into [0°, 360°);
    /// declination outside [-90°, 90°] or any non-finite value is rejected.
    pub fn new(ra: f64, dec: f64) -> Result<Self> {
        Ok(Self {
            ra: validate_right_ascension(ra)?,
            dec: validate_declination(dec)?,
        })
    }

    pub fn ra(&self) -> f64 {
        self.ra
    }

    pub fn dec(&self) -> f64 {
        self.dec
    }

    pub fn sky_position(&self) -> SkyPosition {
        SkyPosition::from_degrees(self.ra, self.dec)
    }
}

/// How a table stores positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Independent `ra` and `dec` double-precision columns.
    Columns,
    /// One `radec` geography column.
    Packed,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Columns => f.write_str("ra/dec columns"),
            Self::Packed => f.write_str("packed geography"),
        }
    }
}

/// Two-column position storage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RaDecColumns {
    pub ra: Option<f64>,
    pub dec: Option<f64>,
}

/// In-memory position of one carrier, in its table's layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoredPosition {
    Columns(RaDecColumns),
    Packed(PackedPoint),
}

impl StoredPosition {
    pub fn empty(layout: Layout) -> Self {
        match layout {
            Layout::Columns => Self::Columns(RaDecColumns::default()),
            Layout::Packed => Self::Packed(PackedPoint::Empty),
        }
    }

    pub fn layout(&self) -> Layout {
        match self {
            Self::Columns(_) => Layout::Columns,
            Self::Packed(_) => Layout::Packed,
        }
    }

    pub fn ra(&self) -> Option<f64> {
        match self {
            Self::Columns(c) => c.ra,
            Self::Packed(p) => p.ra(),
        }
    }

    pub fn dec(&self) -> Option<f64> {
        match self {
            Self::Columns(c) => c.dec,
            Self::Packed(p) => p.dec(),
        }
    }

    pub fn set_ra(&mut self, ra: f64) {
        match self {
            Self::Columns(c) => c.ra = Some(ra),
            Self::Packed(p) => p.set_ra(ra),
        }
    }

    pub fn set_dec(&mut self, dec: f64) {
        match self {
            Self::Columns(c) => c.dec = Some(dec),
            Self::Packed(p) => p.set_dec(dec),
        }
    }

    /// Both coordinates, or `None` while either is unset.
    pub fn radec(&self) -> Option<(f64, f64)> {
        Some((self.ra()?, self.dec()?))
    }

    /// Column values as they would be written to the store. A position with
    /// only one coordinate set writes NULL for both.
    pub fn persisted_values(&self) -> Vec<(&'static str, Value)> {
        match self {
            Self::Columns(_) => {
                let (ra, dec) = match self.radec() {
                    Some((ra, dec)) => (Value::Float(ra), Value::Float(dec)),
                    None => (Value::Null, Value::Null),
                };
                vec![(RA_COLUMN, ra), (DEC_COLUMN, dec)]
            }
            Self::Packed(p) => {
                let value = p.lon_lat().map_or(Value::Null, Value::Geography);
                vec![(RADEC_COLUMN, value)]
            }
        }
    }
}

/// A record with a position on the sky.
///
/// Implementors only provide access to their [`StoredPosition`]; the
/// accessors and predicate builders come for free.
pub trait SpatialCarrier {
    fn position(&self) -> &StoredPosition;

    fn position_mut(&mut self) -> &mut StoredPosition;

    fn ra(&self) -> Option<f64> {
        self.position().ra()
    }

    fn dec(&self) -> Option<f64> {
        self.position().dec()
    }

    fn set_ra(&mut self, ra: f64) {
        self.position_mut().set_ra(ra);
    }

    fn set_dec(&mut self, dec: f64) {
        self.position_mut().set_dec(dec);
    }

    /// Unit-sphere direction. Derived, never stored.
    fn sky_position(&self) -> Option<SkyPosition> {
        self.position()
            .radec()
            .map(|(ra, dec)| SkyPosition::from_degrees(ra, dec))
    }

    /// This carrier as a bound predicate operand.
    fn operand(&self) -> Result<Operand> {
        let (ra, dec) = self
            .position()
            .radec()
            .ok_or(SpatialError::UnresolvedPosition)?;
        Ok(Operand::Instance(SkyPoint::new(ra, dec)?))
    }

    /// Angular separation to `other` in arcseconds, under the process-wide strategy.
    fn distance(&self, other: &Operand) -> Result<Expr> {
        SpatialStrategy::distance(selector::active(), &self.operand()?, other)
    }

    /// Whether `other` lies within `radius_arcsec`, under the process-wide strategy.
    fn radially_within(&self, other: &Operand, radius_arcsec: f64) -> Result<Expr> {
        SpatialStrategy::radially_within(selector::active(), &self.operand()?, other, radius_arcsec)
    }
}

/// Wraps any record with a stored position.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyRecord<R> {
    pub record: R,
    position: StoredPosition,
}

impl<R> SkyRecord<R> {
    pub fn new(record: R, layout: Layout) -> Self {
        Self {
            record,
            position: StoredPosition::empty(layout),
        }
    }

    pub fn at(record: R, layout: Layout, ra: f64, dec: f64) -> Self {
        let mut out = Self::new(record, layout);
        out.set_ra(ra);
        out.set_dec(dec);
        out
    }

    pub fn into_inner(self) -> R {
        self.record
    }
}

impl<R> SpatialCarrier for SkyRecord<R> {
    fn position(&self) -> &StoredPosition {
        &self.position
    }

    fn position_mut(&mut self) -> &mut StoredPosition {
        &mut self.position
    }
}

/// A table of carriers referenced inside a query, under an alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relation {
    table: Arc<str>,
    alias: Arc<str>,
    layout: Layout,
}

impl Relation {
    pub fn new(table: impl Into<Arc<str>>, layout: Layout) -> Self {
        let table = table.into();
        Self {
            alias: table.clone(),
            table,
            layout,
        }
    }

    /// Same table under another alias, as needed for self-joins.
    pub fn alias(&self, alias: impl Into<Arc<str>>) -> Self {
        Self {
            table: self.table.clone(),
            alias: alias.into(),
            layout: self.layout,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias_name(&self) -> &str {
        &self.alias
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn column(&self, name: &str, ty: ColumnType) -> Expr {
        Expr::column(self.alias.clone(), name, ty)
    }
}

/// One side of a spatial predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Instance(SkyPoint),
    Relation(Relation),
}

impl Operand {
    pub fn point(ra: f64, dec: f64) -> Result<Self> {
        Ok(Self::Instance(SkyPoint::new(ra, dec)?))
    }
}

impl From<Relation> for Operand {
    fn from(r: Relation) -> Self {
        Self::Relation(r)
    }
}

impl From<&Relation> for Operand {
    fn from(r: &Relation) -> Self {
        Self::Relation(r.clone())
    }
}

impl From<SkyPoint> for Operand {
    fn from(p: SkyPoint) -> Self {
        Self::Instance(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celestial_core::MathErrorKind;

    #[test]
    fn test_sky_point_validation() {
        let p = SkyPoint::new(370.0, 10.0).unwrap();
        assert_eq!(p.ra(), 10.0);

        let err = SkyPoint::new(10.0, 95.0).unwrap_err();
        match err {
            SpatialError::Core(e) => assert_eq!(e.kind(), Some(&MathErrorKind::OutOfRange)),
            other => panic!("unexpected {:?}", other),
        }
        assert!(SkyPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_columns_partial_state_not_persisted() {
        let mut pos = StoredPosition::empty(Layout::Columns);
        pos.set_ra(12.0);
        assert_eq!(pos.ra(), Some(12.0));
        assert_eq!(
            pos.persisted_values(),
            vec![(RA_COLUMN, Value::Null), (DEC_COLUMN, Value::Null)]
        );
        pos.set_dec(-4.0);
        assert_eq!(
            pos.persisted_values(),
            vec![(RA_COLUMN, Value::Float(12.0)), (DEC_COLUMN, Value::Float(-4.0))]
        );
    }

    #[test]
    fn test_packed_partial_state_not_persisted() {
        let mut pos = StoredPosition::empty(Layout::Packed);
        pos.set_dec(-4.0);
        assert_eq!(pos.persisted_values(), vec![(RADEC_COLUMN, Value::Null)]);
        pos.set_ra(200.0);
        match pos.persisted_values()[0].1 {
            Value::Geography(p) => {
                assert_eq!(p.lon, 20.0);
                assert_eq!(p.lat, -4.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_operand_requires_complete_position() {
        let mut rec = SkyRecord::new((), Layout::Columns);
        assert!(matches!(rec.operand(), Err(SpatialError::UnresolvedPosition)));
        rec.set_ra(1.0);
        assert!(matches!(rec.operand(), Err(SpatialError::UnresolvedPosition)));
        rec.set_dec(2.0);
        assert_eq!(rec.operand().unwrap(), Operand::point(1.0, 2.0).unwrap());
    }

    #[test]
    fn test_operand_rejects_out_of_domain_instance() {
        let rec = SkyRecord::at((), Layout::Columns, 10.0, 120.0);
        assert!(matches!(rec.operand(), Err(SpatialError::Core(_))));
    }

    #[test]
    fn test_sky_position_derived() {
        let rec = SkyRecord::at("x", Layout::Packed, 90.0, 0.0);
        let pos = rec.sky_position().unwrap();
        assert!((pos.y - 1.0).abs() < 1e-12);
        assert_eq!(rec.into_inner(), "x");
    }

    #[test]
    fn test_relation_alias() {
        let objects = Relation::new("objects", Layout::Columns);
        let o2 = objects.alias("o2");
        assert_eq!(o2.table(), "objects");
        assert_eq!(o2.alias_name(), "o2");
        assert_eq!(objects.alias_name(), "objects");
        assert_eq!(
            o2.column("ra", ColumnType::Float64),
            Expr::column("o2", "ra", ColumnType::Float64)
        );
    }
}
