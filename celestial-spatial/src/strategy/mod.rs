//! The three interchangeable spatial strategies.
//!
//! Every strategy answers the same two questions (how far apart are two
//! operands, and is one within a radius of the other) but phrases the answer
//! in different native operations and stores positions differently:
//!
//! | Strategy | Storage | Index | `distance` | `radially_within` |
//! |----------|---------|-------|------------|-------------------|
//! | [`Unindexed`] | `ra`, `dec` | none | clamped law of cosines | `distance <= r` |
//! | [`PixelIndex`] | `ra`, `dec` | `q3c_ang2ipix(ra, dec)` | `q3c_dist × 3600` | `q3c_radial_query` / `q3c_join` |
//! | [`GeodesicIndex`] | `radec` geography | SP-GiST on `radec` | `ST_Distance` scaled | `ST_DWithin` |
//!
//! All three are stateless unit structs; [`StrategyKind::strategy`] hands out
//! the shared instance.

mod geodesic;
mod pixel;
mod unindexed;

use std::fmt;

use crate::carrier::{Layout, Operand, Relation, SkyPoint};
use crate::error::{Result, SpatialError};
use crate::expr::{ColumnType, Expr};
use crate::store::Extension;

pub use geodesic::{GeodesicIndex, EFFECTIVE_EARTH_RADIUS_M};
pub use pixel::PixelIndex;
pub use unindexed::Unindexed;

/// Which strategy a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    #[default]
    Unindexed,
    PixelIndex,
    GeodesicIndex,
}

static UNINDEXED: Unindexed = Unindexed;
static PIXEL_INDEX: PixelIndex = PixelIndex;
static GEODESIC_INDEX: GeodesicIndex = GeodesicIndex;

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [Self::Unindexed, Self::PixelIndex, Self::GeodesicIndex];

    /// Configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unindexed => "none",
            Self::PixelIndex => "hierarchical-pixel-index",
            Self::GeodesicIndex => "geodesic-index",
        }
    }

    pub fn strategy(self) -> &'static dyn SpatialStrategy {
        match self {
            Self::Unindexed => &UNINDEXED,
            Self::PixelIndex => &PIXEL_INDEX,
            Self::GeodesicIndex => &GEODESIC_INDEX,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column a strategy needs on every carrier table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
}

/// Access method of a declared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMethod {
    BTree,
    /// Space-partitioned GiST, suited to point data.
    SpGist,
}

/// An index a strategy declares once per carrier table.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    pub name: String,
    pub table: String,
    pub method: IndexMethod,
    /// Indexed expression over bare column names.
    pub key: Expr,
}

/// The distance / radial-containment contract.
///
/// Implementations only build expressions. They perform no I/O and keep no
/// state, so one instance is shared by every thread.
pub trait SpatialStrategy: fmt::Debug + Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn layout(&self) -> Layout;

    fn required_extension(&self) -> Option<Extension>;

    fn columns(&self) -> Vec<ColumnDef>;

    fn indexes(&self, table: &str) -> Vec<IndexDef>;

    /// A relation over `table` in this strategy's layout.
    fn relation(&self, table: &str) -> Relation {
        Relation::new(table, self.layout())
    }

    /// Degree-valued (ra, dec) expressions for an operand.
    fn coordinates(&self, operand: &Operand) -> Result<(Expr, Expr)>;

    /// Angular separation of `a` and `b` in arcseconds.
    fn distance(&self, a: &Operand, b: &Operand) -> Result<Expr>;

    /// Filter: is `subject` within `radius_arcsec` of a fixed point.
    fn radially_within_instance(
        &self,
        subject: &Operand,
        target: &SkyPoint,
        radius_arcsec: f64,
    ) -> Result<Expr>;

    /// Join condition: is `subject` within `radius_arcsec` of rows of `other`.
    fn radially_within_join(
        &self,
        subject: &Operand,
        other: &Relation,
        radius_arcsec: f64,
    ) -> Result<Expr>;

    /// Dispatches on the other operand: an instance gives a filter, a relation
    /// gives a join condition.
    fn radially_within(&self, subject: &Operand, other: &Operand, radius_arcsec: f64) -> Result<Expr> {
        match other {
            Operand::Instance(point) => self.radially_within_instance(subject, point, radius_arcsec),
            Operand::Relation(relation) => self.radially_within_join(subject, relation, radius_arcsec),
        }
    }
}

pub(crate) fn check_radius(radius_arcsec: f64) -> Result<f64> {
    if radius_arcsec.is_finite() && radius_arcsec >= 0.0 {
        Ok(radius_arcsec)
    } else {
        Err(SpatialError::InvalidRadius { radius_arcsec })
    }
}

/// Rejects relations whose table was declared for a different storage layout.
pub(crate) fn check_relation(
    strategy: &dyn SpatialStrategy,
    operation: &'static str,
    relation: &Relation,
) -> Result<()> {
    if relation.layout() == strategy.layout() {
        return Ok(());
    }
    Err(SpatialError::InvalidTarget {
        operation,
        strategy: strategy.kind(),
        reason: format!(
            "relation {} stores positions as {}, expected {}",
            relation.alias_name(),
            relation.layout(),
            strategy.layout()
        ),
    })
}

/// (ra, dec) expressions over two-column storage.
pub(crate) fn column_coordinates(
    strategy: &dyn SpatialStrategy,
    operation: &'static str,
    operand: &Operand,
) -> Result<(Expr, Expr)> {
    match operand {
        Operand::Instance(p) => Ok((Expr::lit(p.ra()), Expr::lit(p.dec()))),
        Operand::Relation(r) => {
            check_relation(strategy, operation, r)?;
            Ok((
                r.column(crate::carrier::RA_COLUMN, ColumnType::Float64),
                r.column(crate::carrier::DEC_COLUMN, ColumnType::Float64),
            ))
        }
    }
}

pub(crate) fn ra_dec_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            name: crate::carrier::RA_COLUMN,
            ty: ColumnType::Float64,
        },
        ColumnDef {
            name: crate::carrier::DEC_COLUMN,
            ty: ColumnType::Float64,
        },
    ]
}
