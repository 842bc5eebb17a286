//! Cell-bucketed spatial indexes and the proximity lookup planner.
//!
//! Rows are grouped by cell: the coarse HEALPix parent of their
//! `q3c_ang2ipix` pixel, or a Z-order lon/lat quad cell for geography. Each
//! bucket keeps a bounding cap (a member direction and the largest separation
//! of any member from it). A lookup of radius ρ around direction q visits only
//! buckets with `sep(q, center) <= ρ + cap + slack`; by the triangle
//! inequality no matching row lives anywhere else, and every candidate is
//! re-checked against the full predicate, so indexed results equal a scan.

use std::collections::HashMap;
use std::sync::Arc;

use celestial_core::constants::DEG_TO_RAD;
use celestial_core::SkyPosition;

use crate::error::{Result, SpatialError};
use crate::expr::{BoolOp, ColumnType, Expr, Function, Value};
use crate::strategy::{IndexDef, IndexMethod, EFFECTIVE_EARTH_RADIUS_M};

use super::eval::{evaluate, Scope};
use super::healpix::{ang2pix, coarsen, interleave};
use super::table::{Row, Table};

/// Coarse order used to bucket pixel ids.
const BUCKET_ORDER: u32 = 6;

/// Bits per axis of the lon/lat quad grid.
const QUAD_BITS: u32 = 7;

/// Covers rounding between the separation used for pruning and the one the
/// predicate evaluates.
const PRUNE_SLACK_RAD: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IndexKey {
    /// `q3c_ang2ipix(ra, dec)` over two float columns.
    Pixel { ra: Arc<str>, dec: Arc<str> },
    /// A geography column.
    Geography { column: Arc<str> },
}

impl IndexKey {
    /// Recognizes the index keys the store can accelerate.
    pub(crate) fn from_def(def: &IndexDef, table: &Table) -> Result<Self> {
        let unsupported = || SpatialError::TypeMismatch {
            context: format!("index {} key", def.name),
            expected: "q3c_ang2ipix(ra, dec) or a geography column",
            found: def.key.value_type().name(),
        };
        match (&def.method, &def.key) {
            (IndexMethod::BTree, Expr::Call { func: Function::Q3cAng2Ipix, args }) => {
                let [Expr::Column(ra), Expr::Column(dec)] = args.as_slice() else {
                    return Err(unsupported());
                };
                for c in [ra, dec] {
                    if table.column_type(&c.name)? != ColumnType::Float64 {
                        return Err(unsupported());
                    }
                }
                Ok(Self::Pixel {
                    ra: ra.name.clone(),
                    dec: dec.name.clone(),
                })
            }
            (IndexMethod::SpGist, Expr::Column(c)) => {
                if table.column_type(&c.name)? != ColumnType::Geography {
                    return Err(unsupported());
                }
                Ok(Self::Geography {
                    column: c.name.clone(),
                })
            }
            _ => Err(unsupported()),
        }
    }
}

#[derive(Debug)]
struct Bucket {
    center: SkyPosition,
    radius_rad: f64,
    rows: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct SpatialIndex {
    pub(crate) name: String,
    pub(crate) key: IndexKey,
    columns: (usize, Option<usize>),
    buckets: HashMap<u64, Bucket>,
}

impl SpatialIndex {
    pub(crate) fn build(name: &str, key: IndexKey, table: &Table) -> Result<Self> {
        let columns = match &key {
            IndexKey::Pixel { ra, dec } => (table.column_index(ra)?, Some(table.column_index(dec)?)),
            IndexKey::Geography { column } => (table.column_index(column)?, None),
        };
        let mut index = Self {
            name: name.to_string(),
            key,
            columns,
            buckets: HashMap::new(),
        };
        for (position, row) in table.rows.iter().enumerate() {
            index.add(position, row);
        }
        Ok(index)
    }

    /// Indexed direction of a row, in the frame of the key columns. Rows with a
    /// NULL or non-finite position cannot match a proximity predicate and are
    /// left out. Any other angles, even outside the usual ranges, name a point
    /// on the sphere and are indexed as that point.
    fn direction(&self, row: &Row) -> Option<(u64, SkyPosition)> {
        let (cell, dir) = match (self.columns, &self.key) {
            ((ra, Some(dec)), IndexKey::Pixel { .. }) => {
                let ra = row.values[ra].as_f64()?;
                let dec = row.values[dec].as_f64()?;
                (coarsen(ang2pix(ra, dec), BUCKET_ORDER), SkyPosition::from_degrees(ra, dec))
            }
            ((col, _), IndexKey::Geography { .. }) => {
                let p = row.values[col].as_geography()?;
                (quad_cell(p.lon, p.lat), SkyPosition::from_degrees(p.lon, p.lat))
            }
            _ => return None,
        };
        dir.dot(&dir).is_finite().then_some((cell, dir))
    }

    pub(crate) fn add(&mut self, position: usize, row: &Row) {
        let Some((cell, dir)) = self.direction(row) else {
            return;
        };
        let bucket = self.buckets.entry(cell).or_insert_with(|| Bucket {
            center: dir,
            radius_rad: 0.0,
            rows: Vec::new(),
        });
        bucket.radius_rad = bucket.radius_rad.max(bucket.center.separation_rad(&dir));
        bucket.rows.push(position);
    }

    /// Row positions that may lie within `radius_rad` of `center`, sorted.
    pub(crate) fn candidates(&self, center: SkyPosition, radius_rad: f64) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .buckets
            .values()
            .filter(|b| {
                b.center.separation_rad(&center) <= radius_rad + b.radius_rad + PRUNE_SLACK_RAD
            })
            .flat_map(|b| b.rows.iter().copied())
            .collect();
        out.sort_unstable();
        out
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

fn quad_cell(lon: f64, lat: f64) -> u64 {
    let n = (1u64 << QUAD_BITS) as f64;
    let x = (((lon + 180.0).rem_euclid(360.0) / 360.0) * n) as u64;
    let y = (((lat + 90.0) / 180.0) * n) as u64;
    let max = (1u64 << QUAD_BITS) - 1;
    interleave(x.min(max), y.min(max))
}

/// What the indexed side of a proximity predicate is compared against.
#[derive(Debug, Clone, PartialEq)]
enum LookupCenter {
    /// (ra, dec) in degrees.
    Degrees(Expr, Expr),
    /// A geography point.
    Geography(Expr),
}

#[derive(Debug, Clone, PartialEq)]
enum LookupRadius {
    Degrees(Expr),
    Meters(Expr),
}

/// A proximity conjunct that an index on `alias` can answer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lookup {
    pub(crate) index: usize,
    center: LookupCenter,
    radius: LookupRadius,
}

impl Lookup {
    /// Finds a conjunct of `predicate` whose indexed side is `alias` and whose
    /// other side references none of `alias`'s columns.
    pub(crate) fn plan(predicate: &Expr, alias: &str, table: &Table) -> Option<Self> {
        match predicate {
            Expr::Bool { op: BoolOp::And, args } => {
                args.iter().find_map(|arg| Self::plan(arg, alias, table))
            }
            Expr::Call { func, args } => table
                .indexes
                .iter()
                .enumerate()
                .find_map(|(i, idx)| Self::match_call(*func, args, alias, &idx.key, i)),
            _ => None,
        }
    }

    fn match_call(func: Function, args: &[Expr], alias: &str, key: &IndexKey, index: usize) -> Option<Self> {
        let is_col = |e: &Expr, name: &str| {
            matches!(e, Expr::Column(c) if c.relation.as_deref() == Some(alias) && c.name.as_ref() == name)
        };
        let free = |e: &Expr| e.columns().iter().all(|c| c.relation.as_deref() != Some(alias));

        match (func, key, args) {
            (
                Function::Q3cRadialQuery | Function::Q3cJoin,
                IndexKey::Pixel { ra, dec },
                [ra1, dec1, ra2, dec2, radius],
            ) if free(radius) => {
                let center = if is_col(ra2, &**ra) && is_col(dec2, &**dec) && free(ra1) && free(dec1) {
                    LookupCenter::Degrees(ra1.clone(), dec1.clone())
                } else if is_col(ra1, &**ra) && is_col(dec1, &**dec) && free(ra2) && free(dec2) {
                    LookupCenter::Degrees(ra2.clone(), dec2.clone())
                } else {
                    return None;
                };
                Some(Self {
                    index,
                    center,
                    radius: LookupRadius::Degrees(radius.clone()),
                })
            }
            (Function::StDWithin, IndexKey::Geography { column }, [a, b, meters, _]) if free(meters) => {
                let center = if is_col(a, &**column) && free(b) {
                    LookupCenter::Geography(b.clone())
                } else if is_col(b, &**column) && free(a) {
                    LookupCenter::Geography(a.clone())
                } else {
                    return None;
                };
                Some(Self {
                    index,
                    center,
                    radius: LookupRadius::Meters(meters.clone()),
                })
            }
            _ => None,
        }
    }

    /// Candidate row positions for one binding of the other relations.
    /// `None` when the center or radius is NULL: no row can match.
    pub(crate) fn candidates(&self, table: &Table, scopes: &[Scope<'_>]) -> Result<Option<Vec<usize>>> {
        let center = match &self.center {
            LookupCenter::Degrees(ra, dec) => {
                match (evaluate(ra, scopes)?.as_f64(), evaluate(dec, scopes)?.as_f64()) {
                    (Some(ra), Some(dec)) => SkyPosition::from_degrees(ra, dec),
                    _ => return Ok(None),
                }
            }
            LookupCenter::Geography(g) => match evaluate(g, scopes)? {
                Value::Geography(p) => SkyPosition::from_degrees(p.lon, p.lat),
                _ => return Ok(None),
            },
        };
        let radius_rad = match &self.radius {
            LookupRadius::Degrees(r) => evaluate(r, scopes)?.as_f64().map(|r| r * DEG_TO_RAD),
            LookupRadius::Meters(m) => evaluate(m, scopes)?.as_f64().map(|m| m / EFFECTIVE_EARTH_RADIUS_M),
        };
        let Some(radius_rad) = radius_rad.filter(|r| !r.is_nan()) else {
            return Ok(None);
        };
        Ok(Some(table.indexes[self.index].candidates(center, radius_rad)))
    }
}
