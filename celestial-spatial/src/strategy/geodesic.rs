//! Geodesic index (PostGIS geography).
//!
//! The sky is mapped onto a sphere of radius [`EFFECTIVE_EARTH_RADIUS_M`];
//! angular radii become metric distances along that sphere and the store's
//! spheroid-free geography functions do the rest.

use celestial_core::constants::ARCSEC_TO_RAD;

use crate::carrier::{Layout, Operand, Relation, SkyPoint, RADEC_COLUMN};
use crate::error::Result;
use crate::expr::{ColumnType, Expr, Function};
use crate::geography::{LonLat, RA_OFFSET_DEG, SRID_WGS84};
use crate::store::Extension;

use super::{check_radius, check_relation, ColumnDef, IndexDef, IndexMethod, SpatialStrategy, StrategyKind};

/// Radius in meters of the sphere used by geography distance functions when
/// `use_spheroid` is false: the mean Earth radius with a small correction
/// factor so that meters convert back to the angle the store actually measured.
#[allow(clippy::excessive_precision)]
pub const EFFECTIVE_EARTH_RADIUS_M: f64 = 6_370_986.0 * 1.000_003_57;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicIndex;

impl GeodesicIndex {
    /// `<table>_postgis_radec_index`
    pub fn index_name(table: &str) -> String {
        format!("{}_postgis_radec_index", table)
    }

    /// Meters along the sphere for an angle in arcseconds.
    pub fn arcsec_to_meters(arcsec: f64) -> f64 {
        EFFECTIVE_EARTH_RADIUS_M * arcsec * ARCSEC_TO_RAD
    }

    /// `geography(ST_SetSRID(ST_MakePoint(lon, lat), 4326))`
    pub fn point_literal(point: &SkyPoint) -> Expr {
        let p = LonLat::from_radec(point.ra(), point.dec());
        let made = Expr::call(Function::StMakePoint, vec![Expr::lit(p.lon), Expr::lit(p.lat)]);
        let with_srid = Expr::call(Function::StSetSrid, vec![made, Expr::int(SRID_WGS84)]);
        Expr::call(Function::Geography, vec![with_srid])
    }

    fn geography(&self, operation: &'static str, operand: &Operand) -> Result<Expr> {
        match operand {
            Operand::Instance(p) => Ok(Self::point_literal(p)),
            Operand::Relation(r) => {
                check_relation(self, operation, r)?;
                Ok(r.column(RADEC_COLUMN, ColumnType::Geography))
            }
        }
    }
}

impl SpatialStrategy for GeodesicIndex {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GeodesicIndex
    }

    fn layout(&self) -> Layout {
        Layout::Packed
    }

    fn required_extension(&self) -> Option<Extension> {
        Some(Extension::PostGis)
    }

    fn columns(&self) -> Vec<ColumnDef> {
        vec![ColumnDef {
            name: RADEC_COLUMN,
            ty: ColumnType::Geography,
        }]
    }

    fn indexes(&self, table: &str) -> Vec<IndexDef> {
        vec![IndexDef {
            name: Self::index_name(table),
            table: table.to_string(),
            method: IndexMethod::SpGist,
            key: Expr::bare_column(RADEC_COLUMN, ColumnType::Geography),
        }]
    }

    /// `ST_X(radec) + 180` and `ST_Y(radec)` for relations.
    fn coordinates(&self, operand: &Operand) -> Result<(Expr, Expr)> {
        match operand {
            Operand::Instance(p) => Ok((Expr::lit(p.ra()), Expr::lit(p.dec()))),
            Operand::Relation(_) => {
                let radec = self.geography("coordinates", operand)?;
                Ok((
                    Expr::call(Function::StX, vec![radec.clone()]) + RA_OFFSET_DEG,
                    Expr::call(Function::StY, vec![radec]),
                ))
            }
        }
    }

    fn distance(&self, a: &Operand, b: &Operand) -> Result<Expr> {
        let a = self.geography("distance", a)?;
        let b = self.geography("distance", b)?;
        let meters = Expr::call(Function::StDistance, vec![a, b, Expr::boolean(false)]);
        Ok(meters / EFFECTIVE_EARTH_RADIUS_M / ARCSEC_TO_RAD)
    }

    fn radially_within_instance(
        &self,
        subject: &Operand,
        target: &SkyPoint,
        radius_arcsec: f64,
    ) -> Result<Expr> {
        let radius = check_radius(radius_arcsec)?;
        let subject = self.geography("radially_within", subject)?;
        Ok(Expr::call(
            Function::StDWithin,
            vec![
                subject,
                Self::point_literal(target),
                Expr::lit(Self::arcsec_to_meters(radius)),
                Expr::boolean(false),
            ],
        ))
    }

    fn radially_within_join(
        &self,
        subject: &Operand,
        other: &Relation,
        radius_arcsec: f64,
    ) -> Result<Expr> {
        let radius = check_radius(radius_arcsec)?;
        let subject = self.geography("radially_within", subject)?;
        let other = self.geography("radially_within", &Operand::from(other))?;
        Ok(Expr::call(
            Function::StDWithin,
            vec![
                subject,
                other,
                Expr::lit(Self::arcsec_to_meters(radius)),
                Expr::boolean(false),
            ],
        ))
    }
}
