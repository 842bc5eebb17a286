use crate::carrier::{Layout, Operand, Relation, SkyPoint};
use crate::error::Result;
use crate::great_circle::angular_distance_expr;
use crate::store::Extension;

use super::{
    check_radius, column_coordinates, ra_dec_columns, ColumnDef, IndexDef, SpatialStrategy,
    StrategyKind,
};
use crate::expr::Expr;

/// Two plain columns, no index, great-circle distance spelled out in
/// trigonometry the store evaluates per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unindexed;

impl SpatialStrategy for Unindexed {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Unindexed
    }

    fn layout(&self) -> Layout {
        Layout::Columns
    }

    fn required_extension(&self) -> Option<Extension> {
        None
    }

    fn columns(&self) -> Vec<ColumnDef> {
        ra_dec_columns()
    }

    fn indexes(&self, _table: &str) -> Vec<IndexDef> {
        Vec::new()
    }

    fn coordinates(&self, operand: &Operand) -> Result<(Expr, Expr)> {
        column_coordinates(self, "coordinates", operand)
    }

    fn distance(&self, a: &Operand, b: &Operand) -> Result<Expr> {
        let (ra1, dec1) = column_coordinates(self, "distance", a)?;
        let (ra2, dec2) = column_coordinates(self, "distance", b)?;
        Ok(angular_distance_expr(ra1, dec1, ra2, dec2))
    }

    fn radially_within_instance(
        &self,
        subject: &Operand,
        target: &SkyPoint,
        radius_arcsec: f64,
    ) -> Result<Expr> {
        let radius = check_radius(radius_arcsec)?;
        Ok(self.distance(subject, &Operand::Instance(*target))?.lt_eq(radius))
    }

    fn radially_within_join(
        &self,
        subject: &Operand,
        other: &Relation,
        radius_arcsec: f64,
    ) -> Result<Expr> {
        let radius = check_radius(radius_arcsec)?;
        let (ra1, dec1) = column_coordinates(self, "radially_within", subject)?;
        let (ra2, dec2) = column_coordinates(self, "radially_within", &Operand::from(other))?;
        Ok(angular_distance_expr(ra1, dec1, ra2, dec2).lt_eq(radius))
    }
}
