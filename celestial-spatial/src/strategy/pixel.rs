//! Hierarchical pixel index (Q3C).
//!
//! Positions stay in two columns; the store indexes `q3c_ang2ipix(ra, dec)`
//! and answers radial predicates with `q3c_radial_query` / `q3c_join`, which
//! take the radius in degrees. Arguments are ordered (other, subject, radius).

use celestial_core::constants::{ARCSEC_PER_DEGREE, DEGREES_PER_ARCSEC};

use crate::carrier::{Layout, Operand, Relation, SkyPoint, DEC_COLUMN, RA_COLUMN};
use crate::error::Result;
use crate::expr::{ColumnType, Expr, Function};
use crate::store::Extension;

use super::{
    check_radius, column_coordinates, ra_dec_columns, ColumnDef, IndexDef, IndexMethod,
    SpatialStrategy, StrategyKind,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PixelIndex;

impl PixelIndex {
    /// `<table>_q3c_ang2ipix_idx`
    pub fn index_name(table: &str) -> String {
        format!("{}_q3c_ang2ipix_idx", table)
    }

    fn radial(
        &self,
        func: Function,
        subject: &Operand,
        other: &Operand,
        radius_arcsec: f64,
    ) -> Result<Expr> {
        let radius = check_radius(radius_arcsec)?;
        let (ra, dec) = column_coordinates(self, "radially_within", subject)?;
        let (other_ra, other_dec) = column_coordinates(self, "radially_within", other)?;
        Ok(Expr::call(
            func,
            vec![other_ra, other_dec, ra, dec, Expr::lit(radius * DEGREES_PER_ARCSEC)],
        ))
    }
}

impl SpatialStrategy for PixelIndex {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PixelIndex
    }

    fn layout(&self) -> Layout {
        Layout::Columns
    }

    fn required_extension(&self) -> Option<Extension> {
        Some(Extension::Q3c)
    }

    fn columns(&self) -> Vec<ColumnDef> {
        ra_dec_columns()
    }

    fn indexes(&self, table: &str) -> Vec<IndexDef> {
        vec![IndexDef {
            name: Self::index_name(table),
            table: table.to_string(),
            method: IndexMethod::BTree,
            key: Expr::call(
                Function::Q3cAng2Ipix,
                vec![
                    Expr::bare_column(RA_COLUMN, ColumnType::Float64),
                    Expr::bare_column(DEC_COLUMN, ColumnType::Float64),
                ],
            ),
        }]
    }

    fn coordinates(&self, operand: &Operand) -> Result<(Expr, Expr)> {
        column_coordinates(self, "coordinates", operand)
    }

    fn distance(&self, a: &Operand, b: &Operand) -> Result<Expr> {
        let (ra1, dec1) = column_coordinates(self, "distance", a)?;
        let (ra2, dec2) = column_coordinates(self, "distance", b)?;
        Ok(Expr::call(Function::Q3cDist, vec![ra1, dec1, ra2, dec2]) * ARCSEC_PER_DEGREE)
    }

    fn radially_within_instance(
        &self,
        subject: &Operand,
        target: &SkyPoint,
        radius_arcsec: f64,
    ) -> Result<Expr> {
        self.radial(
            Function::Q3cRadialQuery,
            subject,
            &Operand::Instance(*target),
            radius_arcsec,
        )
    }

    fn radially_within_join(
        &self,
        subject: &Operand,
        other: &Relation,
        radius_arcsec: f64,
    ) -> Result<Expr> {
        self.radial(Function::Q3cJoin, subject, &Operand::from(other), radius_arcsec)
    }
}
