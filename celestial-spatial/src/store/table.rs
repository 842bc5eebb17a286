use std::sync::Arc;

use celestial_core::validate::{validate_declination, validate_right_ascension};

use crate::carrier::{Layout, StoredPosition, DEC_COLUMN, RADEC_COLUMN, RA_COLUMN};
use crate::error::{Result, SpatialError};
use crate::expr::{ColumnType, Value, ValueType};
use crate::geography::{LonLat, PackedPoint};

use super::index::SpatialIndex;

pub type RowId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<Value>,
}

#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) name: Arc<str>,
    pub(crate) columns: Vec<(Arc<str>, ColumnType)>,
    pub(crate) rows: Vec<Row>,
    pub(crate) indexes: Vec<SpatialIndex>,
    next_id: RowId,
}

impl Table {
    pub(crate) fn new(name: &str, columns: Vec<(Arc<str>, ColumnType)>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            indexes: Vec::new(),
            next_id: 1,
        }
    }

    pub(crate) fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|(c, _)| c.as_ref() == name)
            .ok_or_else(|| SpatialError::UnknownColumn {
                table: self.name.to_string(),
                column: name.to_string(),
            })
    }

    pub(crate) fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(self.columns[self.column_index(name)?].1)
    }

    /// Appends a row. Columns not named in `values` are NULL.
    pub(crate) fn insert(&mut self, values: &[(&str, Value)]) -> Result<RowId> {
        let mut row = vec![Value::Null; self.columns.len()];
        for (name, value) in values {
            let idx = self.column_index(name)?;
            let expected = ValueType::from(self.columns[idx].1);
            let found = value.value_type();
            if !found.fits(expected) {
                return Err(SpatialError::TypeMismatch {
                    context: format!("{}.{}", self.name, name),
                    expected: expected.name(),
                    found: found.name(),
                });
            }
            row[idx] = match (value, expected) {
                (Value::Int(v), ValueType::Float) => Value::Float(*v as f64),
                _ => *value,
            };
        }
        self.check_position(&mut row)?;

        let id = self.next_id;
        self.next_id += 1;
        let position = self.rows.len();
        self.rows.push(Row { id, values: row });
        for index in &mut self.indexes {
            index.add(position, &self.rows[position]);
        }
        Ok(id)
    }

    /// Rejects a position that is not on the sky and wraps right ascension
    /// into [0°, 360°). Only the carrier columns of the table's layout are
    /// checked; NULL halves pass.
    fn check_position(&self, row: &mut [Value]) -> Result<()> {
        match self.layout() {
            Some(Layout::Columns) => {
                let ra = self.column_index(RA_COLUMN)?;
                let dec = self.column_index(DEC_COLUMN)?;
                if let Value::Float(v) = row[ra] {
                    row[ra] = Value::Float(validate_right_ascension(v)?);
                }
                if let Value::Float(v) = row[dec] {
                    validate_declination(v)?;
                }
            }
            Some(Layout::Packed) => {
                let radec = self.column_index(RADEC_COLUMN)?;
                if let Value::Geography(p) = row[radec] {
                    let ra = validate_right_ascension(p.ra())?;
                    let dec = validate_declination(p.dec())?;
                    if ra != p.ra() {
                        row[radec] = Value::Geography(LonLat::from_radec(ra, dec));
                    }
                }
            }
            None => {}
        }
        Ok(())
    }

    pub(crate) fn row(&self, id: RowId) -> Option<&Row> {
        self.rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Storage layout implied by the declared columns.
    pub(crate) fn layout(&self) -> Option<Layout> {
        let has = |name: &str, ty: ColumnType| self.columns.iter().any(|(c, t)| c.as_ref() == name && *t == ty);
        if has(RADEC_COLUMN, ColumnType::Geography) {
            Some(Layout::Packed)
        } else if has(RA_COLUMN, ColumnType::Float64) && has(DEC_COLUMN, ColumnType::Float64) {
            Some(Layout::Columns)
        } else {
            None
        }
    }

    /// Position of a stored row, read back the way a carrier would load it.
    pub(crate) fn position(&self, row: &Row) -> Option<StoredPosition> {
        let layout = self.layout()?;
        let mut pos = StoredPosition::empty(layout);
        match layout {
            Layout::Columns => {
                let ra = self.column_index(RA_COLUMN).ok()?;
                let dec = self.column_index(DEC_COLUMN).ok()?;
                if let Some(ra) = row.values[ra].as_f64() {
                    pos.set_ra(ra);
                }
                if let Some(dec) = row.values[dec].as_f64() {
                    pos.set_dec(dec);
                }
            }
            Layout::Packed => {
                let radec = self.column_index(RADEC_COLUMN).ok()?;
                if let Some(p) = row.values[radec].as_geography() {
                    pos = StoredPosition::Packed(PackedPoint::Complete(p));
                }
            }
        }
        Some(pos)
    }
}
