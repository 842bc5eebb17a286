//! In-memory reference record store.
//!
//! A small relational engine that understands the native functions the
//! strategies emit, so predicates can be executed and checked without a
//! database. Tables hold rows of [`Value`]s; extensions must be installed
//! before their functions, column types or indexes are used.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`eval`] | Row-at-a-time evaluation with SQL NULL semantics |
//! | `index` | Cell buckets with bounding caps, proximity lookup planning |
//! | `healpix` | Nested pixel ids behind `q3c_ang2ipix` |
//! | `table` | Column layout, rows, position read-back |
//!
//! # Example
//!
//! ```
//! use celestial_spatial::carrier::{SkyRecord, Operand};
//! use celestial_spatial::store::{Extension, MemoryStore};
//! use celestial_spatial::strategy::{SpatialStrategy, StrategyKind};
//!
//! let strategy = StrategyKind::PixelIndex.strategy();
//! let mut store = MemoryStore::new();
//! store.install_extension(Extension::Q3c);
//! store.create_carrier_table(strategy, "objects")?;
//!
//! let near = store.insert("objects", &SkyRecord::at((), strategy.layout(), 10.0, 0.0))?;
//! store.insert("objects", &SkyRecord::at((), strategy.layout(), 50.0, 0.0))?;
//!
//! let objects = strategy.relation("objects");
//! let predicate = strategy.radially_within(&objects.clone().into(), &Operand::point(10.0, 0.01)?, 40.0)?;
//! assert_eq!(store.filter(&objects, &predicate)?, vec![near]);
//! # Ok::<(), celestial_spatial::SpatialError>(())
//! ```

pub mod eval;
mod healpix;
mod index;
mod table;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::carrier::{Relation, SpatialCarrier, StoredPosition};
use crate::compiler::PredicateCompiler;
use crate::error::{Result, SpatialError};
use crate::expr::{BoolOp, ColumnType, Expr, Value, ValueType};
use crate::strategy::{ColumnDef, IndexDef, SpatialStrategy};

use eval::{evaluate, is_true, Scope};
use index::{IndexKey, Lookup, SpatialIndex};
use table::Table;

pub use table::{Row, RowId};

/// Store extensions that provide spatial functions and types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Hierarchical pixel index functions (`q3c_*`).
    Q3c,
    /// Geography type and `ST_*` functions.
    PostGis,
}

impl Extension {
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Q3c => "q3c",
            Self::PostGis => "postgis",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A predicate checked against a store: every function is installed, every
/// call has the right arity and argument types.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    pub expr: Expr,
    pub result_type: ValueType,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    extensions: HashSet<Extension>,
    tables: HashMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_extension(&mut self, extension: Extension) {
        if self.extensions.insert(extension) {
            debug!(%extension, "extension installed");
        }
    }

    pub fn has_extension(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    fn require(&self, extension: Extension, needed_by: impl Into<String>) -> Result<()> {
        if self.has_extension(extension) {
            Ok(())
        } else {
            Err(SpatialError::MissingExtension {
                extension,
                needed_by: needed_by.into(),
            })
        }
    }

    pub fn create_table(&mut self, name: &str, columns: &[ColumnDef]) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(SpatialError::DuplicateTable(name.to_string()));
        }
        for column in columns {
            if column.ty == ColumnType::Geography {
                self.require(Extension::PostGis, format!("column {}.{}", name, column.name))?;
            }
        }
        let columns = columns.iter().map(|c| (Arc::from(c.name), c.ty)).collect();
        self.tables.insert(name.to_string(), Table::new(name, columns));
        debug!(table = name, "table created");
        Ok(())
    }

    /// Builds the index over existing rows and keeps it current on insert.
    pub fn declare_index(&mut self, def: &IndexDef) -> Result<()> {
        self.compile(&def.key)?;
        let table = self.table(&def.table)?;
        if table.indexes.iter().any(|i| i.name == def.name) {
            return Ok(());
        }
        let key = IndexKey::from_def(def, table)?;
        if matches!(key, IndexKey::Geography { .. }) {
            self.require(Extension::PostGis, format!("index {}", def.name))?;
        }
        let index = SpatialIndex::build(&def.name, key, table)?;
        debug!(
            index = %def.name,
            table = %def.table,
            buckets = index.bucket_count(),
            "index declared"
        );
        self.table_mut(&def.table)?.indexes.push(index);
        Ok(())
    }

    /// Creates `table` with the strategy's position columns and declares its
    /// indexes. The strategy's extension must already be installed.
    pub fn create_carrier_table(&mut self, strategy: &dyn SpatialStrategy, table: &str) -> Result<()> {
        if let Some(ext) = strategy.required_extension() {
            self.require(ext, format!("{} strategy", strategy.kind()))?;
        }
        self.create_table(table, &strategy.columns())?;
        for index in strategy.indexes(table) {
            self.declare_index(&index)?;
        }
        debug!(table, layout = %strategy.layout(), strategy = %strategy.kind(), "carrier table ready");
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| SpatialError::UnknownTable(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| SpatialError::UnknownTable(name.to_string()))
    }

    /// Persists a carrier's position. A half-set position is stored as NULL.
    pub fn insert<C: SpatialCarrier + ?Sized>(&mut self, table: &str, carrier: &C) -> Result<RowId> {
        let values = carrier.position().persisted_values();
        self.insert_values(table, &values)
    }

    pub fn insert_values(&mut self, table: &str, values: &[(&str, Value)]) -> Result<RowId> {
        let id = self.table_mut(table)?.insert(values)?;
        trace!(table, id, "row inserted");
        Ok(id)
    }

    pub fn len(&self, table: &str) -> Result<usize> {
        Ok(self.table(table)?.rows.len())
    }

    pub fn is_empty(&self, table: &str) -> Result<bool> {
        Ok(self.len(table)? == 0)
    }

    pub fn row(&self, table: &str, id: RowId) -> Result<Option<&Row>> {
        Ok(self.table(table)?.row(id))
    }

    /// Reads a row's position back in the table's layout.
    pub fn position(&self, table: &str, id: RowId) -> Result<Option<StoredPosition>> {
        let table = self.table(table)?;
        Ok(table.row(id).and_then(|row| table.position(row)))
    }

    /// Checks that every column of `predicate` belongs to one of `relations`
    /// and exists with the declared type.
    fn bind_columns(&self, predicate: &CompiledPredicate, relations: &[&Relation]) -> Result<()> {
        for column in predicate.expr.columns() {
            let alias = column.relation.as_deref().unwrap_or("<unqualified>");
            let relation = relations
                .iter()
                .find(|r| r.alias_name() == alias)
                .ok_or_else(|| SpatialError::UnknownRelation(alias.to_string()))?;
            let declared = self.table(relation.table())?.column_type(&column.name)?;
            if declared != column.ty {
                return Err(SpatialError::TypeMismatch {
                    context: format!("{}.{}", alias, column.name),
                    expected: ValueType::from(declared).name(),
                    found: ValueType::from(column.ty).name(),
                });
            }
        }
        Ok(())
    }

    fn compile_filter(&self, predicate: &Expr, relations: &[&Relation]) -> Result<CompiledPredicate> {
        let compiled = self.compile(predicate)?;
        if !compiled.result_type.fits(ValueType::Bool) {
            return Err(SpatialError::TypeMismatch {
                context: "predicate".to_string(),
                expected: ValueType::Bool.name(),
                found: compiled.result_type.name(),
            });
        }
        self.bind_columns(&compiled, relations)?;
        Ok(compiled)
    }

    /// Ids of the rows of `relation` for which `predicate` is true.
    pub fn filter(&self, relation: &Relation, predicate: &Expr) -> Result<Vec<RowId>> {
        let compiled = self.compile_filter(predicate, &[relation])?;
        let table = self.table(relation.table())?;
        let alias = relation.alias_name();

        let positions = match Lookup::plan(&compiled.expr, alias, table) {
            Some(lookup) => {
                let candidates = lookup.candidates(table, &[])?.unwrap_or_default();
                debug!(
                    table = %table.name,
                    index = %table.indexes[lookup.index].name,
                    candidates = candidates.len(),
                    rows = table.rows.len(),
                    "index lookup"
                );
                candidates
            }
            None => (0..table.rows.len()).collect(),
        };

        let mut out = Vec::new();
        for position in positions {
            let row = &table.rows[position];
            let scope = [Scope { alias, table, row }];
            if is_true(evaluate(&compiled.expr, &scope)?) {
                out.push(row.id);
            }
        }
        Ok(out)
    }

    /// Pairs of (left id, right id) for which `predicate` is true.
    pub fn join(&self, left: &Relation, right: &Relation, predicate: &Expr) -> Result<Vec<(RowId, RowId)>> {
        if left.alias_name() == right.alias_name() {
            return Err(SpatialError::AmbiguousRelation(left.alias_name().to_string()));
        }
        let compiled = self.compile_filter(predicate, &[left, right])?;
        let left_table = self.table(left.table())?;
        let right_table = self.table(right.table())?;

        // Look up the right side if it has a usable index, else the left.
        let (outer, outer_table, inner, inner_table, swapped, lookup) =
            match Lookup::plan(&compiled.expr, right.alias_name(), right_table) {
                Some(p) => (left, left_table, right, right_table, false, Some(p)),
                None => match Lookup::plan(&compiled.expr, left.alias_name(), left_table) {
                    Some(p) => (right, right_table, left, left_table, true, Some(p)),
                    None => (left, left_table, right, right_table, false, None),
                },
            };
        if let Some(lookup) = &lookup {
            debug!(
                outer = outer.alias_name(),
                inner = inner.alias_name(),
                index = %inner_table.indexes[lookup.index].name,
                "join index lookup"
            );
        }

        let mut out = Vec::new();
        let all_inner: Vec<usize> = (0..inner_table.rows.len()).collect();
        for outer_row in &outer_table.rows {
            let outer_scope = Scope {
                alias: outer.alias_name(),
                table: outer_table,
                row: outer_row,
            };
            let candidates = match &lookup {
                Some(p) => match p.candidates(inner_table, &[outer_scope])? {
                    Some(c) => c,
                    None => continue,
                },
                None => all_inner.clone(),
            };
            for position in candidates {
                let inner_row = &inner_table.rows[position];
                let scopes = [
                    outer_scope,
                    Scope {
                        alias: inner.alias_name(),
                        table: inner_table,
                        row: inner_row,
                    },
                ];
                if is_true(evaluate(&compiled.expr, &scopes)?) {
                    out.push(if swapped {
                        (inner_row.id, outer_row.id)
                    } else {
                        (outer_row.id, inner_row.id)
                    });
                }
            }
        }
        out.sort_unstable();
        Ok(out)
    }

    /// Evaluates `projection` for each row of `relation`.
    pub fn select(&self, relation: &Relation, projection: &Expr) -> Result<Vec<(RowId, Value)>> {
        let compiled = self.compile(projection)?;
        self.bind_columns(&compiled, &[relation])?;
        let table = self.table(relation.table())?;
        table
            .rows
            .iter()
            .map(|row| {
                let scope = [Scope {
                    alias: relation.alias_name(),
                    table,
                    row,
                }];
                Ok((row.id, evaluate(&compiled.expr, &scope)?))
            })
            .collect()
    }

    fn check(&self, expr: &Expr) -> Result<ValueType> {
        match expr {
            Expr::Column(c) => Ok(c.ty.into()),
            Expr::Literal(v) => Ok(v.value_type()),
            Expr::Call { func, args } => {
                if let Some(ext) = func.extension() {
                    self.require(ext, func.name())?;
                }
                if !func.arity().accepts(args.len()) {
                    return Err(SpatialError::Arity {
                        function: func.name(),
                        expected: func.expected_args(),
                        found: args.len(),
                    });
                }
                let params = func.parameter_types();
                for (i, arg) in args.iter().enumerate() {
                    let expected = params[i.min(params.len() - 1)];
                    let found = self.check(arg)?;
                    if !found.fits(expected) {
                        return Err(SpatialError::TypeMismatch {
                            context: format!("argument {} of {}", i + 1, func),
                            expected: expected.name(),
                            found: found.name(),
                        });
                    }
                }
                Ok(func.return_type())
            }
            Expr::Arith { left, right, .. } | Expr::Compare { left, right, .. } => {
                for side in [left, right] {
                    let found = self.check(side)?;
                    if !found.fits(ValueType::Float) {
                        return Err(SpatialError::TypeMismatch {
                            context: "arithmetic or comparison operand".to_string(),
                            expected: ValueType::Float.name(),
                            found: found.name(),
                        });
                    }
                }
                Ok(expr.value_type())
            }
            Expr::Bool { op, args } => {
                if *op == BoolOp::Not && args.len() != 1 {
                    return Err(SpatialError::Arity {
                        function: "NOT",
                        expected: 1,
                        found: args.len(),
                    });
                }
                for arg in args {
                    let found = self.check(arg)?;
                    if !found.fits(ValueType::Bool) {
                        return Err(SpatialError::TypeMismatch {
                            context: "boolean operand".to_string(),
                            expected: ValueType::Bool.name(),
                            found: found.name(),
                        });
                    }
                }
                Ok(ValueType::Bool)
            }
        }
    }
}

impl PredicateCompiler for MemoryStore {
    type Output = CompiledPredicate;

    fn compile(&self, expr: &Expr) -> Result<CompiledPredicate> {
        let result_type = self.check(expr)?;
        Ok(CompiledPredicate {
            expr: expr.clone(),
            result_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::{Layout, Operand, SkyRecord};
    use crate::expr::Function;
    use crate::strategy::StrategyKind;

    fn store_for(kind: StrategyKind) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.install_extension(Extension::Q3c);
        store.install_extension(Extension::PostGis);
        store
            .create_carrier_table(kind.strategy(), "objects")
            .unwrap();
        store
    }

    #[test]
    fn test_missing_extension_rejected_at_setup() {
        let mut store = MemoryStore::new();
        let err = store
            .create_carrier_table(StrategyKind::PixelIndex.strategy(), "objects")
            .unwrap_err();
        assert!(matches!(
            err,
            SpatialError::MissingExtension {
                extension: Extension::Q3c,
                ..
            }
        ));

        let err = store
            .create_carrier_table(StrategyKind::GeodesicIndex.strategy(), "objects")
            .unwrap_err();
        assert!(matches!(
            err,
            SpatialError::MissingExtension {
                extension: Extension::PostGis,
                ..
            }
        ));

        store
            .create_carrier_table(StrategyKind::Unindexed.strategy(), "objects")
            .unwrap();
    }

    #[test]
    fn test_missing_extension_rejected_at_compile() {
        let store = MemoryStore::new();
        let e = Expr::call(
            Function::Q3cDist,
            vec![Expr::lit(0.0), Expr::lit(0.0), Expr::lit(1.0), Expr::lit(1.0)],
        );
        assert!(matches!(
            store.compile(&e),
            Err(SpatialError::MissingExtension { .. })
        ));
    }

    #[test]
    fn test_compile_checks_types_and_arity() {
        let store = store_for(StrategyKind::GeodesicIndex);
        let bad_arg = Expr::call(Function::StX, vec![Expr::lit(1.0)]);
        assert!(matches!(
            store.compile(&bad_arg),
            Err(SpatialError::TypeMismatch { .. })
        ));
        let bad_arity = Expr::call(Function::Sin, vec![]);
        assert!(matches!(
            store.compile(&bad_arity),
            Err(SpatialError::Arity { .. })
        ));
        let ok = store
            .compile(&Expr::call(Function::Cos, vec![Expr::int(0)]).lt_eq(1.0))
            .unwrap();
        assert_eq!(ok.result_type, ValueType::Bool);
    }

    #[test]
    fn test_duplicate_table() {
        let mut store = store_for(StrategyKind::Unindexed);
        assert!(matches!(
            store.create_table("objects", &[]),
            Err(SpatialError::DuplicateTable(_))
        ));
    }

    #[test]
    fn test_partial_carrier_persisted_as_null() {
        for kind in StrategyKind::ALL {
            let mut store = store_for(kind);
            let mut rec = SkyRecord::new((), kind.strategy().layout());
            rec.set_ra(12.0);
            let id = store.insert("objects", &rec).unwrap();
            let back = store.position("objects", id).unwrap().unwrap();
            assert_eq!(back.radec(), None, "{}", kind);
            assert_eq!(back.ra(), None, "{}", kind);
        }
    }

    #[test]
    fn test_complete_carrier_round_trips() {
        for kind in StrategyKind::ALL {
            let mut store = store_for(kind);
            let rec = SkyRecord::at((), kind.strategy().layout(), 250.5, -12.25);
            let id = store.insert("objects", &rec).unwrap();
            let back = store.position("objects", id).unwrap().unwrap();
            assert_eq!(back.radec(), Some((250.5, -12.25)), "{}", kind);
        }
    }

    #[test]
    fn test_wrong_layout_insert_rejected() {
        let mut store = store_for(StrategyKind::PixelIndex);
        let rec = SkyRecord::at((), Layout::Packed, 1.0, 1.0);
        assert!(matches!(
            store.insert("objects", &rec),
            Err(SpatialError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_filter_null_rows_never_match() {
        for kind in StrategyKind::ALL {
            let mut store = store_for(kind);
            let strategy = kind.strategy();
            store
                .insert("objects", &SkyRecord::new((), strategy.layout()))
                .unwrap();
            let hit = store
                .insert("objects", &SkyRecord::at((), strategy.layout(), 1.0, 1.0))
                .unwrap();
            let objects = strategy.relation("objects");
            let p = strategy
                .radially_within(&Operand::from(&objects), &Operand::point(1.0, 1.0).unwrap(), 1.0)
                .unwrap();
            assert_eq!(store.filter(&objects, &p).unwrap(), vec![hit], "{}", kind);
        }
    }

    #[test]
    fn test_filter_rejects_unbound_relation() {
        let store = store_for(StrategyKind::Unindexed);
        let strategy = StrategyKind::Unindexed.strategy();
        let objects = strategy.relation("objects");
        let other = objects.alias("other");
        let p = strategy
            .radially_within(&Operand::from(&other), &Operand::point(1.0, 1.0).unwrap(), 1.0)
            .unwrap();
        assert!(matches!(
            store.filter(&objects, &p),
            Err(SpatialError::UnknownRelation(_))
        ));
    }

    #[test]
    fn test_filter_requires_boolean() {
        let store = store_for(StrategyKind::Unindexed);
        let strategy = StrategyKind::Unindexed.strategy();
        let objects = strategy.relation("objects");
        let d = strategy
            .distance(&Operand::from(&objects), &Operand::point(1.0, 1.0).unwrap())
            .unwrap();
        assert!(matches!(
            store.filter(&objects, &d),
            Err(SpatialError::TypeMismatch { .. })
        ));
        assert!(store.select(&objects, &d).unwrap().is_empty());
    }

    #[test]
    fn test_off_sky_insert_rejected() {
        for kind in StrategyKind::ALL {
            let mut store = store_for(kind);
            let layout = kind.strategy().layout();
            match store.insert("objects", &SkyRecord::at((), layout, 10.0, 100.0)) {
                Err(SpatialError::Core(e)) => {
                    assert_eq!(e.kind(), Some(&celestial_core::MathErrorKind::OutOfRange), "{}", kind)
                }
                other => panic!("{}: expected out-of-range error, got {:?}", kind, other),
            }
            assert!(store
                .insert("objects", &SkyRecord::at((), layout, f64::NAN, 10.0))
                .is_err());
            assert!(store.is_empty("objects").unwrap(), "{}", kind);
        }

        let mut store = store_for(StrategyKind::PixelIndex);
        assert!(matches!(
            store.insert_values("objects", &[("ra", Value::Float(1.0)), ("dec", Value::Float(-95.0))]),
            Err(SpatialError::Core(_))
        ));
    }

    #[test]
    fn test_insert_wraps_right_ascension() {
        for kind in StrategyKind::ALL {
            let mut store = store_for(kind);
            let layout = kind.strategy().layout();
            let id = store.insert("objects", &SkyRecord::at((), layout, 370.0, 5.0)).unwrap();
            let back = store.position("objects", id).unwrap().unwrap();
            assert_eq!(back.radec(), Some((10.0, 5.0)), "{}", kind);
        }
    }

    #[test]
    fn test_rejected_row_cannot_split_index_and_scan() {
        let kind = StrategyKind::PixelIndex;
        let strategy = kind.strategy();
        let mut indexed = store_for(kind);
        let mut plain = MemoryStore::new();
        plain.install_extension(Extension::Q3c);
        plain.create_table("objects", &strategy.columns()).unwrap();

        for store in [&mut indexed, &mut plain] {
            assert!(store
                .insert("objects", &SkyRecord::at((), strategy.layout(), 10.0, 100.0))
                .is_err());
            store
                .insert("objects", &SkyRecord::at((), strategy.layout(), 190.0, 80.0))
                .unwrap();
        }

        let objects = strategy.relation("objects");
        let p = strategy
            .radially_within(&Operand::from(&objects), &Operand::point(190.0, 80.0).unwrap(), 1.0)
            .unwrap();
        assert_eq!(indexed.filter(&objects, &p).unwrap(), vec![1]);
        assert_eq!(plain.filter(&objects, &p).unwrap(), vec![1]);
    }

    #[test]
    fn test_index_over_plain_columns_keeps_unusual_angles() {
        let mut store = MemoryStore::new();
        store.install_extension(Extension::Q3c);
        let columns = [
            ColumnDef { name: "lon", ty: ColumnType::Float64 },
            ColumnDef { name: "lat", ty: ColumnType::Float64 },
        ];
        store.create_table("raw", &columns).unwrap();
        let key = Expr::call(
            Function::Q3cAng2Ipix,
            vec![
                Expr::bare_column("lon", ColumnType::Float64),
                Expr::bare_column("lat", ColumnType::Float64),
            ],
        );
        // (10, 100) is the same point as (190, 80).
        let odd = store
            .insert_values("raw", &[("lon", Value::Float(10.0)), ("lat", Value::Float(100.0))])
            .unwrap();
        store
            .insert_values("raw", &[("lon", Value::Float(f64::NAN)), ("lat", Value::Float(0.0))])
            .unwrap();

        let raw = Relation::new("raw", Layout::Columns);
        let predicate = Expr::call(
            Function::Q3cRadialQuery,
            vec![
                Expr::lit(190.0),
                Expr::lit(80.0),
                raw.column("lon", ColumnType::Float64),
                raw.column("lat", ColumnType::Float64),
                Expr::lit(1.0 / 3600.0),
            ],
        );
        let scanned = store.filter(&raw, &predicate).unwrap();
        store
            .declare_index(&IndexDef {
                name: "raw_lon_lat_idx".to_string(),
                table: "raw".to_string(),
                method: crate::strategy::IndexMethod::BTree,
                key,
            })
            .unwrap();
        assert_eq!(store.filter(&raw, &predicate).unwrap(), scanned);
        assert_eq!(scanned, vec![odd]);
    }

    #[test]
    fn test_index_lookup_matches_scan() {
        let kind = StrategyKind::PixelIndex;
        let strategy = kind.strategy();
        let mut indexed = store_for(kind);
        let mut plain = MemoryStore::new();
        plain.install_extension(Extension::Q3c);
        plain.create_table("objects", &strategy.columns()).unwrap();

        for i in 0..500 {
            let ra = (i as f64 * 7.31) % 360.0;
            let dec = ((i as f64 * 3.17) % 180.0) - 90.0;
            let rec = SkyRecord::at(i, strategy.layout(), ra, dec);
            indexed.insert("objects", &rec).unwrap();
            plain.insert("objects", &rec).unwrap();
        }

        let objects = strategy.relation("objects");
        for (ra, dec, r) in [(10.0, 10.0, 36_000.0), (359.0, -89.0, 20_000.0), (180.0, 0.0, 1.0)] {
            let p = strategy
                .radially_within(&Operand::from(&objects), &Operand::point(ra, dec).unwrap(), r)
                .unwrap();
            assert_eq!(indexed.filter(&objects, &p).unwrap(), plain.filter(&objects, &p).unwrap());
        }
    }
}
