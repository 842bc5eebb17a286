use std::fmt::Write;

use crate::error::Result;
use crate::expr::{ArithOp, BoolOp, ColumnType, CompareOp, Expr, Value};
use crate::geography::{PackedPoint, SRID_WGS84};
use crate::store::Extension;
use crate::strategy::{ColumnDef, IndexDef, IndexMethod, SpatialStrategy};

use super::PredicateCompiler;

/// Renders expressions and declarations as PostgreSQL.
///
/// Every binary node is parenthesized, so the text never depends on operator
/// precedence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlCompiler;

impl SqlCompiler {
    pub fn create_extension(&self, extension: Extension) -> String {
        format!("CREATE EXTENSION IF NOT EXISTS {}", extension.sql_name())
    }

    pub fn column_definition(&self, column: &ColumnDef) -> String {
        format!("{} {}", ident(column.name), column_type(column.ty))
    }

    pub fn create_index(&self, index: &IndexDef) -> String {
        let key = self.render(&index.key);
        match index.method {
            IndexMethod::BTree => match index.key {
                Expr::Column(_) => format!(
                    "CREATE INDEX {} ON {} ({})",
                    ident(&index.name),
                    ident(&index.table),
                    key
                ),
                _ => format!(
                    "CREATE INDEX {} ON {} (({}))",
                    ident(&index.name),
                    ident(&index.table),
                    key
                ),
            },
            IndexMethod::SpGist => format!(
                "CREATE INDEX {} ON {} USING spgist ({})",
                ident(&index.name),
                ident(&index.table),
                key
            ),
        }
    }

    /// Everything a carrier table needs under `strategy`: the extension, the
    /// position columns and the indexes.
    pub fn schema(&self, strategy: &dyn SpatialStrategy, table: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(ext) = strategy.required_extension() {
            out.push(self.create_extension(ext));
        }
        for column in strategy.columns() {
            out.push(format!(
                "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}",
                ident(table),
                self.column_definition(&column)
            ));
        }
        for index in strategy.indexes(table) {
            out.push(self.create_index(&index));
        }
        out
    }

    pub fn render(&self, expr: &Expr) -> String {
        let mut w = SqlWriter::default();
        w.expr(expr);
        w.out
    }

    /// Renders `expr` with every geography literal bound as an EWKB
    /// parameter (`ST_GeogFromWKB($n)`), numbered from `$1` in order of
    /// appearance.
    pub fn render_binary(&self, expr: &Expr) -> BoundSql {
        let mut w = SqlWriter {
            binary: Some(Vec::new()),
            ..SqlWriter::default()
        };
        w.expr(expr);
        BoundSql {
            sql: w.out,
            params: w.binary.unwrap_or_default(),
        }
    }
}

/// SQL text plus the EWKB values of its `$n` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSql {
    pub sql: String,
    pub params: Vec<Vec<u8>>,
}

impl PredicateCompiler for SqlCompiler {
    type Output = String;

    fn compile(&self, expr: &Expr) -> Result<String> {
        Ok(self.render(expr))
    }
}

fn column_type(ty: ColumnType) -> String {
    match ty {
        ColumnType::Float64 => "DOUBLE PRECISION".to_string(),
        ColumnType::Geography => format!("GEOGRAPHY(POINT, {})", SRID_WGS84),
    }
}

fn ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

fn float(v: f64) -> String {
    if v.is_nan() {
        return "'NaN'::double precision".to_string();
    }
    if v.is_infinite() {
        let sign = if v > 0.0 { "" } else { "-" };
        return format!("'{}Infinity'::double precision", sign);
    }
    let text = v.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

#[derive(Default)]
struct SqlWriter {
    out: String,
    /// Collected parameters when geography literals are bound rather than inlined.
    binary: Option<Vec<Vec<u8>>>,
}

impl SqlWriter {
    fn value(&mut self, value: &Value) {
        match value {
            Value::Null => self.out.push_str("NULL"),
            Value::Bool(true) => self.out.push_str("TRUE"),
            Value::Bool(false) => self.out.push_str("FALSE"),
            Value::Int(v) => {
                let _ = write!(self.out, "{}", v);
            }
            Value::Float(v) => self.out.push_str(&float(*v)),
            Value::Geography(p) => match &mut self.binary {
                Some(params) => {
                    params.push(PackedPoint::Complete(*p).to_ewkb());
                    let _ = write!(self.out, "ST_GeogFromWKB(${})", params.len());
                }
                None => {
                    let _ = write!(
                        self.out,
                        "'SRID={};POINT({} {})'::geography",
                        SRID_WGS84, p.lon, p.lat
                    );
                }
            },
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Column(c) => {
                if let Some(rel) = &c.relation {
                    self.out.push_str(&ident(rel));
                    self.out.push('.');
                }
                self.out.push_str(&ident(&c.name));
            }
            Expr::Literal(v) => self.value(v),
            Expr::Call { func, args } => {
                self.out.push_str(func.name());
                self.out.push('(');
                self.list(args, ", ");
                self.out.push(')');
            }
            Expr::Arith { op, left, right } => {
                let op = match op {
                    ArithOp::Add => " + ",
                    ArithOp::Sub => " - ",
                    ArithOp::Mul => " * ",
                    ArithOp::Div => " / ",
                };
                self.binary_op(left, op, right);
            }
            Expr::Compare { op, left, right } => {
                let op = match op {
                    CompareOp::Lt => " < ",
                    CompareOp::LtEq => " <= ",
                    CompareOp::Gt => " > ",
                    CompareOp::GtEq => " >= ",
                    CompareOp::Eq => " = ",
                };
                self.binary_op(left, op, right);
            }
            Expr::Bool { op: BoolOp::Not, args } => {
                self.out.push_str("NOT (");
                self.list(args, " AND ");
                self.out.push(')');
            }
            Expr::Bool { op, args } => {
                let sep = if *op == BoolOp::And { " AND " } else { " OR " };
                self.out.push('(');
                self.list(args, sep);
                self.out.push(')');
            }
        }
    }

    fn binary_op(&mut self, left: &Expr, op: &str, right: &Expr) {
        self.out.push('(');
        self.expr(left);
        self.out.push_str(op);
        self.expr(right);
        self.out.push(')');
    }

    fn list(&mut self, items: &[Expr], sep: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(sep);
            }
            self.expr(item);
        }
    }
}
