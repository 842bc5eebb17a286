//! Predicate expression trees.
//!
//! Strategies never talk to a query engine directly. They build an [`Expr`]
//! and hand it to a [`PredicateCompiler`](crate::compiler::PredicateCompiler),
//! which lowers it into whatever the record store understands.
//!
//! The tree has three kinds of interior node a compiler must handle:
//!
//! | Node | Meaning |
//! |------|---------|
//! | [`Expr::Call`] | native function of the store or one of its extensions |
//! | [`Expr::Arith`] / [`Expr::Compare`] | numeric arithmetic and comparison |
//! | [`Expr::Bool`] | AND / OR / NOT |
//!
//! Arithmetic operators are overloaded so the great-circle formula reads like
//! the math:
//!
//! ```
//! use celestial_spatial::expr::{ColumnType, Expr, Function};
//!
//! let dec = Expr::column("o", "dec", ColumnType::Float64);
//! let colatitude = Expr::lit(90.0) - dec;
//! let cosine = Expr::call(Function::Cos, vec![colatitude]);
//! assert_eq!(cosine.columns().len(), 1);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;

use crate::geography::LonLat;
use crate::store::Extension;

/// Storage type of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Float64,
    /// Geodetic point on the WGS84 sphere (SRID 4326).
    Geography,
}

/// Runtime type of an expression result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    Geography,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "double precision",
            Self::Geography => "geography",
        }
    }

    /// Whether a value of this type can stand where `expected` is required.
    /// NULL fits anywhere and integers widen to floats.
    pub fn fits(self, expected: ValueType) -> bool {
        self == expected
            || self == Self::Null
            || (self == Self::Int && expected == Self::Float)
    }
}

impl From<ColumnType> for ValueType {
    fn from(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Float64 => Self::Float,
            ColumnType::Geography => Self::Geography,
        }
    }
}

/// A scalar value, either a literal in a tree or a stored cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Geography(LonLat),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Geography(_) => ValueType::Geography,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view; integers widen, everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_geography(&self) -> Option<LonLat> {
        match self {
            Self::Geography(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Null, Self::Float)
    }
}

/// A column of a relation. `relation` is the query alias; `None` means the
/// bare column name, as used in index keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub relation: Option<Arc<str>>,
    pub name: Arc<str>,
    pub ty: ColumnType,
}

/// Argument count accepted by a [`Function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Self::Exact(k) => n == k,
            Self::AtLeast(k) => n >= k,
        }
    }

    fn count(self) -> usize {
        match self {
            Self::Exact(k) | Self::AtLeast(k) => k,
        }
    }
}

/// Native functions a strategy may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Cos,
    Sin,
    Acos,
    Greatest,
    Least,
    /// `q3c_ang2ipix(ra, dec)`: pixel id, the key of the functional index.
    Q3cAng2Ipix,
    /// `q3c_dist(ra1, dec1, ra2, dec2)`: separation in degrees.
    Q3cDist,
    /// `q3c_radial_query(ra, dec, center_ra, center_dec, radius_deg)`.
    Q3cRadialQuery,
    /// `q3c_join(ra1, dec1, ra2, dec2, radius_deg)`.
    Q3cJoin,
    StX,
    StY,
    StMakePoint,
    StSetSrid,
    /// Cast to geography.
    Geography,
    /// `ST_Distance(a, b, use_spheroid)`, in meters.
    StDistance,
    /// `ST_DWithin(a, b, meters, use_spheroid)`.
    StDWithin,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Self::Cos => "cos",
            Self::Sin => "sin",
            Self::Acos => "acos",
            Self::Greatest => "greatest",
            Self::Least => "least",
            Self::Q3cAng2Ipix => "q3c_ang2ipix",
            Self::Q3cDist => "q3c_dist",
            Self::Q3cRadialQuery => "q3c_radial_query",
            Self::Q3cJoin => "q3c_join",
            Self::StX => "ST_X",
            Self::StY => "ST_Y",
            Self::StMakePoint => "ST_MakePoint",
            Self::StSetSrid => "ST_SetSRID",
            Self::Geography => "geography",
            Self::StDistance => "ST_Distance",
            Self::StDWithin => "ST_DWithin",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Self::Cos | Self::Sin | Self::Acos => Arity::Exact(1),
            Self::Greatest | Self::Least => Arity::AtLeast(1),
            Self::Q3cAng2Ipix => Arity::Exact(2),
            Self::Q3cDist => Arity::Exact(4),
            Self::Q3cRadialQuery | Self::Q3cJoin => Arity::Exact(5),
            Self::StX | Self::StY | Self::Geography => Arity::Exact(1),
            Self::StMakePoint | Self::StSetSrid => Arity::Exact(2),
            Self::StDistance => Arity::Exact(3),
            Self::StDWithin => Arity::Exact(4),
        }
    }

    /// Argument types, positionally. Variadic functions repeat the last entry.
    pub fn parameter_types(self) -> &'static [ValueType] {
        use ValueType::{Bool, Float, Geography, Int};
        match self {
            Self::Cos | Self::Sin | Self::Acos | Self::Greatest | Self::Least => &[Float],
            Self::Q3cAng2Ipix | Self::StMakePoint => &[Float, Float],
            Self::Q3cDist => &[Float, Float, Float, Float],
            Self::Q3cRadialQuery | Self::Q3cJoin => &[Float, Float, Float, Float, Float],
            Self::StX | Self::StY | Self::Geography => &[Geography],
            Self::StSetSrid => &[Geography, Int],
            Self::StDistance => &[Geography, Geography, Bool],
            Self::StDWithin => &[Geography, Geography, Float, Bool],
        }
    }

    pub fn return_type(self) -> ValueType {
        match self {
            Self::Q3cAng2Ipix => ValueType::Int,
            Self::Q3cRadialQuery | Self::Q3cJoin | Self::StDWithin => ValueType::Bool,
            Self::StMakePoint | Self::StSetSrid | Self::Geography => ValueType::Geography,
            _ => ValueType::Float,
        }
    }

    /// The store extension that provides this function, if it is not built in.
    pub fn extension(self) -> Option<Extension> {
        match self {
            Self::Cos | Self::Sin | Self::Acos | Self::Greatest | Self::Least => None,
            Self::Q3cAng2Ipix | Self::Q3cDist | Self::Q3cRadialQuery | Self::Q3cJoin => {
                Some(Extension::Q3c)
            }
            _ => Some(Extension::PostGis),
        }
    }

    pub(crate) fn expected_args(self) -> usize {
        self.arity().count()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

/// A backend-neutral expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Value),
    Call {
        func: Function,
        args: Vec<Expr>,
    },
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Bool {
        op: BoolOp,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn column(relation: impl Into<Arc<str>>, name: impl Into<Arc<str>>, ty: ColumnType) -> Self {
        Self::Column(ColumnRef {
            relation: Some(relation.into()),
            name: name.into(),
            ty,
        })
    }

    /// A column without a relation qualifier.
    pub fn bare_column(name: impl Into<Arc<str>>, ty: ColumnType) -> Self {
        Self::Column(ColumnRef {
            relation: None,
            name: name.into(),
            ty,
        })
    }

    pub fn lit(v: f64) -> Self {
        Self::Literal(Value::Float(v))
    }

    pub fn int(v: i64) -> Self {
        Self::Literal(Value::Int(v))
    }

    pub fn boolean(v: bool) -> Self {
        Self::Literal(Value::Bool(v))
    }

    pub fn call(func: Function, args: Vec<Expr>) -> Self {
        Self::Call { func, args }
    }

    fn arith(op: ArithOp, left: Expr, right: Expr) -> Self {
        Self::Arith {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn compare(op: CompareOp, left: Expr, right: impl Into<Expr>) -> Self {
        Self::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right.into()),
        }
    }

    pub fn lt_eq(self, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::LtEq, self, right)
    }

    pub fn and(self, right: Expr) -> Self {
        match self {
            Self::Bool {
                op: BoolOp::And,
                mut args,
            } => {
                args.push(right);
                Self::Bool {
                    op: BoolOp::And,
                    args,
                }
            }
            left => Self::Bool {
                op: BoolOp::And,
                args: vec![left, right],
            },
        }
    }

    pub fn not(self) -> Self {
        Self::Bool {
            op: BoolOp::Not,
            args: vec![self],
        }
    }

    /// Result type, derived from the tree alone.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Column(c) => c.ty.into(),
            Self::Literal(v) => v.value_type(),
            Self::Call { func, .. } => func.return_type(),
            Self::Arith { .. } => ValueType::Float,
            Self::Compare { .. } | Self::Bool { .. } => ValueType::Bool,
        }
    }

    /// Every column referenced anywhere in the tree, in visiting order.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            Self::Column(c) => out.push(c),
            Self::Literal(_) => {}
            Self::Call { args, .. } | Self::Bool { args, .. } => {
                for arg in args {
                    arg.collect_columns(out);
                }
            }
            Self::Arith { left, right, .. } | Self::Compare { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
        }
    }

    /// True when the tree references no column outside `relation`.
    pub fn only_references(&self, relation: &str) -> bool {
        self.columns()
            .iter()
            .all(|c| c.relation.as_deref() == Some(relation))
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Self::lit(v)
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

impl<T: Into<Expr>> Add<T> for Expr {
    type Output = Expr;

    fn add(self, rhs: T) -> Expr {
        Expr::arith(ArithOp::Add, self, rhs.into())
    }
}

impl<T: Into<Expr>> Sub<T> for Expr {
    type Output = Expr;

    fn sub(self, rhs: T) -> Expr {
        Expr::arith(ArithOp::Sub, self, rhs.into())
    }
}

impl<T: Into<Expr>> Mul<T> for Expr {
    type Output = Expr;

    fn mul(self, rhs: T) -> Expr {
        Expr::arith(ArithOp::Mul, self, rhs.into())
    }
}

impl<T: Into<Expr>> Div<T> for Expr {
    type Output = Expr;

    fn div(self, rhs: T) -> Expr {
        Expr::arith(ArithOp::Div, self, rhs.into())
    }
}
