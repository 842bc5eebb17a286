//! Row-at-a-time expression evaluation with SQL NULL semantics.
//!
//! Arithmetic, comparisons and strict functions return NULL when any input is
//! NULL; `greatest` / `least` skip NULLs; AND / OR / NOT are three-valued.
//! A NULL filter result counts as false.

use celestial_core::constants::RAD_TO_DEG;
use celestial_core::math::separation_rad;
use celestial_core::{AstroError, MathErrorKind};

use crate::error::{Result, SpatialError};
use crate::expr::{ArithOp, BoolOp, CompareOp, Expr, Function, Value};
use crate::geography::{LonLat, SRID_WGS84};
use crate::strategy::EFFECTIVE_EARTH_RADIUS_M;

use super::healpix::ang2pix;
use super::table::{Row, Table};

/// One bound row of a relation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub(crate) alias: &'a str,
    pub(crate) table: &'a Table,
    pub(crate) row: &'a Row,
}

/// Evaluates a tree that references no columns.
pub fn evaluate_constant(expr: &Expr) -> Result<Value> {
    evaluate(expr, &[])
}

pub(crate) fn evaluate(expr: &Expr, scopes: &[Scope<'_>]) -> Result<Value> {
    match expr {
        Expr::Column(c) => {
            let scope = match c.relation.as_deref() {
                Some(alias) => scopes.iter().find(|s| s.alias == alias),
                None if scopes.len() == 1 => scopes.first(),
                None => None,
            }
            .ok_or_else(|| {
                SpatialError::UnknownRelation(c.relation.as_deref().unwrap_or("<unqualified>").to_string())
            })?;
            let idx = scope.table.column_index(&c.name)?;
            Ok(scope.row.values[idx])
        }
        Expr::Literal(v) => Ok(*v),
        Expr::Call { func, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, scopes)?);
            }
            call(*func, &values)
        }
        Expr::Arith { op, left, right } => {
            let (Some(l), Some(r)) = (
                evaluate(left, scopes)?.as_f64(),
                evaluate(right, scopes)?.as_f64(),
            ) else {
                return Ok(Value::Null);
            };
            Ok(Value::Float(match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
            }))
        }
        Expr::Compare { op, left, right } => {
            let (Some(l), Some(r)) = (
                evaluate(left, scopes)?.as_f64(),
                evaluate(right, scopes)?.as_f64(),
            ) else {
                return Ok(Value::Null);
            };
            Ok(Value::Bool(match op {
                CompareOp::Lt => l < r,
                CompareOp::LtEq => l <= r,
                CompareOp::Gt => l > r,
                CompareOp::GtEq => l >= r,
                CompareOp::Eq => l == r,
            }))
        }
        Expr::Bool { op, args } => {
            let mut saw_null = false;
            match op {
                BoolOp::Not => {
                    let v = match args.first() {
                        Some(arg) => evaluate(arg, scopes)?,
                        None => Value::Null,
                    };
                    Ok(v.as_bool().map_or(Value::Null, |b| Value::Bool(!b)))
                }
                BoolOp::And | BoolOp::Or => {
                    let short = *op == BoolOp::Or;
                    for arg in args {
                        match evaluate(arg, scopes)?.as_bool() {
                            Some(b) if b == short => return Ok(Value::Bool(short)),
                            Some(_) => {}
                            None => saw_null = true,
                        }
                    }
                    Ok(if saw_null { Value::Null } else { Value::Bool(!short) })
                }
            }
        }
    }
}

/// Whether a predicate result selects the row.
pub(crate) fn is_true(v: Value) -> bool {
    v.as_bool() == Some(true)
}

fn float(func: Function, v: Value) -> Result<f64> {
    v.as_f64().ok_or_else(|| SpatialError::TypeMismatch {
        context: format!("argument of {}", func),
        expected: "double precision",
        found: v.value_type().name(),
    })
}

fn geography(func: Function, v: Value) -> Result<LonLat> {
    v.as_geography().ok_or_else(|| SpatialError::TypeMismatch {
        context: format!("argument of {}", func),
        expected: "geography",
        found: v.value_type().name(),
    })
}

fn arity(func: Function, args: &[Value]) -> Result<()> {
    if func.arity().accepts(args.len()) {
        Ok(())
    } else {
        Err(SpatialError::Arity {
            function: func.name(),
            expected: func.expected_args(),
            found: args.len(),
        })
    }
}

/// Separation in degrees, as returned by `q3c_dist`.
fn q3c_dist(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    separation_rad(ra1, dec1, ra2, dec2) * RAD_TO_DEG
}

/// Meters along the effective sphere, as returned by `ST_Distance(.., false)`.
fn geography_distance(a: LonLat, b: LonLat) -> f64 {
    separation_rad(a.lon, a.lat, b.lon, b.lat) * EFFECTIVE_EARTH_RADIUS_M
}

fn call(func: Function, args: &[Value]) -> Result<Value> {
    arity(func, args)?;
    let extremum = matches!(func, Function::Greatest | Function::Least);
    if !extremum && args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }

    let value = match func {
        Function::Cos => Value::Float(libm::cos(float(func, args[0])?)),
        Function::Sin => Value::Float(libm::sin(float(func, args[0])?)),
        Function::Acos => {
            let x = float(func, args[0])?;
            if !(-1.0..=1.0).contains(&x) {
                return Err(AstroError::math_error(
                    "acos",
                    MathErrorKind::OutOfRange,
                    &format!("input {} is out of range", x),
                )
                .into());
            }
            Value::Float(libm::acos(x))
        }
        Function::Q3cAng2Ipix => {
            let ra = float(func, args[0])?;
            let dec = float(func, args[1])?;
            if !ra.is_finite() || !(-90.0..=90.0).contains(&dec) {
                return Err(AstroError::math_error(
                    "q3c_ang2ipix",
                    MathErrorKind::OutOfRange,
                    &format!("({}, {}) is not a sky position", ra, dec),
                )
                .into());
            }
            Value::Int(ang2pix(ra, dec) as i64)
        }
        Function::Q3cDist => Value::Float(q3c_dist(
            float(func, args[0])?,
            float(func, args[1])?,
            float(func, args[2])?,
            float(func, args[3])?,
        )),
        Function::Q3cRadialQuery | Function::Q3cJoin => {
            let d = q3c_dist(
                float(func, args[0])?,
                float(func, args[1])?,
                float(func, args[2])?,
                float(func, args[3])?,
            );
            Value::Bool(d <= float(func, args[4])?)
        }
        Function::StX => Value::Float(geography(func, args[0])?.lon),
        Function::StY => Value::Float(geography(func, args[0])?.lat),
        Function::StMakePoint => Value::Geography(LonLat::new(
            float(func, args[0])?,
            float(func, args[1])?,
        )),
        Function::StSetSrid => {
            let point = geography(func, args[0])?;
            match args[1] {
                Value::Int(SRID_WGS84) => Value::Geography(point),
                other => {
                    return Err(AstroError::math_error(
                        "ST_SetSRID",
                        MathErrorKind::InvalidInput,
                        &format!("unsupported SRID {:?}, only {} is modelled", other, SRID_WGS84),
                    )
                    .into())
                }
            }
        }
        Function::Geography => Value::Geography(geography(func, args[0])?),
        Function::StDistance => Value::Float(geography_distance(
            geography(func, args[0])?,
            geography(func, args[1])?,
        )),
        Function::StDWithin => {
            let d = geography_distance(geography(func, args[0])?, geography(func, args[1])?);
            Value::Bool(d <= float(func, args[2])?)
        }
        Function::Greatest | Function::Least => {
            let mut best: Option<f64> = None;
            for v in args.iter().filter(|v| !v.is_null()) {
                let x = float(func, *v)?;
                best = Some(match best {
                    None => x,
                    Some(b) if func == Function::Greatest => b.max(x),
                    Some(b) => b.min(x),
                });
            }
            best.map_or(Value::Null, Value::Float)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(e: &Expr) -> Value {
        evaluate_constant(e).unwrap()
    }

    #[test]
    fn test_null_propagation() {
        let null = Expr::Literal(Value::Null);
        assert_eq!(eval(&(null.clone() + 1.0)), Value::Null);
        assert_eq!(eval(&null.clone().lt_eq(1.0)), Value::Null);
        assert_eq!(eval(&Expr::call(Function::Cos, vec![null.clone()])), Value::Null);
        assert_eq!(
            eval(&Expr::call(Function::Greatest, vec![null.clone(), Expr::lit(2.0), Expr::lit(-1.0)])),
            Value::Float(2.0)
        );
        assert_eq!(eval(&Expr::call(Function::Least, vec![null])), Value::Null);
    }

    #[test]
    fn test_three_valued_logic() {
        let null = Expr::Literal(Value::Null);
        let t = Expr::boolean(true);
        let f = Expr::boolean(false);
        assert_eq!(eval(&t.clone().and(null.clone())), Value::Null);
        assert_eq!(eval(&f.clone().and(null.clone())), Value::Bool(false));
        let or = Expr::Bool {
            op: BoolOp::Or,
            args: vec![null.clone(), t.clone()],
        };
        assert_eq!(eval(&or), Value::Bool(true));
        assert_eq!(eval(&null.not()), Value::Null);
        assert_eq!(eval(&f.not()), Value::Bool(true));
        assert!(!is_true(Value::Null));
    }

    #[test]
    fn test_acos_domain_enforced() {
        let e = Expr::call(Function::Acos, vec![Expr::lit(1.0000000000000002)]);
        assert!(matches!(evaluate_constant(&e), Err(SpatialError::Core(_))));
        let e = Expr::call(Function::Acos, vec![Expr::lit(1.0)]);
        assert_eq!(eval(&e), Value::Float(0.0));
    }

    #[test]
    fn test_q3c_functions() {
        let dist = Expr::call(
            Function::Q3cDist,
            vec![Expr::lit(10.0), Expr::lit(0.0), Expr::lit(10.0), Expr::lit(0.01)],
        );
        let d = eval(&dist).as_f64().unwrap();
        assert!((d * 3600.0 - 36.0).abs() < 1e-9, "{}", d);

        let within = |r: f64| {
            Expr::call(
                Function::Q3cRadialQuery,
                vec![Expr::lit(10.0), Expr::lit(0.0), Expr::lit(10.0), Expr::lit(0.01), Expr::lit(r / 3600.0)],
            )
        };
        assert_eq!(eval(&within(40.0)), Value::Bool(true));
        assert_eq!(eval(&within(30.0)), Value::Bool(false));

        let ipix = Expr::call(Function::Q3cAng2Ipix, vec![Expr::lit(10.0), Expr::lit(95.0)]);
        assert!(evaluate_constant(&ipix).is_err());
    }

    #[test]
    fn test_geography_functions() {
        let point = |lon: f64, lat: f64| {
            Expr::call(
                Function::Geography,
                vec![Expr::call(
                    Function::StSetSrid,
                    vec![Expr::call(Function::StMakePoint, vec![Expr::lit(lon), Expr::lit(lat)]), Expr::int(4326)],
                )],
            )
        };
        assert_eq!(eval(&Expr::call(Function::StX, vec![point(-170.0, 3.0)])), Value::Float(-170.0));
        assert_eq!(eval(&Expr::call(Function::StY, vec![point(-170.0, 3.0)])), Value::Float(3.0));

        let meters = eval(&Expr::call(
            Function::StDistance,
            vec![point(0.0, 0.0), point(0.0, 1.0), Expr::boolean(false)],
        ))
        .as_f64()
        .unwrap();
        assert!((meters - 111_195.08).abs() < 0.01, "{}", meters);

        let bad_srid = Expr::call(
            Function::StSetSrid,
            vec![Expr::call(Function::StMakePoint, vec![Expr::lit(0.0), Expr::lit(0.0)]), Expr::int(3857)],
        );
        assert!(evaluate_constant(&bad_srid).is_err());
    }

    #[test]
    fn test_arity_checked() {
        let e = Expr::call(Function::Cos, vec![Expr::lit(0.0), Expr::lit(1.0)]);
        assert!(matches!(
            evaluate_constant(&e),
            Err(SpatialError::Arity { function: "cos", expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_unbound_column() {
        let e = Expr::column("o", "ra", crate::expr::ColumnType::Float64);
        assert!(matches!(evaluate_constant(&e), Err(SpatialError::UnknownRelation(_))));
    }
}
