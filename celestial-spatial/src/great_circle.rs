//! Great-circle distance as an expression tree.
//!
//! [`angular_distance_expr`] emits exactly the arithmetic of
//! [`celestial_core::math::angular_distance`], so an engine evaluating the
//! tree with IEEE doubles reproduces the numeric function bit for bit.

use celestial_core::constants::{ARCSEC_TO_RAD, DEG_TO_RAD};

use crate::expr::{Expr, Function};

pub use celestial_core::math::angular_distance;

fn func(f: Function, arg: Expr) -> Expr {
    Expr::call(f, vec![arg])
}

/// Separation in arcseconds between two (ra, dec) pairs of degree-valued expressions.
///
/// The cosine is clamped with `greatest(…, -1)` and `least(…, 1)` before `acos`.
pub fn angular_distance_expr(ra1: Expr, dec1: Expr, ra2: Expr, dec2: Expr) -> Expr {
    let theta1 = (Expr::lit(90.0) - dec1) * DEG_TO_RAD;
    let theta2 = (Expr::lit(90.0) - dec2) * DEG_TO_RAD;
    let cos_delta_ra = func(Function::Cos, (ra1 - ra2) * DEG_TO_RAD);

    let cosine = func(Function::Cos, theta1.clone() - theta2.clone())
        - func(Function::Sin, theta1) * func(Function::Sin, theta2) * (Expr::lit(1.0) - cos_delta_ra);

    let clamped = Expr::call(
        Function::Least,
        vec![Expr::call(Function::Greatest, vec![cosine, Expr::lit(-1.0)]), Expr::lit(1.0)],
    );
    func(Function::Acos, clamped) / ARCSEC_TO_RAD
}
