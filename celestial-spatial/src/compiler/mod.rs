//! Lowering predicate trees for a query engine.
//!
//! | Compiler | Output |
//! |----------|--------|
//! | [`SqlCompiler`] | PostgreSQL text, plus DDL for extensions, columns and indexes |
//! | [`SqlCompiler::render_binary`] | the same text with geography literals bound as EWKB ([`BoundSql`]) |
//! | [`MemoryStore`](crate::store::MemoryStore) | a validated [`CompiledPredicate`](crate::store::CompiledPredicate) |

mod sql;

pub use sql::{BoundSql, SqlCompiler};

use crate::error::Result;
use crate::expr::Expr;

pub trait PredicateCompiler {
    type Output;

    fn compile(&self, expr: &Expr) -> Result<Self::Output>;
}
