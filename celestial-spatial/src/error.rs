use celestial_core::AstroError;
use thiserror::Error;

use crate::store::Extension;
use crate::strategy::StrategyKind;

#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("invalid target for {operation} under the {strategy} strategy: {reason}")]
    InvalidTarget {
        operation: &'static str,
        strategy: StrategyKind,
        reason: String,
    },

    #[error("invalid radius {radius_arcsec} arcsec: must be finite and non-negative")]
    InvalidRadius { radius_arcsec: f64 },

    #[error("carrier position is unresolved: both ra and dec must be set before it can be compared")]
    UnresolvedPosition,

    #[error("spatial strategy already bound to {bound}, cannot rebind to {requested}")]
    StrategyRebind {
        bound: StrategyKind,
        requested: StrategyKind,
    },

    #[error("extension {extension} is not installed in the record store (needed by {needed_by})")]
    MissingExtension {
        extension: Extension,
        needed_by: String,
    },

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("table already exists: {0}")]
    DuplicateTable(String),

    #[error("relation {0} is not bound in this query")]
    UnknownRelation(String),

    #[error("alias {0} is bound to both sides of a join")]
    AmbiguousRelation(String),

    #[error("unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{function} takes {expected} arguments, got {found}")]
    Arity {
        function: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid WKT point {0:?}")]
    Wkt(String),

    #[error("invalid WKB point: {0}")]
    Wkb(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] AstroError),
}

pub type Result<T> = std::result::Result<T, SpatialError>;
