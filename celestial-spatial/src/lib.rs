//! Angular-distance and radial-containment predicates for sky catalogs.
//!
//! Records with a right ascension and declination ("carriers") can be
//! compared by great-circle distance, either against a fixed point (a filter)
//! or against another table of carriers (a join). The comparison is built as
//! a backend-neutral expression by one of three interchangeable strategies,
//! then lowered for a query engine by a [`PredicateCompiler`]:
//!
//! | Strategy | Stores | Accelerated by |
//! |----------|--------|----------------|
//! | unindexed | `ra`, `dec` | nothing: trigonometry per row |
//! | hierarchical pixel index | `ra`, `dec` | `q3c_ang2ipix` functional index |
//! | geodesic index | packed `radec` geography | SP-GiST index on `radec` |
//!
//! All three give the same answers; which one runs is chosen once per process
//! by [`selector`] from a [`SpatialConfig`].
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`carrier`] | [`SpatialCarrier`] trait, [`SkyRecord`], [`Relation`], [`Operand`] |
//! | [`geography`] | [`PackedPoint`] state machine for packed lon/lat storage |
//! | [`great_circle`] | Clamped law-of-cosines distance as an expression tree |
//! | [`expr`] | The predicate AST |
//! | [`strategy`] | [`SpatialStrategy`] and its three implementations |
//! | [`config`] / [`selector`] | Strategy configuration and process-wide binding |
//! | [`compiler`] | [`PredicateCompiler`] trait, [`SqlCompiler`] |
//! | [`store`] | [`MemoryStore`], an in-memory engine that executes predicates |
//!
//! # Quick Start
//!
//! ```
//! use celestial_spatial::{Operand, PredicateCompiler, SpatialStrategy, SqlCompiler, StrategyKind};
//!
//! let strategy = StrategyKind::PixelIndex.strategy();
//! let objects = strategy.relation("objects");
//! let target = Operand::point(83.633, -5.375)?;
//!
//! let predicate = strategy.radially_within(&objects.into(), &target, 36.0)?;
//! assert_eq!(
//!     SqlCompiler.compile(&predicate)?,
//!     "q3c_radial_query(83.633, -5.375, objects.ra, objects.dec, 0.01)"
//! );
//! # Ok::<(), celestial_spatial::SpatialError>(())
//! ```

pub mod carrier;
pub mod compiler;
pub mod config;
pub mod error;
pub mod expr;
pub mod geography;
pub mod great_circle;
pub mod selector;
pub mod store;
pub mod strategy;

pub use carrier::{Layout, Operand, Relation, SkyPoint, SkyRecord, SpatialCarrier, StoredPosition};
pub use compiler::{BoundSql, PredicateCompiler, SqlCompiler};
pub use config::SpatialConfig;
pub use error::{Result, SpatialError};
pub use expr::{Expr, Value};
pub use geography::PackedPoint;
pub use great_circle::{angular_distance, angular_distance_expr};
pub use store::{CompiledPredicate, Extension, MemoryStore};
pub use strategy::{SpatialStrategy, StrategyKind};
