//! Process-wide strategy binding.
//!
//! A deployment stores positions in exactly one layout, so the strategy is
//! bound once and never changes. The first [`bind`] wins; a later bind of the
//! same kind is a no-op and a different kind is an error. [`active`] binds the
//! default if nothing was bound yet.

use std::sync::OnceLock;

use tracing::info;

use crate::config::SpatialConfig;
use crate::error::{Result, SpatialError};
use crate::strategy::{SpatialStrategy, StrategyKind};

static ACTIVE: OnceLock<StrategyKind> = OnceLock::new();

pub fn bind(kind: StrategyKind) -> Result<&'static dyn SpatialStrategy> {
    let mut fresh = false;
    let bound = *ACTIVE.get_or_init(|| {
        fresh = true;
        kind
    });
    if bound != kind {
        return Err(SpatialError::StrategyRebind {
            bound,
            requested: kind,
        });
    }
    if fresh {
        info!(strategy = %kind, "spatial strategy bound");
    }
    Ok(bound.strategy())
}

pub fn bind_config(config: &SpatialConfig) -> Result<&'static dyn SpatialStrategy> {
    bind(config.strategy_kind())
}

/// The bound kind, if any, without binding.
pub fn bound() -> Option<StrategyKind> {
    ACTIVE.get().copied()
}

pub fn active() -> &'static dyn SpatialStrategy {
    ACTIVE
        .get_or_init(|| {
            info!(strategy = %StrategyKind::default(), "no spatial strategy configured, using default");
            StrategyKind::default()
        })
        .strategy()
}
