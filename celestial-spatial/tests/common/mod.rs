#![allow(dead_code)]

use celestial_core::constants::ARCSEC_TO_RAD;
use celestial_core::math::separation_rad;
use celestial_spatial::carrier::SkyRecord;
use celestial_spatial::store::{Extension, MemoryStore, RowId};
use celestial_spatial::strategy::{SpatialStrategy, StrategyKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const TABLE: &str = "objects";

/// Uniform points over the whole sphere.
pub fn sphere_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let ra = rng.random_range(0.0..360.0);
            let z: f64 = rng.random_range(-1.0..1.0);
            (ra, z.asin().to_degrees())
        })
        .collect()
}

/// Dense points in two awkward places: a patch straddling ra = 0 on the
/// equator and a cap around the north pole.
pub fn clustered_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            if i % 10 < 7 {
                let ra: f64 = rng.random_range(359.0..361.0);
                (ra.rem_euclid(360.0), rng.random_range(-1.0..1.0))
            } else {
                (rng.random_range(0.0..360.0), rng.random_range(89.5..=90.0))
            }
        })
        .collect()
}

/// Random points mixed with the edges of the coordinate domain: both poles,
/// ra = 0 and ra just below 360.
pub fn edge_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    const EDGES: [(f64, f64); 8] = [
        (0.0, 90.0),
        (123.0, 90.0),
        (0.0, -90.0),
        (271.0, -90.0),
        (0.0, 0.0),
        (359.999_999_9, 0.0),
        (360.0 - 1e-12, 45.0),
        (0.0, -89.999_999),
    ];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| match i % 4 {
            0 => EDGES[rng.random_range(0..EDGES.len())],
            1 => (rng.random_range(0.0..360.0), rng.random_range(-90.0..=90.0)),
            2 => {
                let ra: f64 = rng.random_range(-0.5..0.5);
                (ra.rem_euclid(360.0), rng.random_range(-90.0..=90.0))
            }
            _ => (rng.random_range(0.0..360.0), rng.random_range(89.9..=90.0)),
        })
        .collect()
}

/// Store with every extension installed and `objects` created for `kind`,
/// with or without the strategy's indexes.
pub fn store_for(kind: StrategyKind, indexed: bool) -> MemoryStore {
    let strategy = kind.strategy();
    let mut store = MemoryStore::new();
    store.install_extension(Extension::Q3c);
    store.install_extension(Extension::PostGis);
    if indexed {
        store.create_carrier_table(strategy, TABLE).unwrap();
    } else {
        store.create_table(TABLE, &strategy.columns()).unwrap();
    }
    store
}

/// Loads points and returns their row ids in the same order.
pub fn load(store: &mut MemoryStore, kind: StrategyKind, points: &[(f64, f64)]) -> Vec<RowId> {
    let layout = kind.strategy().layout();
    points
        .iter()
        .enumerate()
        .map(|(i, &(ra, dec))| store.insert(TABLE, &SkyRecord::at(i, layout, ra, dec)).unwrap())
        .collect()
}

/// Independent separation in arcseconds.
pub fn truth_arcsec(a: (f64, f64), b: (f64, f64)) -> f64 {
    separation_rad(a.0, a.1, b.0, b.1) / ARCSEC_TO_RAD
}

/// `|a - b| <= atol + rtol * |b|`
pub fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-8 + 1e-5 * expected.abs()
}
