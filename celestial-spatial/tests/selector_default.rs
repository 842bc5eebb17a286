//! Nothing configured: the first use binds the unindexed strategy.
//! Every test in this binary shares that binding.

use approx::assert_abs_diff_eq;
use celestial_spatial::carrier::{Layout, Operand, SkyRecord, SpatialCarrier};
use celestial_spatial::selector;
use celestial_spatial::store::eval::evaluate_constant;
use celestial_spatial::strategy::{SpatialStrategy, StrategyKind};
use celestial_spatial::SpatialError;

#[test]
fn test_active_defaults_to_unindexed() {
    assert_eq!(selector::active().kind(), StrategyKind::Unindexed);
    assert_eq!(selector::bound(), Some(StrategyKind::Unindexed));
}

#[test]
fn test_rebind_to_other_kind_rejected() {
    selector::active();
    match selector::bind(StrategyKind::PixelIndex) {
        Err(SpatialError::StrategyRebind { bound, requested }) => {
            assert_eq!(bound, StrategyKind::Unindexed);
            assert_eq!(requested, StrategyKind::PixelIndex);
        }
        other => panic!("expected rebind error, got {:?}", other.map(|s| s.kind())),
    }
    assert_eq!(selector::bind(StrategyKind::Unindexed).unwrap().kind(), StrategyKind::Unindexed);
}

#[test]
fn test_carrier_predicates_use_active_strategy() {
    let star = SkyRecord::at("a", Layout::Columns, 10.0, 0.0);
    let target = Operand::point(10.0, 0.01).unwrap();

    let via_carrier = star.distance(&target).unwrap();
    let direct = StrategyKind::Unindexed
        .strategy()
        .distance(&star.operand().unwrap(), &target)
        .unwrap();
    assert_eq!(via_carrier, direct);

    let d = evaluate_constant(&via_carrier).unwrap().as_f64().unwrap();
    assert_abs_diff_eq!(d, 36.0, epsilon = 1e-6);
    assert_eq!(
        evaluate_constant(&star.radially_within(&target, 40.0).unwrap())
            .unwrap()
            .as_bool(),
        Some(true)
    );
}

#[test]
fn test_unresolved_carrier_rejected() {
    let mut star = SkyRecord::new("b", Layout::Columns);
    star.set_dec(5.0);
    let target = Operand::point(0.0, 0.0).unwrap();
    assert!(matches!(star.distance(&target), Err(SpatialError::UnresolvedPosition)));
    assert!(matches!(
        star.radially_within(&target, 1.0),
        Err(SpatialError::UnresolvedPosition)
    ));
}
