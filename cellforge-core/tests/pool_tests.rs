//! Integration tests for metabolite pool bookkeeping.
//!
//! Every mutating operation must either apply in full or leave the pool
//! exactly as it was.

use cellforge_core::{MetabolismError, MetabolitePool};
use cellforge_schemas::metabolite::SeedRegistry;

fn create_pool() -> MetabolitePool {
    let seed = SeedRegistry::from_pairs(&[
        ("glucose", 10.0, 100.0),
        ("atp", 50.0, 100.0),
        ("adp", 20.0, 100.0),
        ("pyruvate", 95.0, 100.0),
    ]);
    MetabolitePool::from_seed("cytoplasm", &seed).unwrap()
}

#[test]
fn test_consume_is_all_or_nothing() {
    let mut pool = create_pool();
    let before = pool.clone();

    let err = pool
        .consume([("glucose", 5.0), ("atp", 500.0)])
        .unwrap_err();
    assert!(matches!(err, MetabolismError::InsufficientMetabolite { ref name, .. } if name == "atp"));
    assert_eq!(pool, before);

    pool.consume([("glucose", 5.0), ("atp", 10.0)]).unwrap();
    assert_eq!(pool.quantity("glucose").unwrap(), 5.0);
    assert_eq!(pool.quantity("atp").unwrap(), 40.0);
}

#[test]
fn test_produce_is_all_or_nothing() {
    let mut pool = create_pool();
    let before = pool.clone();

    let err = pool.produce([("adp", 1.0), ("pyruvate", 10.0)]).unwrap_err();
    assert!(matches!(err, MetabolismError::QuantityOutOfRange { .. }));
    assert_eq!(pool, before);
}

#[test]
fn test_unknown_metabolite_leaves_pool_unchanged() {
    let mut pool = create_pool();
    let before = pool.clone();

    let err = pool.consume([("glucose", 1.0), ("lactate", 1.0)]).unwrap_err();
    assert!(matches!(err, MetabolismError::UnknownMetabolite(ref name) if name == "lactate"));
    assert_eq!(pool, before);
    assert!(pool.quantity("lactate").is_err());
}

#[test]
fn test_negative_amounts_are_rejected() {
    let mut pool = create_pool();
    let before = pool.clone();

    assert!(matches!(
        pool.consume([("glucose", -1.0)]),
        Err(MetabolismError::InvalidAmount { .. })
    ));
    assert!(matches!(
        pool.produce([("glucose", f64::NAN)]),
        Err(MetabolismError::InvalidAmount { .. })
    ));
    assert!(matches!(
        pool.register("lactate", -3.0, 10.0),
        Err(MetabolismError::InvalidAmount { .. })
    ));
    assert_eq!(pool, before);
}

#[test]
fn test_availability_checks() {
    let pool = create_pool();
    assert!(pool.is_available("glucose", 10.0).unwrap());
    assert!(!pool.is_available("glucose", 10.5).unwrap());
    assert!(pool.is_available("nad", 1.0).is_err());
}

#[test]
fn test_register_all_is_atomic() {
    let mut pool = create_pool();
    let before = pool.clone();
    let bad = SeedRegistry::new()
        .with("lactate", 1.0, 10.0)
        .with("nad", 20.0, 10.0);

    assert!(pool.register_all(&bad).is_err());
    assert_eq!(pool, before);

    let good = SeedRegistry::new().with("lactate", 1.0, 10.0).with("atp", 60.0, 100.0);
    pool.register_all(&good).unwrap();
    assert_eq!(pool.quantity("lactate").unwrap(), 1.0);
    assert_eq!(pool.quantity("atp").unwrap(), 100.0);
}

#[test]
fn test_validate_all_and_reset() {
    let mut pool = create_pool();
    pool.validate_all().unwrap();

    pool.consume([("glucose", 10.0)]).unwrap();
    pool.register("lactate", 2.0, 10.0).unwrap();
    pool.reset().unwrap();

    assert_eq!(pool.quantity("glucose").unwrap(), 10.0);
    assert!(!pool.contains("lactate"));
    assert_eq!(pool.len(), 4);
}

#[test]
fn test_floor_is_respected() {
    let mut seed = SeedRegistry::new().with("nad", 10.0, 100.0);
    if let Some(entry) = seed.metabolites.get_mut("nad") {
        entry.min_quantity = 4.0;
    }
    let mut pool = MetabolitePool::from_seed("mitochondrion", &seed).unwrap();

    assert_eq!(pool.available("nad").unwrap(), 6.0);
    assert!(pool.consume([("nad", 7.0)]).is_err());
    pool.consume([("nad", 6.0)]).unwrap();
    assert_eq!(pool.quantity("nad").unwrap(), 4.0);
}
