use crate::{
    error::MetabolismError,
    metabolite::{normalize_name, MetabolitePool},
};
use cellforge_schemas::{compartment::CompartmentKind, metabolite::SeedRegistry};

pub type SeedFactory = fn() -> SeedRegistry;

const DEFAULT_CAPACITY: f64 = 1000.0;

/// Default seed factory for every compartment kind the engine knows.
static REGISTRY: [(CompartmentKind, SeedFactory); 2] = [
    (CompartmentKind::Cytoplasm, cytoplasm_seed),
    (CompartmentKind::Mitochondrion, mitochondrion_seed),
];

pub fn registered_kinds() -> impl Iterator<Item = CompartmentKind> {
    REGISTRY.iter().map(|(kind, _)| *kind)
}

pub fn default_seed(kind: CompartmentKind) -> SeedRegistry {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == kind)
        .map(|(_, factory)| factory())
        .unwrap_or_default()
}

pub fn default_seed_for_tag(tag: &str) -> Result<SeedRegistry, MetabolismError> {
    let kind = tag.parse::<CompartmentKind>().map_err(MetabolismError::ConfigError)?;
    Ok(default_seed(kind))
}

/// Builds the pool for `kind`, overlaying `overrides` on the default seed.
pub fn build_pool(
    kind: CompartmentKind,
    overrides: Option<&SeedRegistry>,
) -> Result<MetabolitePool, MetabolismError> {
    let mut seed = default_seed(kind);
    if let Some(overrides) = overrides {
        let normalized = SeedRegistry {
            metabolites: overrides
                .iter()
                .map(|(name, entry)| (normalize_name(name), entry.clone()))
                .collect(),
        };
        seed = seed.merged(&normalized);
    }
    MetabolitePool::from_seed(kind.as_str(), &seed)
}

pub fn cytoplasm_seed() -> SeedRegistry {
    SeedRegistry::from_pairs(&[
        ("glucose", 0.0, DEFAULT_CAPACITY),
        ("atp", 100.0, DEFAULT_CAPACITY),
        ("adp", 100.0, DEFAULT_CAPACITY),
        ("amp", 0.0, DEFAULT_CAPACITY),
        ("nad", 100.0, DEFAULT_CAPACITY),
        ("nadh", 0.0, DEFAULT_CAPACITY),
        ("pyruvate", 0.0, DEFAULT_CAPACITY),
    ])
}

pub fn mitochondrion_seed() -> SeedRegistry {
    SeedRegistry::from_pairs(&[
        ("pyruvate", 0.0, DEFAULT_CAPACITY),
        ("acetyl_coa", 0.0, DEFAULT_CAPACITY),
        ("coa", 100.0, DEFAULT_CAPACITY),
        ("oxaloacetate", 10.0, DEFAULT_CAPACITY),
        ("citrate", 0.0, DEFAULT_CAPACITY),
        ("isocitrate", 0.0, DEFAULT_CAPACITY),
        ("alpha_ketoglutarate", 0.0, DEFAULT_CAPACITY),
        ("succinyl_coa", 0.0, DEFAULT_CAPACITY),
        ("succinate", 0.0, DEFAULT_CAPACITY),
        ("fumarate", 0.0, DEFAULT_CAPACITY),
        ("malate", 0.0, DEFAULT_CAPACITY),
        ("nad", 100.0, DEFAULT_CAPACITY),
        ("nadh", 0.0, DEFAULT_CAPACITY),
        ("fad", 100.0, DEFAULT_CAPACITY),
        ("fadh2", 0.0, DEFAULT_CAPACITY),
        ("gdp", 100.0, DEFAULT_CAPACITY),
        ("gtp", 0.0, DEFAULT_CAPACITY),
        ("atp", 0.0, DEFAULT_CAPACITY),
        ("adp", 100.0, DEFAULT_CAPACITY),
        ("amp", 0.0, DEFAULT_CAPACITY),
        ("oxygen", 1000.0, DEFAULT_CAPACITY),
        ("ubiquinone", 100.0, DEFAULT_CAPACITY),
        ("ubiquinol", 0.0, DEFAULT_CAPACITY),
        ("cytochrome_c_oxidized", 100.0, DEFAULT_CAPACITY),
        ("cytochrome_c_reduced", 0.0, DEFAULT_CAPACITY),
        ("co2", 0.0, 1_000_000.0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_seed() {
        for kind in registered_kinds() {
            assert!(!default_seed(kind).is_empty(), "{} has no seed", kind);
        }
        assert_eq!(registered_kinds().count(), CompartmentKind::ALL.len());
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = SeedRegistry::new().with("oxygen", 5.0, 10.0);
        let pool = build_pool(CompartmentKind::Mitochondrion, Some(&overrides)).unwrap();
        assert_eq!(pool.quantity("oxygen").unwrap(), 5.0);
        assert_eq!(pool.metabolite("oxygen").unwrap().max_quantity(), 10.0);
        assert_eq!(pool.quantity("coa").unwrap(), 100.0);
    }

    #[test]
    fn unknown_tag_is_a_config_error() {
        assert!(default_seed_for_tag("Mitochondria").is_ok());
        assert!(matches!(
            default_seed_for_tag("nucleus"),
            Err(MetabolismError::ConfigError(_))
        ));
    }
}
