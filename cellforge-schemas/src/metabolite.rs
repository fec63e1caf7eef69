use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_unit() -> String {
    "mM".to_string()
}

/// Initial state for one metabolite as it appears in a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaboliteSeed {
    pub quantity: f64,
    pub max_quantity: f64,
    #[serde(default)]
    pub min_quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl MetaboliteSeed {
    pub fn new(quantity: f64, max_quantity: f64) -> Self {
        Self {
            quantity,
            max_quantity,
            min_quantity: 0.0,
            unit: default_unit(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Named seeds for every metabolite a compartment starts with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedRegistry {
    pub metabolites: BTreeMap<String, MetaboliteSeed>,
}

impl SeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, f64, f64)]) -> Self {
        pairs
            .iter()
            .fold(Self::new(), |registry, (name, quantity, max)| {
                registry.with(name, *quantity, *max)
            })
    }

    pub fn with(mut self, name: &str, quantity: f64, max_quantity: f64) -> Self {
        self.metabolites
            .insert(name.to_string(), MetaboliteSeed::new(quantity, max_quantity));
        self
    }

    /// Overlays `other` on top of `self`; entries in `other` win.
    pub fn merged(mut self, other: &SeedRegistry) -> Self {
        for (name, seed) in &other.metabolites {
            self.metabolites.insert(name.clone(), seed.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&MetaboliteSeed> {
        self.metabolites.get(name)
    }

    pub fn len(&self) -> usize {
        self.metabolites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metabolites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaboliteSeed)> {
        self.metabolites.iter()
    }
}
