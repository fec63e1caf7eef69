use crate::error::MetabolismError;
use cellforge_schemas::metabolite::{MetaboliteSeed, SeedRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantities of a pool keyed by normalized name.
pub type PoolSnapshot = BTreeMap<String, f64>;

/// Metabolite names are case-insensitive; they are stored lowercase.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metabolite {
    name: String,
    quantity: f64,
    min_quantity: f64,
    max_quantity: f64,
    pub unit: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Metabolite {
    pub fn new(name: &str, quantity: f64, max_quantity: f64) -> Result<Self, MetabolismError> {
        Self::with_bounds(name, quantity, 0.0, max_quantity)
    }

    pub fn with_bounds(
        name: &str,
        quantity: f64,
        min_quantity: f64,
        max_quantity: f64,
    ) -> Result<Self, MetabolismError> {
        let name = normalize_name(name);
        let invalid = |reason: String| MetabolismError::InvalidSeed {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if !(quantity.is_finite() && min_quantity.is_finite() && max_quantity.is_finite()) {
            return Err(invalid("bounds and quantity must be finite".to_string()));
        }
        if min_quantity < 0.0 || min_quantity > max_quantity {
            return Err(invalid(format!(
                "bounds [{}, {}] are not ordered or are negative",
                min_quantity, max_quantity
            )));
        }
        if quantity < min_quantity || quantity > max_quantity {
            return Err(invalid(format!(
                "quantity {} lies outside [{}, {}]",
                quantity, min_quantity, max_quantity
            )));
        }

        Ok(Self {
            name,
            quantity,
            min_quantity,
            max_quantity,
            unit: "mM".to_string(),
            metadata: BTreeMap::new(),
        })
    }

    pub fn from_seed(name: &str, seed: &MetaboliteSeed) -> Result<Self, MetabolismError> {
        let mut metabolite =
            Self::with_bounds(name, seed.quantity, seed.min_quantity, seed.max_quantity)?;
        metabolite.unit = seed.unit.clone();
        metabolite.metadata = seed.metadata.clone();
        Ok(metabolite)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn min_quantity(&self) -> f64 {
        self.min_quantity
    }

    pub fn max_quantity(&self) -> f64 {
        self.max_quantity
    }

    /// Amount that can be removed before hitting the floor.
    pub fn available(&self) -> f64 {
        self.quantity - self.min_quantity
    }

    /// Amount that can be added before hitting the ceiling.
    pub fn headroom(&self) -> f64 {
        self.max_quantity - self.quantity
    }

    pub fn percentage_filled(&self) -> f64 {
        if self.max_quantity <= 0.0 {
            return 0.0;
        }
        self.quantity / self.max_quantity * 100.0
    }

    /// Empties the metabolite down to its floor.
    pub fn reset(&mut self) {
        self.quantity = self.min_quantity;
    }

    fn checked_target(&self, delta: f64) -> Result<f64, MetabolismError> {
        let attempted = self.quantity + delta;
        if attempted < self.min_quantity || attempted > self.max_quantity {
            return Err(MetabolismError::QuantityOutOfRange {
                name: self.name.clone(),
                attempted,
                min: self.min_quantity,
                max: self.max_quantity,
            });
        }
        Ok(attempted)
    }
}

/// All metabolites of one compartment, keyed by normalized name.
///
/// Every mutating operation either applies completely or leaves the pool
/// exactly as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetabolitePool {
    compartment: String,
    metabolites: BTreeMap<String, Metabolite>,
    seed: SeedRegistry,
}

impl MetabolitePool {
    pub fn new(compartment: &str) -> Self {
        Self {
            compartment: compartment.to_string(),
            ..Self::default()
        }
    }

    /// Builds a pool from a seed registry. The registry is remembered so that
    /// `reset` can restore it later.
    pub fn from_seed(compartment: &str, seed: &SeedRegistry) -> Result<Self, MetabolismError> {
        let mut pool = Self::new(compartment);
        pool.load_seed(seed)?;
        pool.seed = seed.clone();
        Ok(pool)
    }

    fn load_seed(&mut self, seed: &SeedRegistry) -> Result<(), MetabolismError> {
        let mut metabolites = BTreeMap::new();
        for (name, entry) in seed.iter() {
            let metabolite = Metabolite::from_seed(name, entry)?;
            metabolites.insert(metabolite.name.clone(), metabolite);
        }
        self.metabolites = metabolites;
        Ok(())
    }

    pub fn compartment(&self) -> &str {
        &self.compartment
    }

    /// Adds a metabolite, or tops up an existing one.
    ///
    /// Topping up saturates at the existing maximum; the `max_quantity`
    /// argument only applies to new entries.
    pub fn register(
        &mut self,
        name: &str,
        quantity: f64,
        max_quantity: f64,
    ) -> Result<(), MetabolismError> {
        let key = normalize_name(name);
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(MetabolismError::InvalidAmount {
                name: key,
                amount: quantity,
            });
        }

        match self.metabolites.get_mut(&key) {
            Some(existing) => {
                existing.quantity = (existing.quantity + quantity).min(existing.max_quantity);
            }
            None => {
                let metabolite = Metabolite::new(&key, quantity, max_quantity)?;
                self.metabolites.insert(key, metabolite);
            }
        }
        Ok(())
    }

    /// Registers every entry of `seed`; nothing is registered if any entry is invalid.
    pub fn register_all(&mut self, seed: &SeedRegistry) -> Result<(), MetabolismError> {
        let mut staged = self.metabolites.clone();
        for (name, entry) in seed.iter() {
            let key = normalize_name(name);
            match staged.get_mut(&key) {
                Some(existing) => {
                    existing.quantity = (existing.quantity + entry.quantity).min(existing.max_quantity);
                }
                None => {
                    let metabolite = Metabolite::from_seed(&key, entry)?;
                    staged.insert(key, metabolite);
                }
            }
        }
        self.metabolites = staged;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metabolites.contains_key(&normalize_name(name))
    }

    pub fn get(&self, name: &str) -> Option<&Metabolite> {
        self.metabolites.get(&normalize_name(name))
    }

    pub fn metabolite(&self, name: &str) -> Result<&Metabolite, MetabolismError> {
        self.get(name)
            .ok_or_else(|| MetabolismError::UnknownMetabolite(normalize_name(name)))
    }

    pub fn quantity(&self, name: &str) -> Result<f64, MetabolismError> {
        self.metabolite(name).map(Metabolite::quantity)
    }

    pub fn available(&self, name: &str) -> Result<f64, MetabolismError> {
        self.metabolite(name).map(Metabolite::available)
    }

    pub fn headroom(&self, name: &str) -> Result<f64, MetabolismError> {
        self.metabolite(name).map(Metabolite::headroom)
    }

    /// Whether `amount` can be consumed without dropping below the floor.
    pub fn is_available(&self, name: &str, amount: f64) -> Result<bool, MetabolismError> {
        Ok(self.available(name)? >= amount)
    }

    pub fn change_quantity(&mut self, name: &str, delta: f64) -> Result<(), MetabolismError> {
        let key = normalize_name(name);
        if !delta.is_finite() {
            return Err(MetabolismError::InvalidAmount {
                name: key,
                amount: delta,
            });
        }
        let metabolite = self
            .metabolites
            .get_mut(&key)
            .ok_or(MetabolismError::UnknownMetabolite(key))?;
        metabolite.quantity = metabolite.checked_target(delta)?;
        Ok(())
    }

    /// Removes every listed amount, or nothing at all.
    pub fn consume<I, K>(&mut self, amounts: I) -> Result<(), MetabolismError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let staged = Self::merge_amounts(amounts)?;
        for (name, amount) in &staged {
            let metabolite = self.metabolite(name)?;
            if metabolite.available() < *amount {
                return Err(MetabolismError::InsufficientMetabolite {
                    name: name.clone(),
                    requested: *amount,
                    available: metabolite.available(),
                });
            }
        }
        self.apply(&staged, -1.0);
        Ok(())
    }

    /// Adds every listed amount, or nothing at all.
    pub fn produce<I, K>(&mut self, amounts: I) -> Result<(), MetabolismError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let staged = Self::merge_amounts(amounts)?;
        for (name, amount) in &staged {
            self.metabolite(name)?.checked_target(*amount)?;
        }
        self.apply(&staged, 1.0);
        Ok(())
    }

    /// Moves `amount` of one metabolite into another pool. Both sides are
    /// validated before either changes.
    pub fn transfer_to(
        &mut self,
        destination: &mut MetabolitePool,
        name: &str,
        amount: f64,
    ) -> Result<(), MetabolismError> {
        let key = normalize_name(name);
        if !amount.is_finite() || amount < 0.0 {
            return Err(MetabolismError::InvalidAmount { name: key, amount });
        }
        let source = self.metabolite(&key)?;
        if source.available() < amount {
            return Err(MetabolismError::InsufficientMetabolite {
                name: key,
                requested: amount,
                available: source.available(),
            });
        }
        destination.metabolite(&key)?.checked_target(amount)?;

        self.apply(&[(key.clone(), amount)], -1.0);
        destination.apply(&[(key, amount)], 1.0);
        Ok(())
    }

    fn merge_amounts<I, K>(amounts: I) -> Result<Vec<(String, f64)>, MetabolismError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut merged: BTreeMap<String, f64> = BTreeMap::new();
        for (name, amount) in amounts {
            let key = normalize_name(name.as_ref());
            if !amount.is_finite() || amount < 0.0 {
                return Err(MetabolismError::InvalidAmount { name: key, amount });
            }
            *merged.entry(key).or_insert(0.0) += amount;
        }
        Ok(merged.into_iter().collect())
    }

    fn apply(&mut self, staged: &[(String, f64)], sign: f64) {
        for (name, amount) in staged {
            if let Some(metabolite) = self.metabolites.get_mut(name) {
                metabolite.quantity += sign * amount;
            }
        }
    }

    /// Sum of the named quantities; unregistered names count as zero.
    pub fn total_of(&self, names: &[&str]) -> f64 {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .map(Metabolite::quantity)
            .sum()
    }

    pub fn quantities(&self) -> PoolSnapshot {
        self.metabolites
            .iter()
            .map(|(name, m)| (name.clone(), m.quantity))
            .collect()
    }

    pub fn validate_all(&self) -> Result<(), MetabolismError> {
        for metabolite in self.metabolites.values() {
            if metabolite.quantity < metabolite.min_quantity
                || metabolite.quantity > metabolite.max_quantity
            {
                return Err(MetabolismError::QuantityOutOfRange {
                    name: metabolite.name.clone(),
                    attempted: metabolite.quantity,
                    min: metabolite.min_quantity,
                    max: metabolite.max_quantity,
                });
            }
        }
        Ok(())
    }

    /// Rewinds quantities to a snapshot taken with `quantities`.
    ///
    /// Every name must be registered and every value within bounds, or the
    /// pool is left untouched. Metabolites absent from the snapshot keep
    /// their current quantity.
    pub fn restore(&mut self, snapshot: &PoolSnapshot) -> Result<(), MetabolismError> {
        for (name, quantity) in snapshot {
            let metabolite = self.metabolite(name)?;
            metabolite.checked_target(quantity - metabolite.quantity)?;
        }
        for (name, quantity) in snapshot {
            if let Some(metabolite) = self.metabolites.get_mut(&normalize_name(name)) {
                metabolite.quantity = *quantity;
            }
        }
        Ok(())
    }

    /// Restores the registry the pool was seeded with. Metabolites registered
    /// afterwards are dropped.
    pub fn reset(&mut self) -> Result<(), MetabolismError> {
        let seed = self.seed.clone();
        self.load_seed(&seed)
    }

    pub fn seed(&self) -> &SeedRegistry {
        &self.seed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    pub fn len(&self) -> usize {
        self.metabolites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metabolites.is_empty()
    }
}
