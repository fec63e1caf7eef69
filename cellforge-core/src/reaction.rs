use crate::{
    enzyme::Enzyme,
    error::MetabolismError,
    metabolite::{normalize_name, MetabolitePool},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metabolite name to stoichiometric coefficient.
pub type Stoichiometry = BTreeMap<String, f64>;

/// What one firing of a reaction actually moved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionOutcome {
    pub reaction: String,
    pub rate: f64,
    pub consumed: Stoichiometry,
    pub produced: Stoichiometry,
}

impl ReactionOutcome {
    pub fn consumed_of(&self, name: &str) -> f64 {
        self.consumed.get(name).copied().unwrap_or(0.0)
    }

    pub fn produced_of(&self, name: &str) -> f64 {
        self.produced.get(name).copied().unwrap_or(0.0)
    }

    /// Produced minus consumed for one metabolite.
    pub fn net(&self, name: &str) -> f64 {
        self.produced_of(name) - self.consumed_of(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub name: String,
    pub enzyme: Enzyme,
    pub consumes: Stoichiometry,
    pub produces: Stoichiometry,
    pub reversible: bool,
}

impl Reaction {
    pub fn new(name: &str, enzyme: Enzyme) -> Self {
        Self {
            name: normalize_name(name),
            enzyme,
            consumes: Stoichiometry::new(),
            produces: Stoichiometry::new(),
            reversible: false,
        }
    }

    pub fn consuming(mut self, metabolite: &str, coefficient: f64) -> Self {
        self.consumes.insert(normalize_name(metabolite), coefficient);
        self
    }

    pub fn producing(mut self, metabolite: &str, coefficient: f64) -> Self {
        self.produces.insert(normalize_name(metabolite), coefficient);
        self
    }

    pub fn reversible(mut self) -> Self {
        self.reversible = true;
        self
    }

    /// Every participant must be registered and every coefficient positive.
    pub fn check(&self, pool: &MetabolitePool) -> Result<(), MetabolismError> {
        for (name, coefficient) in self.consumes.iter().chain(self.produces.iter()) {
            if !coefficient.is_finite() || *coefficient <= 0.0 {
                return Err(MetabolismError::InvalidAmount {
                    name: name.clone(),
                    amount: *coefficient,
                });
            }
            if !pool.contains(name) {
                return Err(MetabolismError::UnknownMetabolite(name.clone()));
            }
        }
        Ok(())
    }

    /// Largest rate the substrates can sustain.
    pub fn supply_ceiling(&self, pool: &MetabolitePool) -> Result<f64, MetabolismError> {
        let mut ceiling = f64::INFINITY;
        for (name, coefficient) in &self.consumes {
            ceiling = ceiling.min(pool.available(name)? / coefficient);
        }
        Ok(ceiling.max(0.0))
    }

    /// Largest rate the products can absorb before reaching their maxima.
    pub fn product_ceiling(&self, pool: &MetabolitePool) -> Result<f64, MetabolismError> {
        let mut ceiling = f64::INFINITY;
        for (name, coefficient) in &self.produces {
            ceiling = ceiling.min(pool.headroom(name)? / coefficient);
        }
        Ok(ceiling.max(0.0))
    }

    /// Kinetic step: the enzyme rate over `time_step`, limited by supply and
    /// product capacity.
    pub fn execute(
        &self,
        pool: &mut MetabolitePool,
        time_step: f64,
    ) -> Result<ReactionOutcome, MetabolismError> {
        self.check(pool)?;
        if !time_step.is_finite() || time_step < 0.0 {
            return Err(MetabolismError::InvalidAmount {
                name: self.name.clone(),
                amount: time_step,
            });
        }
        let demand = self.enzyme.rate(pool)? * time_step;
        self.fire(pool, demand)
    }

    /// Runs the reaction at `min(demand, supply, product capacity)`.
    ///
    /// A zero effective rate is reported as `ReactionBlocked` and the pool is
    /// left untouched.
    pub fn fire(
        &self,
        pool: &mut MetabolitePool,
        demand: f64,
    ) -> Result<ReactionOutcome, MetabolismError> {
        self.check(pool)?;
        if demand.is_nan() || demand < 0.0 {
            return Err(MetabolismError::InvalidAmount {
                name: self.name.clone(),
                amount: demand,
            });
        }
        if !self.enzyme.is_active() {
            return Err(MetabolismError::ReactionBlocked(self.name.clone()));
        }

        let rate = demand
            .min(self.supply_ceiling(pool)?)
            .min(self.product_ceiling(pool)?);
        if !rate.is_finite() || rate <= 0.0 {
            return Err(MetabolismError::ReactionBlocked(self.name.clone()));
        }

        // Clamp each scaled amount to what the pool holds so rounding in
        // `available / coefficient * coefficient` cannot overshoot.
        let mut consumed = Stoichiometry::new();
        for (name, coefficient) in &self.consumes {
            consumed.insert(name.clone(), (coefficient * rate).min(pool.available(name)?));
        }
        let mut produced = Stoichiometry::new();
        for (name, coefficient) in &self.produces {
            produced.insert(name.clone(), (coefficient * rate).min(pool.headroom(name)?));
        }

        self.apply(pool, rate, consumed, produced)
    }

    /// Runs exactly `units` of the reaction or fails without changing the pool.
    pub fn transform(
        &self,
        pool: &mut MetabolitePool,
        units: f64,
    ) -> Result<ReactionOutcome, MetabolismError> {
        self.check(pool)?;
        if !units.is_finite() || units < 0.0 {
            return Err(MetabolismError::InvalidAmount {
                name: self.name.clone(),
                amount: units,
            });
        }
        if !self.enzyme.is_active() || units == 0.0 {
            return Err(MetabolismError::ReactionBlocked(self.name.clone()));
        }

        let scale = |stoichiometry: &Stoichiometry| -> Stoichiometry {
            stoichiometry
                .iter()
                .map(|(name, coefficient)| (name.clone(), coefficient * units))
                .collect()
        };
        self.apply(pool, units, scale(&self.consumes), scale(&self.produces))
    }

    fn apply(
        &self,
        pool: &mut MetabolitePool,
        rate: f64,
        consumed: Stoichiometry,
        produced: Stoichiometry,
    ) -> Result<ReactionOutcome, MetabolismError> {
        pool.consume(consumed.iter().map(|(name, amount)| (name.as_str(), *amount)))?;
        if let Err(err) = pool.produce(produced.iter().map(|(name, amount)| (name.as_str(), *amount))) {
            // put back the substrates taken above
            pool.produce(consumed.iter().map(|(name, amount)| (name.as_str(), *amount)))?;
            return Err(err);
        }

        Ok(ReactionOutcome {
            reaction: self.name.clone(),
            rate,
            consumed,
            produced,
        })
    }
}
