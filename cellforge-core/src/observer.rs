use crate::{
    error::MetabolismError,
    metabolite::MetabolitePool,
    reporter::{Reporter, SimulationEvent},
    simulation::state::CellState,
};

pub const ADENINE_NUCLEOTIDES: [&str; 3] = ["atp", "adp", "amp"];

/// Free-energy weights (kJ/mol) of the metabolites tracked for energy balance.
pub const ENERGY_WEIGHTS: [(&str, f64); 12] = [
    ("atp", 50.0),
    ("adp", 30.0),
    ("glucose", 686.0),
    ("glucose_6_phosphate", 916.0),
    ("fructose_6_phosphate", 916.0),
    ("fructose_1_6_bisphosphate", 1146.0),
    ("glyceraldehyde_3_phosphate", 573.0),
    ("bisphosphoglycerate_1_3", 803.0),
    ("phosphoglycerate_3", 573.0),
    ("phosphoglycerate_2", 573.0),
    ("phosphoenolpyruvate", 803.0),
    ("pyruvate", 343.0),
];
pub const PROTON_GRADIENT_WEIGHT: f64 = 5.0;

pub fn total_adenine_nucleotides(pools: &[&MetabolitePool]) -> f64 {
    pools
        .iter()
        .map(|pool| pool.total_of(&ADENINE_NUCLEOTIDES))
        .sum()
}

pub fn energy_state(pools: &[&MetabolitePool], proton_gradient: f64) -> f64 {
    let metabolites: f64 = pools
        .iter()
        .flat_map(|pool| {
            ENERGY_WEIGHTS
                .iter()
                .map(move |(name, weight)| pool.total_of(&[*name]) * weight)
        })
        .sum();
    metabolites + proton_gradient * PROTON_GRADIENT_WEIGHT
}

/// A post-tick invariant check. The first observation fixes the baseline.
pub trait ConservationObserver {
    fn name(&self) -> &str;

    /// Returns the drift from baseline when it exceeds tolerance.
    fn observe(
        &mut self,
        cell: &mut CellState,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<f64>, MetabolismError>;

    fn reset(&mut self);
}

/// Keeps ATP + ADP + AMP across both compartments at its starting value.
/// When correction is enabled, drift is absorbed by ADP and then AMP.
#[derive(Debug, Clone)]
pub struct AdenineBalanceObserver {
    tolerance: f64,
    correct: bool,
    baseline: Option<f64>,
    drift_detected: bool,
}

impl AdenineBalanceObserver {
    pub fn new(tolerance: f64, correct: bool) -> Self {
        Self {
            tolerance,
            correct,
            baseline: None,
            drift_detected: false,
        }
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    pub fn drift_detected(&self) -> bool {
        self.drift_detected
    }

    fn rebalance(&self, cell: &mut CellState, drift: f64) -> Result<bool, MetabolismError> {
        let mut remaining = drift.abs();
        for pool in [&mut cell.cytoplasm, &mut cell.mitochondrion] {
            for name in ["adp", "amp"] {
                if remaining <= self.tolerance {
                    return Ok(true);
                }
                if !pool.contains(name) {
                    continue;
                }
                if drift > 0.0 {
                    let take = remaining.min(pool.available(name)?);
                    pool.change_quantity(name, -take)?;
                    remaining -= take;
                } else {
                    let add = remaining.min(pool.headroom(name)?);
                    pool.change_quantity(name, add)?;
                    remaining -= add;
                }
            }
        }
        Ok(remaining <= self.tolerance)
    }
}

impl ConservationObserver for AdenineBalanceObserver {
    fn name(&self) -> &str {
        "adenine_balance"
    }

    fn observe(
        &mut self,
        cell: &mut CellState,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<f64>, MetabolismError> {
        let current = total_adenine_nucleotides(&cell.pools());
        let Some(baseline) = self.baseline else {
            self.baseline = Some(current);
            return Ok(None);
        };

        let drift = current - baseline;
        if drift.abs() <= self.tolerance {
            return Ok(None);
        }

        self.drift_detected = true;
        let corrected = self.correct && self.rebalance(cell, drift)?;
        reporter.emit(SimulationEvent::AdenineDrift {
            initial: baseline,
            current,
            corrected,
        });
        Ok(Some(drift))
    }

    fn reset(&mut self) {
        self.baseline = None;
        self.drift_detected = false;
    }
}

/// Reports drift in the weighted energy state. Never corrects.
#[derive(Debug, Clone)]
pub struct EnergyBalanceObserver {
    tolerance: f64,
    baseline: Option<f64>,
}

impl EnergyBalanceObserver {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            baseline: None,
        }
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }
}

impl ConservationObserver for EnergyBalanceObserver {
    fn name(&self) -> &str {
        "energy_balance"
    }

    fn observe(
        &mut self,
        cell: &mut CellState,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<f64>, MetabolismError> {
        let current = energy_state(&cell.pools(), cell.proton_gradient.value());
        let Some(baseline) = self.baseline else {
            self.baseline = Some(current);
            return Ok(None);
        };

        let drift = current - baseline;
        if drift.abs() <= self.tolerance {
            return Ok(None);
        }
        reporter.emit(SimulationEvent::EnergyDrift {
            initial: baseline,
            current,
        });
        Ok(Some(drift))
    }

    fn reset(&mut self) {
        self.baseline = None;
    }
}
