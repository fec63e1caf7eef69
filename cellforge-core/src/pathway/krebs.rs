use super::{report_executed, Pathway};
use crate::{
    enzyme::Enzyme,
    error::MetabolismError,
    metabolite::MetabolitePool,
    reaction::{Reaction, ReactionOutcome},
    reporter::{Reporter, SimulationEvent},
};
use serde::{Deserialize, Serialize};

pub const CITRIC_ACID_CYCLE: &str = "citric_acid_cycle";
pub const ACETYL_COA: &str = "acetyl_coa";
/// Regenerated by the last step and required by the first.
pub const ANCHOR: &str = "oxaloacetate";

/// Yield of a single turn of the cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub acetyl_coa_consumed: f64,
    pub nadh: f64,
    pub fadh2: f64,
    pub gtp: f64,
    pub co2: f64,
    pub steps_completed: usize,
    pub completed: bool,
}

impl CycleResult {
    fn tally(&mut self, outcome: &ReactionOutcome) {
        self.acetyl_coa_consumed += outcome.consumed_of(ACETYL_COA);
        self.nadh += outcome.produced_of("nadh");
        self.fadh2 += outcome.produced_of("fadh2");
        self.gtp += outcome.produced_of("gtp");
        self.co2 += outcome.produced_of("co2");
        self.steps_completed += 1;
    }
}

/// Cofactor totals accumulated over one run; cleared when a run starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleTotals {
    pub cycles_completed: u64,
    pub acetyl_coa_consumed: f64,
    pub nadh: f64,
    pub fadh2: f64,
    pub gtp: f64,
    pub co2: f64,
}

impl CycleTotals {
    fn add(&mut self, result: &CycleResult) {
        if result.completed {
            self.cycles_completed += 1;
        }
        self.acetyl_coa_consumed += result.acetyl_coa_consumed;
        self.nadh += result.nadh;
        self.fadh2 += result.fadh2;
        self.gtp += result.gtp;
        self.co2 += result.co2;
    }
}

/// The citric acid cycle in the mitochondrial matrix.
#[derive(Debug, Clone)]
pub struct CitricAcidCycle {
    reactions: Vec<Reaction>,
    totals: CycleTotals,
}

impl Default for CitricAcidCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl CitricAcidCycle {
    pub fn new() -> Self {
        let reactions = vec![
            Reaction::new(
                "citrate_synthase",
                Enzyme::new("citrate_synthase", 10.0)
                    .with_km(ACETYL_COA, 0.05)
                    .with_km(ANCHOR, 0.01)
                    .with_inhibitor("atp", 100.0)
                    .with_downstream("aconitase"),
            )
            .consuming(ACETYL_COA, 1.0)
            .consuming(ANCHOR, 1.0)
            .producing("citrate", 1.0)
            .producing("coa", 1.0),
            Reaction::new(
                "aconitase",
                Enzyme::new("aconitase", 10.0)
                    .with_km("citrate", 0.5)
                    .with_downstream("isocitrate_dehydrogenase"),
            )
            .consuming("citrate", 1.0)
            .producing("isocitrate", 1.0)
            .reversible(),
            Reaction::new(
                "isocitrate_dehydrogenase",
                Enzyme::new("isocitrate_dehydrogenase", 10.0)
                    .with_km("isocitrate", 0.5)
                    .with_hill("isocitrate", 2.0)
                    .with_inhibitor("atp", 100.0)
                    .with_activator("adp", 100.0)
                    .with_downstream("alpha_ketoglutarate_dehydrogenase"),
            )
            .consuming("isocitrate", 1.0)
            .consuming("nad", 1.0)
            .producing("alpha_ketoglutarate", 1.0)
            .producing("nadh", 1.0)
            .producing("co2", 1.0),
            Reaction::new(
                "alpha_ketoglutarate_dehydrogenase",
                Enzyme::new("alpha_ketoglutarate_dehydrogenase", 10.0)
                    .with_km("alpha_ketoglutarate", 0.5)
                    .with_inhibitor("nadh", 50.0)
                    .with_downstream("succinyl_coa_synthetase"),
            )
            .consuming("alpha_ketoglutarate", 1.0)
            .consuming("nad", 1.0)
            .consuming("coa", 1.0)
            .producing("succinyl_coa", 1.0)
            .producing("nadh", 1.0)
            .producing("co2", 1.0),
            Reaction::new(
                "succinyl_coa_synthetase",
                Enzyme::new("succinyl_coa_synthetase", 10.0)
                    .with_km("succinyl_coa", 0.5)
                    .with_downstream("succinate_dehydrogenase"),
            )
            .consuming("succinyl_coa", 1.0)
            .consuming("gdp", 1.0)
            .producing("succinate", 1.0)
            .producing("gtp", 1.0)
            .producing("coa", 1.0),
            Reaction::new(
                "succinate_dehydrogenase",
                Enzyme::new("succinate_dehydrogenase", 10.0)
                    .with_km("succinate", 0.5)
                    .with_downstream("fumarase"),
            )
            .consuming("succinate", 1.0)
            .consuming("fad", 1.0)
            .producing("fumarate", 1.0)
            .producing("fadh2", 1.0),
            Reaction::new(
                "fumarase",
                Enzyme::new("fumarase", 10.0)
                    .with_km("fumarate", 0.5)
                    .with_downstream("malate_dehydrogenase"),
            )
            .consuming("fumarate", 1.0)
            .producing("malate", 1.0)
            .reversible(),
            Reaction::new(
                "malate_dehydrogenase",
                Enzyme::new("malate_dehydrogenase", 10.0)
                    .with_km("malate", 0.5)
                    .with_downstream("citrate_synthase"),
            )
            .consuming("malate", 1.0)
            .consuming("nad", 1.0)
            .producing(ANCHOR, 1.0)
            .producing("nadh", 1.0)
            .reversible(),
        ];

        Self {
            reactions,
            totals: CycleTotals::default(),
        }
    }

    pub fn totals(&self) -> &CycleTotals {
        &self.totals
    }

    /// Adds a strictly positive amount of a cycle participant to the pool.
    pub fn add_substrate(
        &self,
        pool: &mut MetabolitePool,
        name: &str,
        amount: f64,
    ) -> Result<(), MetabolismError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(MetabolismError::InvalidAmount {
                name: name.to_string(),
                amount,
            });
        }
        pool.produce([(name, amount)])
    }

    /// One turn: the eight steps in order, each at most one unit.
    ///
    /// The flux set by citrate synthase carries through the remaining steps.
    /// A blocked step is reported and ends the turn early; it is not an
    /// error. A turn that cannot start returns an empty result.
    pub fn run_cycle(
        &self,
        pool: &mut MetabolitePool,
        reporter: &mut dyn Reporter,
    ) -> Result<CycleResult, MetabolismError> {
        for reaction in &self.reactions {
            reaction
                .check(pool)
                .map_err(|err| MetabolismError::pathway(CITRIC_ACID_CYCLE, err))?;
        }

        if pool.available(ACETYL_COA)? <= 0.0 {
            self.stalled(reporter, "citrate_synthase", "no acetyl-CoA to start the cycle");
            return Ok(CycleResult::default());
        }
        self.replenish_anchor(pool, reporter)?;
        if pool.available(ANCHOR)? <= 0.0 {
            self.stalled(reporter, "citrate_synthase", "oxaloacetate depleted");
            return Ok(CycleResult::default());
        }

        let mut result = CycleResult::default();
        let mut flux = 1.0_f64;
        for reaction in &self.reactions {
            match reaction.fire(pool, flux) {
                Ok(outcome) => {
                    flux = flux.min(outcome.rate);
                    result.tally(&outcome);
                    report_executed(reporter, CITRIC_ACID_CYCLE, &outcome);
                }
                Err(MetabolismError::ReactionBlocked(step)) => {
                    self.stalled(reporter, &step, "insufficient substrate or cofactor");
                    break;
                }
                Err(err) => return Err(MetabolismError::pathway(CITRIC_ACID_CYCLE, err)),
            }
        }
        result.completed = result.steps_completed == self.reactions.len();
        Ok(result)
    }

    /// Tops oxaloacetate up to one unit from leftover malate.
    fn replenish_anchor(
        &self,
        pool: &mut MetabolitePool,
        reporter: &mut dyn Reporter,
    ) -> Result<(), MetabolismError> {
        let deficit = 1.0 - pool.available(ANCHOR)?;
        if deficit <= 0.0 || pool.available("malate")? <= 0.0 {
            return Ok(());
        }
        let Some(malate_dehydrogenase) = self.reactions.last() else {
            return Ok(());
        };
        match malate_dehydrogenase.fire(pool, deficit) {
            Ok(outcome) => {
                log::debug!("regenerated {:.3} oxaloacetate from malate", outcome.rate);
                report_executed(reporter, CITRIC_ACID_CYCLE, &outcome);
                Ok(())
            }
            Err(MetabolismError::ReactionBlocked(_)) => Ok(()),
            Err(err) => Err(MetabolismError::pathway(CITRIC_ACID_CYCLE, err)),
        }
    }

    fn stalled(&self, reporter: &mut dyn Reporter, step: &str, reason: &str) {
        reporter.emit(SimulationEvent::PathwayStalled {
            pathway: CITRIC_ACID_CYCLE.to_string(),
            step: step.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Starts a run: clears accumulated totals and returns a cursor yielding
    /// at most `limit` turns (unbounded when `None`).
    pub fn cycles<'a>(
        &'a mut self,
        pool: &'a mut MetabolitePool,
        reporter: &'a mut dyn Reporter,
        limit: Option<u64>,
    ) -> CycleCursor<'a> {
        self.totals = CycleTotals::default();
        CycleCursor {
            cycle: self,
            pool,
            reporter,
            limit,
            cycles_run: 0,
        }
    }

    /// Runs up to `turns` turns, stopping early once a turn cannot start.
    pub fn run(
        &mut self,
        pool: &mut MetabolitePool,
        turns: u64,
        reporter: &mut dyn Reporter,
    ) -> Result<CycleTotals, MetabolismError> {
        let mut cursor = self.cycles(pool, reporter, Some(turns));
        while let Some(result) = cursor.next_cycle() {
            if result?.steps_completed == 0 {
                break;
            }
        }
        Ok(*cursor.totals())
    }
}

impl Pathway for CitricAcidCycle {
    fn name(&self) -> &str {
        CITRIC_ACID_CYCLE
    }

    fn reactions(&self) -> Vec<&Reaction> {
        self.reactions.iter().collect()
    }

    fn reactions_mut(&mut self) -> Vec<&mut Reaction> {
        self.reactions.iter_mut().collect()
    }
}

/// Restartable walk over successive turns of the cycle.
pub struct CycleCursor<'a> {
    cycle: &'a mut CitricAcidCycle,
    pool: &'a mut MetabolitePool,
    reporter: &'a mut dyn Reporter,
    limit: Option<u64>,
    cycles_run: u64,
}

impl<'a> CycleCursor<'a> {
    pub fn next_cycle(&mut self) -> Option<Result<CycleResult, MetabolismError>> {
        if self.limit.is_some_and(|limit| self.cycles_run >= limit) {
            return None;
        }
        self.cycles_run += 1;
        let result = self.cycle.run_cycle(&mut *self.pool, &mut *self.reporter);
        if let Ok(turn) = &result {
            self.cycle.totals.add(turn);
        }
        Some(result)
    }

    /// Rewinds the turn counter and clears the accumulated totals.
    pub fn reset(&mut self) {
        self.cycles_run = 0;
        self.cycle.totals = CycleTotals::default();
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    pub fn totals(&self) -> &CycleTotals {
        &self.cycle.totals
    }
}

impl Iterator for CycleCursor<'_> {
    type Item = Result<CycleResult, MetabolismError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_cycle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment::mitochondrion_seed;
    use crate::reporter::{NullReporter, RecordingReporter};

    fn matrix(acetyl_coa: f64) -> MetabolitePool {
        let mut pool = MetabolitePool::from_seed("mitochondrion", &mitochondrion_seed()).unwrap();
        pool.change_quantity(ACETYL_COA, acetyl_coa).unwrap();
        pool
    }

    #[test]
    fn full_turn_yields_cofactors_and_returns_anchor() {
        let mut pool = matrix(1.0);
        let anchor = pool.quantity(ANCHOR).unwrap();
        let result = CitricAcidCycle::new()
            .run_cycle(&mut pool, &mut NullReporter)
            .unwrap();

        assert!(result.completed);
        assert_eq!(result.nadh, 3.0);
        assert_eq!(result.fadh2, 1.0);
        assert_eq!(result.gtp, 1.0);
        assert_eq!(result.co2, 2.0);
        assert_eq!(pool.quantity(ANCHOR).unwrap(), anchor);
        assert_eq!(pool.quantity(ACETYL_COA).unwrap(), 0.0);
    }

    #[test]
    fn missing_oxaloacetate_stalls_until_malate_refills_it() {
        let mut pool = matrix(1.0);
        let anchor = pool.quantity(ANCHOR).unwrap();
        pool.change_quantity(ANCHOR, -anchor).unwrap();
        let cycle = CitricAcidCycle::new();
        let reporter = RecordingReporter::new();
        let mut sink = reporter.clone();

        let result = cycle.run_cycle(&mut pool, &mut sink).unwrap();
        assert_eq!(result.steps_completed, 0);
        assert!(!result.completed);
        assert_eq!(pool.quantity(ACETYL_COA).unwrap(), 1.0);
        assert_eq!(
            reporter.count_where(|e| matches!(
                e,
                SimulationEvent::PathwayStalled { step, .. } if step == "citrate_synthase"
            )),
            1
        );

        pool.change_quantity("malate", 1.0).unwrap();
        let result = cycle.run_cycle(&mut pool, &mut sink).unwrap();
        assert!(result.completed);
        assert_eq!(result.nadh, 3.0);
        assert_eq!(pool.quantity(ANCHOR).unwrap(), 1.0);
        assert_eq!(pool.quantity("malate").unwrap(), 0.0);
        assert_eq!(pool.quantity(ACETYL_COA).unwrap(), 0.0);
    }

    #[test]
    fn partial_acetyl_coa_sets_the_flux() {
        let mut pool = matrix(0.5);
        let result = CitricAcidCycle::new()
            .run_cycle(&mut pool, &mut NullReporter)
            .unwrap();
        assert!(result.completed);
        assert!((result.nadh - 1.5).abs() < 1e-12);
        assert!((result.co2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn run_stops_when_acetyl_coa_runs_out() {
        let mut pool = matrix(3.0);
        let mut cycle = CitricAcidCycle::new();
        let totals = cycle.run(&mut pool, 10, &mut NullReporter).unwrap();
        assert_eq!(totals.cycles_completed, 3);
        assert_eq!(totals.nadh, 9.0);
        assert_eq!(*cycle.totals(), totals);
    }

    #[test]
    fn cursor_can_be_rewound() {
        let mut pool = matrix(5.0);
        let mut cycle = CitricAcidCycle::new();
        let mut reporter = NullReporter;
        let mut cursor = cycle.cycles(&mut pool, &mut reporter, Some(2));

        assert!(cursor.next_cycle().is_some());
        assert!(cursor.next_cycle().is_some());
        assert!(cursor.next_cycle().is_none());
        assert_eq!(cursor.totals().cycles_completed, 2);

        cursor.reset();
        assert_eq!(cursor.totals().cycles_completed, 0);
        let turn = cursor.next_cycle().unwrap().unwrap();
        assert!(turn.completed);
        assert_eq!(cursor.cycles_run(), 1);
    }

    #[test]
    fn add_substrate_rejects_non_positive_amounts() {
        let mut pool = matrix(0.0);
        let cycle = CitricAcidCycle::new();
        assert!(cycle.add_substrate(&mut pool, ACETYL_COA, 0.0).is_err());
        cycle.add_substrate(&mut pool, ACETYL_COA, 2.0).unwrap();
        assert_eq!(pool.quantity(ACETYL_COA).unwrap(), 2.0);
    }
}
