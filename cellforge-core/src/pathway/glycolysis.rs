use super::{report_executed, Pathway};
use crate::{
    enzyme::Enzyme,
    error::MetabolismError,
    metabolite::MetabolitePool,
    reaction::{Reaction, ReactionOutcome},
    reporter::{Reporter, SimulationEvent},
};
use serde::{Deserialize, Serialize};

pub const GLYCOLYSIS: &str = "glycolysis";

/// Intermediates registered on first use, each with this capacity.
pub const INTERMEDIATES: [&str; 9] = [
    "glucose_6_phosphate",
    "fructose_6_phosphate",
    "fructose_1_6_bisphosphate",
    "dihydroxyacetone_phosphate",
    "glyceraldehyde_3_phosphate",
    "bisphosphoglycerate_1_3",
    "phosphoglycerate_3",
    "phosphoglycerate_2",
    "phosphoenolpyruvate",
];
pub const INTERMEDIATE_CAPACITY: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlycolysisOutput {
    pub glucose_consumed: f64,
    pub pyruvate_produced: f64,
    pub atp_invested: f64,
    pub atp_produced: f64,
    pub nadh_produced: f64,
}

impl GlycolysisOutput {
    pub fn net_atp(&self) -> f64 {
        self.atp_produced - self.atp_invested
    }

    fn tally(&mut self, outcome: &ReactionOutcome) {
        self.glucose_consumed += outcome.consumed_of("glucose");
        self.pyruvate_produced += outcome.produced_of("pyruvate");
        self.atp_invested += outcome.consumed_of("atp");
        self.atp_produced += outcome.produced_of("atp");
        self.nadh_produced += outcome.produced_of("nadh");
    }
}

/// Glucose to pyruvate in the cytoplasm, one glucose unit at a time.
///
/// Per unit: the four investment steps, triose phosphate isomerase, then the
/// five payoff steps twice (once per triose). Net effect per glucose:
/// glucose + 2 NAD + 2 ADP -> 2 pyruvate + 2 NADH + 2 ATP.
#[derive(Debug, Clone)]
pub struct Glycolysis {
    investment: Vec<Reaction>,
    isomerase: Reaction,
    payoff: Vec<Reaction>,
}

impl Default for Glycolysis {
    fn default() -> Self {
        Self::new()
    }
}

impl Glycolysis {
    pub fn new() -> Self {
        let hexokinase = Reaction::new(
            "hexokinase",
            Enzyme::new("hexokinase", 10.0)
                .with_km("glucose", 0.1)
                .with_inhibitor("glucose_6_phosphate", 0.5)
                .with_downstream("phosphoglucose_isomerase"),
        )
        .consuming("glucose", 1.0)
        .consuming("atp", 1.0)
        .producing("glucose_6_phosphate", 1.0)
        .producing("adp", 1.0);

        let phosphoglucose_isomerase = Reaction::new(
            "phosphoglucose_isomerase",
            Enzyme::new("phosphoglucose_isomerase", 12.0)
                .with_km("glucose_6_phosphate", 0.2)
                .with_downstream("phosphofructokinase"),
        )
        .consuming("glucose_6_phosphate", 1.0)
        .producing("fructose_6_phosphate", 1.0)
        .reversible();

        let phosphofructokinase = Reaction::new(
            "phosphofructokinase",
            Enzyme::new("phosphofructokinase", 8.0)
                .with_km("fructose_6_phosphate", 0.15)
                .with_hill("fructose_6_phosphate", 2.0)
                .with_inhibitor("atp", 1.0)
                .with_activator("adp", 0.5)
                .with_activator("amp", 0.1)
                .with_downstream("aldolase"),
        )
        .consuming("fructose_6_phosphate", 1.0)
        .consuming("atp", 1.0)
        .producing("fructose_1_6_bisphosphate", 1.0)
        .producing("adp", 1.0);

        let aldolase = Reaction::new(
            "aldolase",
            Enzyme::new("aldolase", 7.0)
                .with_km("fructose_1_6_bisphosphate", 0.3)
                .with_downstream("triose_phosphate_isomerase"),
        )
        .consuming("fructose_1_6_bisphosphate", 1.0)
        .producing("dihydroxyacetone_phosphate", 1.0)
        .producing("glyceraldehyde_3_phosphate", 1.0)
        .reversible();

        let triose_phosphate_isomerase = Reaction::new(
            "triose_phosphate_isomerase",
            Enzyme::new("triose_phosphate_isomerase", 15.0)
                .with_km("dihydroxyacetone_phosphate", 0.1)
                .with_downstream("glyceraldehyde_3_phosphate_dehydrogenase"),
        )
        .consuming("dihydroxyacetone_phosphate", 1.0)
        .producing("glyceraldehyde_3_phosphate", 1.0)
        .reversible();

        let gapdh = Reaction::new(
            "glyceraldehyde_3_phosphate_dehydrogenase",
            Enzyme::new("glyceraldehyde_3_phosphate_dehydrogenase", 6.0)
                .with_km("glyceraldehyde_3_phosphate", 0.25)
                .with_km("nad", 0.1)
                .with_inhibitor("nadh", 0.5)
                .with_downstream("phosphoglycerate_kinase"),
        )
        .consuming("glyceraldehyde_3_phosphate", 1.0)
        .consuming("nad", 1.0)
        .producing("bisphosphoglycerate_1_3", 1.0)
        .producing("nadh", 1.0);

        let phosphoglycerate_kinase = Reaction::new(
            "phosphoglycerate_kinase",
            Enzyme::new("phosphoglycerate_kinase", 9.0)
                .with_km("bisphosphoglycerate_1_3", 0.2)
                .with_downstream("phosphoglycerate_mutase"),
        )
        .consuming("bisphosphoglycerate_1_3", 1.0)
        .consuming("adp", 1.0)
        .producing("phosphoglycerate_3", 1.0)
        .producing("atp", 1.0);

        let phosphoglycerate_mutase = Reaction::new(
            "phosphoglycerate_mutase",
            Enzyme::new("phosphoglycerate_mutase", 11.0)
                .with_km("phosphoglycerate_3", 0.15)
                .with_downstream("enolase"),
        )
        .consuming("phosphoglycerate_3", 1.0)
        .producing("phosphoglycerate_2", 1.0)
        .reversible();

        let enolase = Reaction::new(
            "enolase",
            Enzyme::new("enolase", 7.5)
                .with_km("phosphoglycerate_2", 0.3)
                .with_downstream("pyruvate_kinase"),
        )
        .consuming("phosphoglycerate_2", 1.0)
        .producing("phosphoenolpyruvate", 1.0)
        .reversible();

        let pyruvate_kinase = Reaction::new(
            "pyruvate_kinase",
            Enzyme::new("pyruvate_kinase", 10.0)
                .with_km("phosphoenolpyruvate", 0.2)
                .with_inhibitor("atp", 0.8)
                .with_activator("fructose_1_6_bisphosphate", 0.3),
        )
        .consuming("phosphoenolpyruvate", 1.0)
        .consuming("adp", 1.0)
        .producing("pyruvate", 1.0)
        .producing("atp", 1.0);

        Self {
            investment: vec![hexokinase, phosphoglucose_isomerase, phosphofructokinase, aldolase],
            isomerase: triose_phosphate_isomerase,
            payoff: vec![
                gapdh,
                phosphoglycerate_kinase,
                phosphoglycerate_mutase,
                enolase,
                pyruvate_kinase,
            ],
        }
    }

    /// Runs `floor(glucose_units)` glucose units through the pathway.
    ///
    /// Either every unit completes or the pool is restored to its state
    /// before the call and `PathwayFailed` is returned. Negative or
    /// non-finite input fails before any mutation.
    pub fn run(
        &self,
        pool: &mut MetabolitePool,
        glucose_units: f64,
        reporter: &mut dyn Reporter,
    ) -> Result<GlycolysisOutput, MetabolismError> {
        if !glucose_units.is_finite() || glucose_units < 0.0 {
            return Err(MetabolismError::InvalidAmount {
                name: "glucose".to_string(),
                amount: glucose_units,
            });
        }
        let units = glucose_units.floor() as u64;
        if units == 0 {
            return Ok(GlycolysisOutput::default());
        }

        let checkpoint = pool.clone();
        match self.run_units(pool, units, reporter) {
            Ok(output) => Ok(output),
            Err(err) => {
                *pool = checkpoint;
                reporter.emit(SimulationEvent::PathwayFailed {
                    pathway: GLYCOLYSIS.to_string(),
                    message: err.to_string(),
                });
                Err(MetabolismError::pathway(GLYCOLYSIS, err))
            }
        }
    }

    fn run_units(
        &self,
        pool: &mut MetabolitePool,
        units: u64,
        reporter: &mut dyn Reporter,
    ) -> Result<GlycolysisOutput, MetabolismError> {
        let requested = units as f64;
        let available = pool.available("glucose")?;
        if available < requested {
            return Err(MetabolismError::InsufficientMetabolite {
                name: "glucose".to_string(),
                requested,
                available,
            });
        }
        for name in INTERMEDIATES {
            if !pool.contains(name) {
                pool.register(name, 0.0, INTERMEDIATE_CAPACITY)?;
            }
        }

        let mut output = GlycolysisOutput::default();
        for _ in 0..units {
            for reaction in self.investment.iter().chain(std::iter::once(&self.isomerase)) {
                self.step(reaction, pool, &mut output, reporter)?;
            }
            for _ in 0..2 {
                for reaction in &self.payoff {
                    self.step(reaction, pool, &mut output, reporter)?;
                }
            }
        }
        log::debug!(
            "glycolysis processed {} glucose: net ATP {}, NADH {}",
            units,
            output.net_atp(),
            output.nadh_produced
        );
        Ok(output)
    }

    fn step(
        &self,
        reaction: &Reaction,
        pool: &mut MetabolitePool,
        output: &mut GlycolysisOutput,
        reporter: &mut dyn Reporter,
    ) -> Result<(), MetabolismError> {
        let outcome = reaction.transform(pool, 1.0)?;
        output.tally(&outcome);
        report_executed(reporter, GLYCOLYSIS, &outcome);
        Ok(())
    }
}

impl Pathway for Glycolysis {
    fn name(&self) -> &str {
        GLYCOLYSIS
    }

    fn reactions(&self) -> Vec<&Reaction> {
        self.investment
            .iter()
            .chain(std::iter::once(&self.isomerase))
            .chain(self.payoff.iter())
            .collect()
    }

    fn reactions_mut(&mut self) -> Vec<&mut Reaction> {
        self.investment
            .iter_mut()
            .chain(std::iter::once(&mut self.isomerase))
            .chain(self.payoff.iter_mut())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use cellforge_schemas::metabolite::SeedRegistry;

    fn cytoplasm() -> MetabolitePool {
        let seed = SeedRegistry::from_pairs(&[
            ("glucose", 100.0, 1000.0),
            ("atp", 100.0, 1000.0),
            ("adp", 100.0, 1000.0),
            ("nad", 100.0, 1000.0),
            ("nadh", 0.0, 1000.0),
            ("pyruvate", 0.0, 1000.0),
        ]);
        MetabolitePool::from_seed("cytoplasm", &seed).unwrap()
    }

    #[test]
    fn fractional_input_is_floored() {
        let mut pool = cytoplasm();
        let output = Glycolysis::new()
            .run(&mut pool, 1.9, &mut NullReporter)
            .unwrap();
        assert_eq!(output.glucose_consumed, 1.0);
        assert_eq!(output.pyruvate_produced, 2.0);
        assert_eq!(output.net_atp(), 2.0);
    }

    #[test]
    fn zero_input_leaves_pool_untouched() {
        let mut pool = cytoplasm();
        let before = pool.clone();
        let output = Glycolysis::new()
            .run(&mut pool, 0.4, &mut NullReporter)
            .unwrap();
        assert_eq!(output, GlycolysisOutput::default());
        assert_eq!(pool, before);
    }

    #[test]
    fn negative_input_is_rejected() {
        let mut pool = cytoplasm();
        let err = Glycolysis::new()
            .run(&mut pool, -1.0, &mut NullReporter)
            .unwrap_err();
        assert!(matches!(err, MetabolismError::InvalidAmount { .. }));
    }

    #[test]
    fn intermediates_do_not_accumulate() {
        let mut pool = cytoplasm();
        Glycolysis::new().run(&mut pool, 3.0, &mut NullReporter).unwrap();
        for name in INTERMEDIATES {
            assert_eq!(pool.quantity(name).unwrap(), 0.0, "{} left over", name);
        }
    }

    #[test]
    fn deactivating_an_enzyme_blocks_the_pathway() {
        let mut glycolysis = Glycolysis::new();
        glycolysis.deactivate_enzyme("aldolase").unwrap();
        let mut pool = cytoplasm();
        let before = pool.clone();
        let err = glycolysis.run(&mut pool, 1.0, &mut NullReporter).unwrap_err();
        assert!(matches!(err, MetabolismError::PathwayFailed { .. }));
        assert_eq!(pool, before);

        let activated = glycolysis.activate_enzyme("aldolase").unwrap();
        assert!(activated.contains(&"pyruvate_kinase".to_string()));
        assert!(glycolysis.run(&mut pool, 1.0, &mut NullReporter).is_ok());
    }
}
