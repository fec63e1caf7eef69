use super::{krebs::ACETYL_COA, report_executed, CitricAcidCycle, CycleTotals, Pathway};
use crate::{
    enzyme::Enzyme,
    error::MetabolismError,
    metabolite::MetabolitePool,
    reaction::{Reaction, ReactionOutcome},
    reporter::{Reporter, SimulationEvent},
};
use serde::{Deserialize, Serialize};

pub const PYRUVATE_OXIDATION: &str = "pyruvate_oxidation";
pub const ELECTRON_TRANSPORT_CHAIN: &str = "electron_transport_chain";

pub const PROTONS_PER_NADH: f64 = 4.0;
pub const PROTONS_PER_FADH2: f64 = 2.0;
pub const PROTONS_PER_ATP: f64 = 4.0;
pub const MAX_PROTON_GRADIENT: f64 = 200.0;
pub const LEAK_RATE: f64 = 0.1;
pub const LEAK_STEEPNESS: f64 = 0.1;
pub const LEAK_MIDPOINT: f64 = 150.0;

/// Protons held across the inner membrane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtonGradient {
    value: f64,
    pub max: f64,
    pub leak_rate: f64,
    pub leak_steepness: f64,
    pub leak_midpoint: f64,
}

impl Default for ProtonGradient {
    fn default() -> Self {
        Self {
            value: 0.0,
            max: MAX_PROTON_GRADIENT,
            leak_rate: LEAK_RATE,
            leak_steepness: LEAK_STEEPNESS,
            leak_midpoint: LEAK_MIDPOINT,
        }
    }
}

impl ProtonGradient {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Logistic in the current gradient: negligible when low, approaching
    /// `leak_rate` past the midpoint.
    pub fn leak(&self) -> f64 {
        self.leak_rate / (1.0 + (-self.leak_steepness * (self.value - self.leak_midpoint)).exp())
    }

    /// Adds pumped protons (capped at `max`), then applies the leak.
    pub fn pump(&mut self, protons: f64) {
        if protons <= 0.0 {
            return;
        }
        self.value = (self.value + protons).min(self.max);
        self.value = (self.value - self.leak()).max(0.0);
    }

    /// Removes up to `protons`; returns what was removed.
    pub fn spend(&mut self, protons: f64) -> f64 {
        let spent = protons.clamp(0.0, self.value);
        self.value -= spent;
        spent
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OxidativeOutput {
    pub nadh_oxidized: f64,
    pub fadh2_oxidized: f64,
    pub electrons_to_oxygen: f64,
    pub oxygen_consumed: f64,
    pub atp_produced: f64,
}

/// Complexes I-IV and ATP synthase.
#[derive(Debug, Clone)]
pub struct ElectronTransportChain {
    complex_i: Reaction,
    complex_ii: Reaction,
    complex_iii: Reaction,
    complex_iv: Reaction,
    atp_synthase: Reaction,
}

impl Default for ElectronTransportChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ElectronTransportChain {
    pub fn new() -> Self {
        Self {
            complex_i: Reaction::new("complex_i", Enzyme::new("nadh_dehydrogenase", 100.0))
                .consuming("nadh", 1.0)
                .consuming("ubiquinone", 1.0)
                .producing("nad", 1.0)
                .producing("ubiquinol", 1.0),
            complex_ii: Reaction::new("complex_ii", Enzyme::new("succinate_dehydrogenase", 100.0))
                .consuming("fadh2", 1.0)
                .consuming("ubiquinone", 1.0)
                .producing("fad", 1.0)
                .producing("ubiquinol", 1.0),
            complex_iii: Reaction::new(
                "complex_iii",
                Enzyme::new("cytochrome_bc1_complex", 100.0),
            )
            .consuming("ubiquinol", 1.0)
            .consuming("cytochrome_c_oxidized", 1.0)
            .producing("ubiquinone", 1.0)
            .producing("cytochrome_c_reduced", 1.0),
            // two reduced cytochrome c per O2
            complex_iv: Reaction::new("complex_iv", Enzyme::new("cytochrome_c_oxidase", 100.0))
                .consuming("cytochrome_c_reduced", 1.0)
                .consuming("oxygen", 0.5)
                .producing("cytochrome_c_oxidized", 1.0),
            atp_synthase: Reaction::new("atp_synthase", Enzyme::new("atp_synthase", 100.0))
                .consuming("adp", 1.0)
                .producing("atp", 1.0),
        }
    }

    /// Runs each complex at the full rate its substrates allow, pumping
    /// protons as electrons pass, then converts whole multiples of
    /// `PROTONS_PER_ATP` into ATP.
    pub fn oxidative_phosphorylation(
        &self,
        pool: &mut MetabolitePool,
        gradient: &mut ProtonGradient,
        reporter: &mut dyn Reporter,
    ) -> Result<OxidativeOutput, MetabolismError> {
        let mut output = OxidativeOutput::default();
        if pool.available("oxygen")? <= 0.0 {
            reporter.emit(SimulationEvent::PathwayStalled {
                pathway: ELECTRON_TRANSPORT_CHAIN.to_string(),
                step: self.complex_iv.name.clone(),
                reason: "no oxygen available".to_string(),
            });
            return Ok(output);
        }

        if let Some(outcome) = self.saturate(&self.complex_i, pool, reporter)? {
            output.nadh_oxidized = outcome.consumed_of("nadh");
            gradient.pump(PROTONS_PER_NADH * outcome.rate);
        }
        if let Some(outcome) = self.saturate(&self.complex_ii, pool, reporter)? {
            output.fadh2_oxidized = outcome.consumed_of("fadh2");
        }
        if let Some(outcome) = self.saturate(&self.complex_iii, pool, reporter)? {
            gradient.pump(PROTONS_PER_FADH2 * outcome.rate);
        }
        if let Some(outcome) = self.saturate(&self.complex_iv, pool, reporter)? {
            output.electrons_to_oxygen = outcome.rate;
            output.oxygen_consumed = outcome.consumed_of("oxygen");
            gradient.pump(PROTONS_PER_FADH2 * outcome.rate);
        }

        let whole_units = (gradient.value() / PROTONS_PER_ATP).floor();
        if whole_units > 0.0 {
            if let Some(outcome) = self.saturate_at(&self.atp_synthase, pool, whole_units, reporter)? {
                gradient.spend(outcome.rate * PROTONS_PER_ATP);
                output.atp_produced = outcome.produced_of("atp");
            }
        }

        log::debug!(
            "oxidative phosphorylation: {:.2} NADH, {:.2} FADH2 -> {:.2} ATP, gradient {:.2}",
            output.nadh_oxidized,
            output.fadh2_oxidized,
            output.atp_produced,
            gradient.value()
        );
        Ok(output)
    }

    fn saturate(
        &self,
        reaction: &Reaction,
        pool: &mut MetabolitePool,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<ReactionOutcome>, MetabolismError> {
        self.saturate_at(reaction, pool, f64::INFINITY, reporter)
    }

    fn saturate_at(
        &self,
        reaction: &Reaction,
        pool: &mut MetabolitePool,
        demand: f64,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<ReactionOutcome>, MetabolismError> {
        fire_or_block(ELECTRON_TRANSPORT_CHAIN, reaction, pool, demand, reporter)
    }
}

impl Pathway for ElectronTransportChain {
    fn name(&self) -> &str {
        ELECTRON_TRANSPORT_CHAIN
    }

    fn reactions(&self) -> Vec<&Reaction> {
        vec![
            &self.complex_i,
            &self.complex_ii,
            &self.complex_iii,
            &self.complex_iv,
            &self.atp_synthase,
        ]
    }

    fn reactions_mut(&mut self) -> Vec<&mut Reaction> {
        vec![
            &mut self.complex_i,
            &mut self.complex_ii,
            &mut self.complex_iii,
            &mut self.complex_iv,
            &mut self.atp_synthase,
        ]
    }
}

/// Fires `reaction`; a block is reported and yields `None`.
fn fire_or_block(
    pathway: &str,
    reaction: &Reaction,
    pool: &mut MetabolitePool,
    demand: f64,
    reporter: &mut dyn Reporter,
) -> Result<Option<ReactionOutcome>, MetabolismError> {
    match reaction.fire(pool, demand) {
        Ok(outcome) => {
            report_executed(reporter, pathway, &outcome);
            Ok(Some(outcome))
        }
        Err(MetabolismError::ReactionBlocked(name)) => {
            reporter.emit(SimulationEvent::ReactionBlocked {
                pathway: pathway.to_string(),
                reaction: name,
            });
            Ok(None)
        }
        Err(err) => Err(MetabolismError::pathway(pathway, err)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RespirationOutput {
    pub acetyl_coa_produced: f64,
    pub cycle: CycleTotals,
    /// ATP made from cycle GTP.
    pub substrate_level_atp: f64,
    pub oxidative: OxidativeOutput,
}

impl RespirationOutput {
    pub fn atp_produced(&self) -> f64 {
        self.substrate_level_atp + self.oxidative.atp_produced
    }
}

/// Everything that happens to pyruvate once it is inside the mitochondrion.
#[derive(Debug, Clone)]
pub struct CellularRespiration {
    pyruvate_dehydrogenase: Reaction,
    cycle: CitricAcidCycle,
    nucleoside_diphosphate_kinase: Reaction,
    chain: ElectronTransportChain,
}

impl Default for CellularRespiration {
    fn default() -> Self {
        Self::new()
    }
}

impl CellularRespiration {
    pub fn new() -> Self {
        Self {
            pyruvate_dehydrogenase: Reaction::new(
                "pyruvate_dehydrogenase",
                Enzyme::new("pyruvate_dehydrogenase", 100.0)
                    .with_km("pyruvate", 0.5)
                    .with_km("nad", 0.5)
                    .with_km("coa", 0.5)
                    .with_inhibitor("acetyl_coa", 50.0)
                    .with_downstream("citrate_synthase"),
            )
            .consuming("pyruvate", 1.0)
            .consuming("nad", 1.0)
            .consuming("coa", 1.0)
            .producing(ACETYL_COA, 1.0)
            .producing("nadh", 1.0)
            .producing("co2", 1.0),
            cycle: CitricAcidCycle::new(),
            // GTP + ADP -> GDP + ATP keeps adenine nucleotides conserved
            nucleoside_diphosphate_kinase: Reaction::new(
                "nucleoside_diphosphate_kinase",
                Enzyme::new("nucleoside_diphosphate_kinase", 100.0),
            )
            .consuming("gtp", 1.0)
            .consuming("adp", 1.0)
            .producing("gdp", 1.0)
            .producing("atp", 1.0),
            chain: ElectronTransportChain::new(),
        }
    }

    pub fn citric_acid_cycle(&self) -> &CitricAcidCycle {
        &self.cycle
    }

    pub fn citric_acid_cycle_mut(&mut self) -> &mut CitricAcidCycle {
        &mut self.cycle
    }

    pub fn electron_transport_chain(&self) -> &ElectronTransportChain {
        &self.chain
    }

    /// One respiration step over the mitochondrial pool.
    ///
    /// Pyruvate dehydrogenase runs kinetically over `time_step`; the cycle
    /// then turns once per whole unit of acetyl-CoA; GTP is converted to
    /// ATP; finally the chain oxidizes what NADH and FADH2 it can.
    pub fn run(
        &mut self,
        pool: &mut MetabolitePool,
        gradient: &mut ProtonGradient,
        time_step: f64,
        reporter: &mut dyn Reporter,
    ) -> Result<RespirationOutput, MetabolismError> {
        let mut output = RespirationOutput::default();

        if pool.available("pyruvate")? > 0.0 {
            match self.pyruvate_dehydrogenase.execute(pool, time_step) {
                Ok(outcome) => {
                    output.acetyl_coa_produced = outcome.produced_of(ACETYL_COA);
                    report_executed(reporter, PYRUVATE_OXIDATION, &outcome);
                }
                Err(MetabolismError::ReactionBlocked(name)) => {
                    reporter.emit(SimulationEvent::ReactionBlocked {
                        pathway: PYRUVATE_OXIDATION.to_string(),
                        reaction: name,
                    });
                }
                Err(err) => return Err(MetabolismError::pathway(PYRUVATE_OXIDATION, err)),
            }
        }

        let turns = pool.available(ACETYL_COA)?.floor() as u64;
        if turns > 0 {
            output.cycle = self.cycle.run(pool, turns, reporter)?;
        }

        let gtp = pool.available("gtp")?;
        if gtp > 0.0 {
            if let Some(outcome) = fire_or_block(
                self.cycle.name(),
                &self.nucleoside_diphosphate_kinase,
                pool,
                gtp,
                reporter,
            )? {
                output.substrate_level_atp = outcome.produced_of("atp");
            }
        }

        output.oxidative = self.chain.oxidative_phosphorylation(pool, gradient, reporter)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment::mitochondrion_seed;
    use crate::observer::total_adenine_nucleotides;
    use crate::reporter::NullReporter;

    fn matrix() -> MetabolitePool {
        MetabolitePool::from_seed("mitochondrion", &mitochondrion_seed()).unwrap()
    }

    #[test]
    fn leak_is_small_below_midpoint_and_grows_past_it() {
        let mut gradient = ProtonGradient::default();
        gradient.pump(10.0);
        assert!(gradient.leak() < 0.001);
        gradient.pump(180.0);
        assert!(gradient.leak() > 0.09);
        assert!(gradient.value() <= MAX_PROTON_GRADIENT);
    }

    #[test]
    fn spend_never_goes_negative() {
        let mut gradient = ProtonGradient::default();
        gradient.pump(8.0);
        let spent = gradient.spend(100.0);
        assert!((spent - 8.0).abs() < 1e-6);
        assert_eq!(gradient.value(), 0.0);
    }

    #[test]
    fn chain_turns_nadh_into_atp() {
        let mut pool = matrix();
        pool.change_quantity("nadh", 10.0).unwrap();
        let mut gradient = ProtonGradient::default();

        let output = ElectronTransportChain::new()
            .oxidative_phosphorylation(&mut pool, &mut gradient, &mut NullReporter)
            .unwrap();

        // 10 NADH pump 40 at complex I, 20 each at III and IV
        assert_eq!(output.nadh_oxidized, 10.0);
        assert_eq!(output.oxygen_consumed, 5.0);
        assert_eq!(output.atp_produced, 19.0);
        assert_eq!(pool.quantity("atp").unwrap(), 19.0);
        assert!(gradient.value() < PROTONS_PER_ATP);
    }

    #[test]
    fn no_oxygen_means_no_oxidation() {
        let mut pool = matrix();
        pool.change_quantity("nadh", 10.0).unwrap();
        let oxygen = pool.quantity("oxygen").unwrap();
        pool.change_quantity("oxygen", -oxygen).unwrap();
        let mut gradient = ProtonGradient::default();

        let output = ElectronTransportChain::new()
            .oxidative_phosphorylation(&mut pool, &mut gradient, &mut NullReporter)
            .unwrap();
        assert_eq!(output, OxidativeOutput::default());
        assert_eq!(pool.quantity("nadh").unwrap(), 10.0);
    }

    #[test]
    fn respiration_conserves_adenine_nucleotides() {
        let mut pool = matrix();
        pool.change_quantity("pyruvate", 2.0).unwrap();
        let before = total_adenine_nucleotides(&[&pool]);
        let mut gradient = ProtonGradient::default();

        let output = CellularRespiration::new()
            .run(&mut pool, &mut gradient, 0.1, &mut NullReporter)
            .unwrap();

        assert!(output.acetyl_coa_produced > 0.0);
        assert!(output.atp_produced() > 0.0);
        let after = total_adenine_nucleotides(&[&pool]);
        assert!((after - before).abs() < 1e-9);
    }
}
