pub mod glycolysis;
pub mod krebs;
pub mod respiration;

use crate::{
    enzyme::{self, Enzyme},
    error::MetabolismError,
    reaction::{Reaction, ReactionOutcome},
    reporter::{Reporter, SimulationEvent},
};

pub use glycolysis::{Glycolysis, GlycolysisOutput};
pub use krebs::{CitricAcidCycle, CycleCursor, CycleResult, CycleTotals};
pub use respiration::{CellularRespiration, ElectronTransportChain, ProtonGradient, RespirationOutput};

/// An ordered sequence of reactions sharing one compartment.
pub trait Pathway {
    fn name(&self) -> &str;

    fn reactions(&self) -> Vec<&Reaction>;

    fn reactions_mut(&mut self) -> Vec<&mut Reaction>;

    fn enzymes_mut(&mut self) -> Vec<&mut Enzyme> {
        self.reactions_mut()
            .into_iter()
            .map(|reaction| &mut reaction.enzyme)
            .collect()
    }

    /// Activates the named enzyme and everything downstream of it.
    fn activate_enzyme(&mut self, name: &str) -> Result<Vec<String>, MetabolismError> {
        enzyme::cascade_activation(self.enzymes_mut(), name)
    }

    fn deactivate_enzyme(&mut self, name: &str) -> Result<(), MetabolismError> {
        enzyme::deactivate(self.enzymes_mut(), name)
    }
}

pub(crate) fn report_executed(reporter: &mut dyn Reporter, pathway: &str, outcome: &ReactionOutcome) {
    reporter.emit(SimulationEvent::ReactionExecuted {
        pathway: pathway.to_string(),
        reaction: outcome.reaction.clone(),
        rate: outcome.rate,
        consumed: outcome.consumed.clone(),
        produced: outcome.produced.clone(),
    });
}
