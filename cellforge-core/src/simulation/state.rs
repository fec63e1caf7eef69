use crate::{metabolite::MetabolitePool, pathway::ProtonGradient};
use cellforge_schemas::{
    compartment::CompartmentKind,
    result::{AtpBreakdown, SimulationStatus},
    snapshot::StateSnapshot,
};

/// Everything physical: both compartments and the membrane gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub cytoplasm: MetabolitePool,
    pub mitochondrion: MetabolitePool,
    pub proton_gradient: ProtonGradient,
}

impl CellState {
    pub fn pool(&self, kind: CompartmentKind) -> &MetabolitePool {
        match kind {
            CompartmentKind::Cytoplasm => &self.cytoplasm,
            CompartmentKind::Mitochondrion => &self.mitochondrion,
        }
    }

    pub fn pool_mut(&mut self, kind: CompartmentKind) -> &mut MetabolitePool {
        match kind {
            CompartmentKind::Cytoplasm => &mut self.cytoplasm,
            CompartmentKind::Mitochondrion => &mut self.mitochondrion,
        }
    }

    pub fn pools(&self) -> [&MetabolitePool; 2] {
        [&self.cytoplasm, &self.mitochondrion]
    }
}

/// Bookkeeping for the current run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    pub status: SimulationStatus,
    pub simulation_time: f64,
    pub ticks: u64,
    pub skipped_ticks: u64,
    /// Ticks that committed without their glycolysis phase.
    pub failed_glycolysis_ticks: u64,
    pub glucose_target: u64,
    pub glucose_processed: f64,
    pub glucose_consumed: f64,
    pub pyruvate_produced: f64,
    pub atp: AtpBreakdown,
    pub glycolysis_rate: f64,
    pub next_snapshot_time: f64,
}

impl SimulationState {
    pub fn total_atp_produced(&self) -> f64 {
        self.atp.total()
    }

    pub fn snapshot(&self, cell: &CellState) -> StateSnapshot {
        StateSnapshot {
            simulation_time: self.simulation_time,
            glucose_processed: self.glucose_processed,
            total_atp_produced: self.total_atp_produced(),
            proton_gradient: cell.proton_gradient.value(),
            cytoplasm: cell.cytoplasm.quantities(),
            mitochondrion: cell.mitochondrion.quantities(),
        }
    }
}
