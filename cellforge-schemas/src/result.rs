use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    #[default]
    Idle,
    Running,
    HaltedNoGlucose,
    HaltedNoOxygen,
    HaltedMaxTime,
    Completed,
}

impl SimulationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SimulationStatus::Idle | SimulationStatus::Running)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SimulationStatus::Idle => "idle",
            SimulationStatus::Running => "running",
            SimulationStatus::HaltedNoGlucose => "halted: glucose exhausted",
            SimulationStatus::HaltedNoOxygen => "halted: oxygen depleted",
            SimulationStatus::HaltedMaxTime => "halted: maximum simulation time reached",
            SimulationStatus::Completed => "completed",
        }
    }
}

/// Where the ATP credited to a run came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AtpBreakdown {
    /// Net glycolytic ATP (yield minus investment).
    pub glycolysis: f64,
    /// GTP from the citric acid cycle converted to ATP.
    pub substrate_level: f64,
    pub oxidative: f64,
}

impl AtpBreakdown {
    pub fn total(&self) -> f64 {
        self.glycolysis + self.substrate_level + self.oxidative
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdenineDrift {
    pub initial_total: f64,
    pub final_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub status: SimulationStatus,
    pub total_atp_produced: f64,
    pub glucose_processed: f64,
    pub glucose_consumed: f64,
    pub pyruvate_produced: f64,
    pub oxygen_remaining: f64,
    pub final_cytoplasm_atp: f64,
    pub final_mitochondrion_atp: f64,
    pub final_cytoplasm_nadh: f64,
    pub final_mitochondrion_nadh: f64,
    pub simulation_time: f64,
    pub ticks: u64,
    pub skipped_ticks: u64,
    pub atp_breakdown: AtpBreakdown,
    pub adenine_drift: Option<AdenineDrift>,
}
