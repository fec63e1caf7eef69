use serde::{Deserialize, Serialize};

/// Tunables for the simulation controller. Every field has a default so a
/// configuration file only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub time_step: f64,
    pub max_simulation_time: f64,
    pub base_glycolysis_rate: f64,
    /// ADP level at which the glycolysis rate has doubled.
    pub adp_activation_scale: f64,
    pub low_mitochondrial_adp: f64,
    pub adp_transfer_limit: f64,
    pub nadh_shuttle_rate: f64,
    pub shuttle_efficiency: f64,
    pub max_mitochondrial_atp: f64,
    pub max_cytoplasmic_atp: f64,
    pub max_mitochondrial_nadh: f64,
    pub max_cytoplasmic_nadh: f64,
    pub snapshot_interval: f64,
    pub adenine_tolerance: f64,
    pub energy_tolerance: f64,
    pub correct_adenine_drift: bool,
    pub respiration_enabled: bool,
    pub atp_demand_per_tick: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            max_simulation_time: 20.0,
            base_glycolysis_rate: 1.0,
            adp_activation_scale: 500.0,
            low_mitochondrial_adp: 10.0,
            adp_transfer_limit: 50.0,
            nadh_shuttle_rate: 5.0,
            shuttle_efficiency: 0.67,
            max_mitochondrial_atp: 100.0,
            max_cytoplasmic_atp: 500.0,
            max_mitochondrial_nadh: 50.0,
            max_cytoplasmic_nadh: 100.0,
            snapshot_interval: 1.0,
            adenine_tolerance: 1e-6,
            energy_tolerance: 1e-6,
            correct_adenine_drift: true,
            respiration_enabled: true,
            atp_demand_per_tick: 0.0,
        }
    }
}
