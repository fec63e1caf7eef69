use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time view of both compartments, emitted periodically during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub simulation_time: f64,
    pub glucose_processed: f64,
    pub total_atp_produced: f64,
    pub proton_gradient: f64,
    pub cytoplasm: BTreeMap<String, f64>,
    pub mitochondrion: BTreeMap<String, f64>,
}
