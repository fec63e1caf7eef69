use cellforge_schemas::snapshot::StateSnapshot;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// One CSV row per state snapshot. Compartment contents are stored as JSON
/// objects so the column set does not depend on which metabolites exist.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub simulation_time: f64,
    pub glucose_processed: f64,
    pub total_atp_produced: f64,
    pub proton_gradient: f64,
    pub cytoplasm_json: String,
    pub mitochondrion_json: String,
}

impl SnapshotRow {
    pub fn into_snapshot(self) -> Result<StateSnapshot, serde_json::Error> {
        Ok(StateSnapshot {
            simulation_time: self.simulation_time,
            glucose_processed: self.glucose_processed,
            total_atp_produced: self.total_atp_produced,
            proton_gradient: self.proton_gradient,
            cytoplasm: serde_json::from_str(&self.cytoplasm_json)?,
            mitochondrion: serde_json::from_str(&self.mitochondrion_json)?,
        })
    }
}

pub struct TimeSeriesLogger {
    writer: Writer<fs::File>,
}

impl TimeSeriesLogger {
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_snapshot(&mut self, snapshot: &StateSnapshot) -> Result<(), anyhow::Error> {
        let entry = SnapshotRow {
            simulation_time: snapshot.simulation_time,
            glucose_processed: snapshot.glucose_processed,
            total_atp_produced: snapshot.total_atp_produced,
            proton_gradient: snapshot.proton_gradient,
            cytoplasm_json: serde_json::to_string(&snapshot.cytoplasm)?,
            mitochondrion_json: serde_json::to_string(&snapshot.mitochondrion)?,
        };

        self.writer.serialize(entry)?;
        self.writer.flush()?;
        Ok(())
    }
}
