use crate::{error::MetabolismError, logger::SnapshotRow, reporter::SimulationEvent};
use cellforge_schemas::snapshot::StateSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline figures recovered from a time-series CSV.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub snapshots: usize,
    pub duration: f64,
    pub glucose_processed: f64,
    pub total_atp_produced: f64,
    pub peak_cytoplasm_atp: f64,
    pub min_oxygen: Option<f64>,
    pub final_proton_gradient: f64,
}

pub fn load_timeseries(log_path: &str) -> Result<Vec<StateSnapshot>, MetabolismError> {
    let mut reader = csv::Reader::from_path(log_path)
        .map_err(|e| MetabolismError::CsvError(log_path.to_string(), e))?;

    let mut snapshots = Vec::new();
    for result in reader.deserialize() {
        let record: SnapshotRow =
            result.map_err(|e| MetabolismError::CsvError(log_path.to_string(), e))?;
        snapshots.push(record.into_snapshot()?);
    }
    Ok(snapshots)
}

pub fn summarize(snapshots: &[StateSnapshot]) -> RunSummary {
    let mut summary = RunSummary {
        snapshots: snapshots.len(),
        ..RunSummary::default()
    };

    for snapshot in snapshots {
        if let Some(atp) = snapshot.cytoplasm.get("atp") {
            summary.peak_cytoplasm_atp = summary.peak_cytoplasm_atp.max(*atp);
        }
        if let Some(oxygen) = snapshot.mitochondrion.get("oxygen") {
            summary.min_oxygen = Some(summary.min_oxygen.map_or(*oxygen, |m| m.min(*oxygen)));
        }
    }
    if let Some(last) = snapshots.last() {
        summary.duration = last.simulation_time;
        summary.glucose_processed = last.glucose_processed;
        summary.total_atp_produced = last.total_atp_produced;
        summary.final_proton_gradient = last.proton_gradient;
    }
    summary
}

pub fn summarize_timeseries(log_path: &str) -> Result<RunSummary, MetabolismError> {
    Ok(summarize(&load_timeseries(log_path)?))
}

/// Net ATP (produced minus consumed) per pathway over the executed reactions.
pub fn atp_breakdown(events: &[SimulationEvent]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for event in events {
        if let SimulationEvent::ReactionExecuted {
            pathway,
            consumed,
            produced,
            ..
        } = event
        {
            let net = produced.get("atp").copied().unwrap_or(0.0)
                - consumed.get("atp").copied().unwrap_or(0.0);
            *totals.entry(pathway.clone()).or_insert(0.0) += net;
        }
    }
    totals
}

/// How often each reaction fired and how often it was blocked.
pub fn reaction_counts(events: &[SimulationEvent]) -> BTreeMap<String, (u64, u64)> {
    let mut counts: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for event in events {
        match event {
            SimulationEvent::ReactionExecuted { reaction, .. } => {
                counts.entry(reaction.clone()).or_default().0 += 1;
            }
            SimulationEvent::ReactionBlocked { reaction, .. } => {
                counts.entry(reaction.clone()).or_default().1 += 1;
            }
            _ => {}
        }
    }
    counts
}
