use crate::config;
use anyhow::{bail, Context, Result};
use cellforge_core::{
    analysis::{self, RunSummary},
    compartment,
    pathway::{CitricAcidCycle, Glycolysis, GlycolysisOutput},
    reporter::{LogReporter, RecordingReporter, Reporter, SimulationEvent},
    SimulationBuilder,
};
use cellforge_schemas::{
    compartment::CompartmentKind, config::SimulationConfig, file_formats::SimulationFile,
    result::SimulationResult,
};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub glucose: f64,
    pub config_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub respiration: bool,
}

/// Everything the driver reports about one controller run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub result: SimulationResult,
    pub atp_by_pathway: BTreeMap<String, f64>,
    pub blocked_reactions: BTreeMap<String, u64>,
    pub timeseries: Option<RunSummary>,
}

/// Logs every event and keeps a copy for the ATP breakdown.
struct TeeReporter {
    recorder: RecordingReporter,
    log: LogReporter,
}

impl Reporter for TeeReporter {
    fn emit(&mut self, event: SimulationEvent) {
        self.recorder.emit(event.clone());
        self.log.emit(event);
    }
}

pub fn timestamped_log_path(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    Ok(dir.join(format!(
        "run_{}.csv",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    )))
}

/// Builds a controller from the options, runs it and gathers the report.
pub fn run_simulation(options: &RunOptions) -> Result<RunReport> {
    let mut file = match &options.config_path {
        Some(path) => config::load_simulation_file(path)?,
        None => SimulationFile {
            schema_version: config::SUPPORTED_SCHEMA_VERSION.to_string(),
            config: SimulationConfig::default(),
            cytoplasm: None,
            mitochondrion: None,
        },
    };
    // --no-respiration only ever switches respiration off
    file.config.respiration_enabled &= options.respiration;
    let mut builder = SimulationBuilder::new().with_simulation_file(file);

    let recorder = RecordingReporter::new();
    builder = builder.with_reporter(TeeReporter {
        recorder: recorder.clone(),
        log: LogReporter,
    });

    let log_path = match &options.log_path {
        Some(path) => Some(
            path.to_str()
                .with_context(|| format!("Log path {:?} is not valid UTF-8", path))?
                .to_string(),
        ),
        None => None,
    };
    if let Some(path) = &log_path {
        builder = builder.with_timeseries_logging_to_file(path);
    }

    let mut controller = builder.build().context("Failed to build the simulation")?;
    let result = controller
        .run(options.glucose)
        .context("Simulation aborted")?;
    drop(controller);

    let events = recorder.events();
    let blocked_reactions = analysis::reaction_counts(&events)
        .into_iter()
        .filter(|(_, (_, blocked))| *blocked > 0)
        .map(|(name, (_, blocked))| (name, blocked))
        .collect();
    let timeseries = match &log_path {
        Some(path) => Some(
            analysis::summarize_timeseries(path)
                .with_context(|| format!("Failed to read back {}", path))?,
        ),
        None => None,
    };

    Ok(RunReport {
        result,
        atp_by_pathway: analysis::atp_breakdown(&events),
        blocked_reactions,
        timeseries,
    })
}

/// Runs glycolysis once over a freshly seeded cytoplasm loaded with
/// `glucose`.
pub fn glycolysis_output(glucose: f64) -> Result<GlycolysisOutput> {
    let mut pool = compartment::build_pool(CompartmentKind::Cytoplasm, None)?;
    let headroom = pool.headroom("glucose")?;
    if glucose > headroom {
        bail!(
            "Requested {:.2} glucose exceeds the cytoplasmic glucose capacity of {:.2}",
            glucose,
            headroom
        );
    }
    if glucose > 0.0 {
        pool.produce([("glucose", glucose)])?;
    }
    Glycolysis::new()
        .run(&mut pool, glucose, &mut LogReporter)
        .context("Glycolysis failed")
}

pub fn run_glycolysis(glucose: f64) -> Result<()> {
    let output = glycolysis_output(glucose)?;

    println!("\n--- [Glycolysis] ---");
    println!("  - Glucose consumed:  {:>8.2}", output.glucose_consumed);
    println!("  - Pyruvate produced: {:>8.2}", output.pyruvate_produced);
    println!("  - ATP invested:      {:>8.2}", output.atp_invested);
    println!("  - ATP produced:      {:>8.2}", output.atp_produced);
    println!("  - Net ATP:           {:>8.2}", output.net_atp());
    println!("  - NADH produced:     {:>8.2}", output.nadh_produced);
    Ok(())
}

pub fn run_krebs(cycles: u64) -> Result<()> {
    let mut pool = compartment::build_pool(CompartmentKind::Mitochondrion, None)?;
    let mut cycle = CitricAcidCycle::new();
    if cycles > 0 {
        cycle.add_substrate(&mut pool, "acetyl_coa", cycles as f64)?;
    }

    println!("\n--- [Citric Acid Cycle] ---");
    let mut reporter = LogReporter;
    for (turn, result) in cycle
        .cycles(&mut pool, &mut reporter, Some(cycles))
        .enumerate()
    {
        let result = result.context("Citric acid cycle failed")?;
        println!(
            "  - Turn {:>3}: {} steps, NADH {:.2}, FADH2 {:.2}, GTP {:.2}, CO2 {:.2}{}",
            turn + 1,
            result.steps_completed,
            result.nadh,
            result.fadh2,
            result.gtp,
            result.co2,
            if result.completed { "" } else { " (stalled)" }
        );
    }

    let totals = cycle.totals();
    println!("----------------------------------------");
    println!(
        "  Completed {} turns: NADH {:.2}, FADH2 {:.2}, GTP {:.2}, CO2 {:.2}",
        totals.cycles_completed, totals.nadh, totals.fadh2, totals.gtp, totals.co2
    );
    Ok(())
}

pub fn print_summary_report(report: &RunReport) {
    let result = &report.result;

    println!("\n\n--- [Simulation Summary Report] ---");
    println!("========================================");
    println!("Outcome: {}", result.status.describe());
    println!(
        "Simulated Time: {:.2} ({} ticks, {} skipped)",
        result.simulation_time, result.ticks, result.skipped_ticks
    );
    println!("----------------------------------------");

    println!("\nCarbon Flow:");
    println!("  - Glucose Processed:        {:>10.2}", result.glucose_processed);
    println!("  - Pyruvate Produced:        {:>10.2}", result.pyruvate_produced);
    println!("  - Oxygen Remaining:         {:>10.2}", result.oxygen_remaining);

    println!("\nATP Production:");
    println!("  - Glycolysis (net):         {:>10.2}", result.atp_breakdown.glycolysis);
    println!("  - Substrate Level (GTP):    {:>10.2}", result.atp_breakdown.substrate_level);
    println!("  - Oxidative Phosphorylation:{:>10.2}", result.atp_breakdown.oxidative);
    println!("  --------------------------------------");
    println!("  - Total:                    {:>10.2}", result.total_atp_produced);

    if !report.atp_by_pathway.is_empty() {
        println!("\nNet ATP by Pathway (from reaction events):");
        for (pathway, atp) in &report.atp_by_pathway {
            println!("  - {:<26}{:>10.2}", pathway, atp);
        }
    }

    println!("\nFinal Cofactor Levels:");
    println!(
        "  - Cytoplasm:     ATP {:>8.2} | NADH {:>8.2}",
        result.final_cytoplasm_atp, result.final_cytoplasm_nadh
    );
    println!(
        "  - Mitochondrion: ATP {:>8.2} | NADH {:>8.2}",
        result.final_mitochondrion_atp, result.final_mitochondrion_nadh
    );

    if let Some(drift) = &result.adenine_drift {
        println!(
            "\nWarning: adenine nucleotide total drifted from {:.6} to {:.6}",
            drift.initial_total, drift.final_total
        );
    }
    if !report.blocked_reactions.is_empty() {
        println!("\nBlocked Reactions:");
        for (reaction, count) in &report.blocked_reactions {
            println!("  - {}: {} times", reaction, count);
        }
    }
    if let Some(summary) = &report.timeseries {
        println!(
            "\nTime Series: {} snapshots, peak cytoplasmic ATP {:.2}, final proton gradient {:.2}",
            summary.snapshots, summary.peak_cytoplasm_atp, summary.final_proton_gradient
        );
    }
    println!("========================================");
}
