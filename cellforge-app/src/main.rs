use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod workflow;

/// Simulates glucose catabolism in a two-compartment cell.
#[derive(Debug, Parser)]
#[command(name = "cellforge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full controller until glucose, oxygen or time runs out.
    Run {
        /// Glucose units loaded into the cytoplasm.
        #[arg(long, default_value_t = 10.0)]
        glucose: f64,
        /// YAML setup file with configuration and seed overrides.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write state snapshots to this CSV file.
        #[arg(long)]
        log_csv: Option<PathBuf>,
        /// Write a timestamped snapshot CSV into this directory.
        #[arg(long, conflicts_with = "log_csv")]
        log_dir: Option<PathBuf>,
        /// Stop at pyruvate; skip the citric acid cycle and electron transport.
        #[arg(long)]
        no_respiration: bool,
        /// Print the result as JSON instead of the summary report.
        #[arg(long)]
        json: bool,
    },
    /// Run glycolysis alone on a fresh cytoplasm.
    Glycolysis {
        #[arg(long, default_value_t = 1.0)]
        glucose: f64,
    },
    /// Turn the citric acid cycle on a fresh mitochondrial matrix.
    Krebs {
        #[arg(long, default_value_t = 3)]
        cycles: u64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            glucose,
            config,
            log_csv,
            log_dir,
            no_respiration,
            json,
        } => {
            let log_path = match (log_csv, log_dir) {
                (Some(path), _) => Some(path),
                (None, Some(dir)) => Some(workflow::timestamped_log_path(&dir)?),
                (None, None) => None,
            };
            let options = workflow::RunOptions {
                glucose,
                config_path: config,
                log_path,
                respiration: !no_respiration,
            };
            let report = workflow::run_simulation(&options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                workflow::print_summary_report(&report);
            }
        }
        Command::Glycolysis { glucose } => workflow::run_glycolysis(glucose)?,
        Command::Krebs { cycles } => workflow::run_krebs(cycles)?,
    }
    Ok(())
}
