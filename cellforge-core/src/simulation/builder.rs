use crate::{
    compartment,
    error::MetabolismError,
    logger::TimeSeriesLogger,
    observer::{AdenineBalanceObserver, EnergyBalanceObserver},
    pathway::{CellularRespiration, Glycolysis, ProtonGradient},
    reporter::{LogReporter, Reporter},
    simulation::{
        engine::SimulationController,
        state::{CellState, SimulationState},
    },
};
use cellforge_schemas::{
    compartment::CompartmentKind, config::SimulationConfig, file_formats::SimulationFile,
    metabolite::SeedRegistry,
};

/// A fluent builder for constructing a `SimulationController`.
///
/// Every component has a default: the standard configuration, the built-in
/// seeds for each compartment and a reporter that forwards to the `log`
/// facade. Seeds given here are overlaid on the built-in ones.
#[derive(Default)]
pub struct SimulationBuilder {
    config: Option<SimulationConfig>,
    cytoplasm_seed: Option<SeedRegistry>,
    mitochondrion_seed: Option<SeedRegistry>,
    reporter: Option<Box<dyn Reporter>>,
    log_path: Option<String>,
}

impl SimulationBuilder {
    /// Creates a new, empty `SimulationBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_seed(mut self, kind: CompartmentKind, seed: SeedRegistry) -> Self {
        match kind {
            CompartmentKind::Cytoplasm => self.cytoplasm_seed = Some(seed),
            CompartmentKind::Mitochondrion => self.mitochondrion_seed = Some(seed),
        }
        self
    }

    pub fn with_cytoplasm_seed(self, seed: SeedRegistry) -> Self {
        self.with_seed(CompartmentKind::Cytoplasm, seed)
    }

    pub fn with_mitochondrion_seed(self, seed: SeedRegistry) -> Self {
        self.with_seed(CompartmentKind::Mitochondrion, seed)
    }

    /// Applies everything a setup file specifies.
    pub fn with_simulation_file(mut self, file: SimulationFile) -> Self {
        self.config = Some(file.config);
        if let Some(seed) = file.cytoplasm {
            self.cytoplasm_seed = Some(seed);
        }
        if let Some(seed) = file.mitochondrion {
            self.mitochondrion_seed = Some(seed);
        }
        self
    }

    pub fn with_reporter<R: Reporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Configures the simulation to write state snapshots to the specified CSV file.
    pub fn with_timeseries_logging_to_file(mut self, path: &str) -> Self {
        self.log_path = Some(path.to_string());
        self
    }

    /// Consumes the builder and returns a ready `SimulationController`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for out-of-range configuration values,
    /// `InvalidSeed` for inconsistent seeds, and `FileIO` if the time-series
    /// file cannot be created.
    pub fn build(self) -> Result<SimulationController, MetabolismError> {
        let config = self.config.unwrap_or_default();
        validate_config(&config)?;

        let cell = CellState {
            cytoplasm: compartment::build_pool(
                CompartmentKind::Cytoplasm,
                self.cytoplasm_seed.as_ref(),
            )?,
            mitochondrion: compartment::build_pool(
                CompartmentKind::Mitochondrion,
                self.mitochondrion_seed.as_ref(),
            )?,
            proton_gradient: ProtonGradient::default(),
        };

        let logger = match self.log_path {
            Some(path) => Some(
                TimeSeriesLogger::new(&path).map_err(|e| MetabolismError::FileIO(path.clone(), e))?,
            ),
            None => None,
        };

        Ok(SimulationController {
            adenine_observer: AdenineBalanceObserver::new(
                config.adenine_tolerance,
                config.correct_adenine_drift,
            ),
            energy_observer: EnergyBalanceObserver::new(config.energy_tolerance),
            state: SimulationState {
                glycolysis_rate: config.base_glycolysis_rate,
                ..SimulationState::default()
            },
            cell,
            glycolysis: Glycolysis::new(),
            respiration: CellularRespiration::new(),
            reporter: self.reporter.unwrap_or_else(|| Box::new(LogReporter)),
            logger,
            config,
        })
    }
}

pub fn validate_config(config: &SimulationConfig) -> Result<(), MetabolismError> {
    let positive = [
        ("time_step", config.time_step),
        ("max_simulation_time", config.max_simulation_time),
        ("adp_activation_scale", config.adp_activation_scale),
        ("snapshot_interval", config.snapshot_interval),
    ];
    for (name, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(MetabolismError::ConfigError(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }
    }

    let non_negative = [
        ("base_glycolysis_rate", config.base_glycolysis_rate),
        ("low_mitochondrial_adp", config.low_mitochondrial_adp),
        ("adp_transfer_limit", config.adp_transfer_limit),
        ("nadh_shuttle_rate", config.nadh_shuttle_rate),
        ("max_mitochondrial_atp", config.max_mitochondrial_atp),
        ("max_cytoplasmic_atp", config.max_cytoplasmic_atp),
        ("max_mitochondrial_nadh", config.max_mitochondrial_nadh),
        ("max_cytoplasmic_nadh", config.max_cytoplasmic_nadh),
        ("adenine_tolerance", config.adenine_tolerance),
        ("energy_tolerance", config.energy_tolerance),
        ("atp_demand_per_tick", config.atp_demand_per_tick),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(MetabolismError::ConfigError(format!(
                "{} must be non-negative, got {}",
                name, value
            )));
        }
    }

    if !(config.shuttle_efficiency > 0.0 && config.shuttle_efficiency <= 1.0) {
        return Err(MetabolismError::ConfigError(format!(
            "shuttle_efficiency must lie in (0, 1], got {}",
            config.shuttle_efficiency
        )));
    }
    Ok(())
}
