use super::state::{CellState, SimulationState};
use crate::{
    error::MetabolismError,
    logger::TimeSeriesLogger,
    metabolite::MetabolitePool,
    observer::{
        total_adenine_nucleotides, AdenineBalanceObserver, ConservationObserver,
        EnergyBalanceObserver,
    },
    pathway::{CellularRespiration, Glycolysis, GlycolysisOutput, RespirationOutput},
    reporter::{Reporter, SimulationEvent},
};
use cellforge_schemas::{
    compartment::CompartmentKind,
    config::SimulationConfig,
    result::{AdenineDrift, SimulationResult, SimulationStatus},
    snapshot::StateSnapshot,
};

/// Slack for comparing accumulated simulation time against thresholds.
const TIME_EPSILON: f64 = 1e-9;

/// Net ADP phosphorylated by glycolysis per glucose unit (four in the payoff
/// phase less the two released by the investment phase).
const GLYCOLYSIS_ADP_PER_GLUCOSE: f64 = 2.0;

pub struct SimulationController {
    pub(super) config: SimulationConfig,
    pub(super) cell: CellState,
    pub(super) glycolysis: Glycolysis,
    pub(super) respiration: CellularRespiration,
    pub(super) adenine_observer: AdenineBalanceObserver,
    pub(super) energy_observer: EnergyBalanceObserver,
    pub(super) reporter: Box<dyn Reporter>,
    pub(super) logger: Option<TimeSeriesLogger>,
    pub(super) state: SimulationState,
}

/// Pathway output of one tick; folded into the run counters only when the
/// tick completes.
#[derive(Debug, Default)]
struct TickTally {
    glycolysis: GlycolysisOutput,
    glycolysis_failed: bool,
    respiration: RespirationOutput,
}

impl SimulationController {
    /// Sets cytoplasmic glucose to `glucose_amount` and ticks until a halting
    /// condition is reached.
    ///
    /// An amount above the glucose capacity is clamped to it and reported
    /// with a `GlucoseClamped` warning. Each run restarts time and counters;
    /// every other pool carries over from the previous run or `reset`.
    pub fn run(&mut self, glucose_amount: f64) -> Result<SimulationResult, MetabolismError> {
        if !glucose_amount.is_finite() || glucose_amount < 0.0 {
            return Err(MetabolismError::InvalidAmount {
                name: "glucose".to_string(),
                amount: glucose_amount,
            });
        }
        self.begin_run(glucose_amount)?;

        loop {
            // tick returns false once the run has halted
            if !self.tick()? {
                break;
            }
        }

        let result = self.result()?;
        self.reporter.emit(SimulationEvent::RunFinished {
            status: result.status,
            total_atp_produced: result.total_atp_produced,
            ticks: result.ticks,
        });
        Ok(result)
    }

    fn begin_run(&mut self, glucose_amount: f64) -> Result<(), MetabolismError> {
        let glucose = self.cell.cytoplasm.metabolite("glucose")?;
        let glucose_floor = glucose.min_quantity();
        let loaded = glucose_amount
            .min(glucose.max_quantity())
            .max(glucose_floor);
        let current = glucose.quantity() - glucose_floor;
        // emptied first so the new level lands exactly on `loaded`
        self.cell.cytoplasm.change_quantity("glucose", -current)?;
        self.cell.cytoplasm.change_quantity("glucose", loaded - glucose_floor)?;
        if loaded < glucose_amount {
            self.reporter.emit(SimulationEvent::GlucoseClamped {
                requested: glucose_amount,
                loaded,
            });
        }

        self.state = SimulationState {
            status: SimulationStatus::Running,
            glucose_target: loaded.floor() as u64,
            glycolysis_rate: self.config.base_glycolysis_rate,
            next_snapshot_time: self.config.snapshot_interval,
            ..SimulationState::default()
        };
        self.adenine_observer.reset();
        self.energy_observer.reset();
        self.observe()?;

        self.reporter.emit(SimulationEvent::RunStarted { glucose: loaded });
        self.emit_snapshot()
    }

    /// Advances the simulation by one time step. Returns `false` once the
    /// run has halted.
    ///
    /// A glycolysis failure only drops that phase; the rest of the tick still
    /// commits. Any other availability or capacity failure rolls both
    /// compartments back to the start of the tick, which is then counted as
    /// skipped. Time advances either way.
    pub fn tick(&mut self) -> Result<bool, MetabolismError> {
        if self.state.status != SimulationStatus::Running {
            return Ok(false);
        }
        if let Some(status) = self.halt_condition()? {
            self.halt(status)?;
            return Ok(false);
        }

        let checkpoint = self.cell.clone();
        match self.advance() {
            Ok(tally) => self.commit(&tally),
            Err(err) if err.is_recoverable() => {
                self.cell = checkpoint;
                self.state.skipped_ticks += 1;
                self.reporter.emit(SimulationEvent::TickSkipped {
                    time: self.state.simulation_time,
                    error: err.to_string(),
                });
            }
            Err(err) => {
                self.cell = checkpoint;
                return Err(err);
            }
        }

        self.state.ticks += 1;
        self.state.simulation_time = self.state.ticks as f64 * self.config.time_step;
        self.observe()?;

        if self.state.simulation_time + TIME_EPSILON >= self.state.next_snapshot_time {
            self.emit_snapshot()?;
            self.state.next_snapshot_time += self.config.snapshot_interval;
        }
        Ok(true)
    }

    fn halt_condition(&self) -> Result<Option<SimulationStatus>, MetabolismError> {
        let oxygen = self.cell.mitochondrion.total_of(&["oxygen"]);
        if oxygen <= 0.0 {
            return Ok(Some(SimulationStatus::HaltedNoOxygen));
        }

        let target = self.state.glucose_target as f64;
        if target > 0.0 && self.state.glucose_processed >= target {
            return Ok(Some(SimulationStatus::Completed));
        }
        if target == 0.0 || self.cell.cytoplasm.available("glucose")? < 1.0 {
            return Ok(Some(SimulationStatus::HaltedNoGlucose));
        }
        if self.state.simulation_time + TIME_EPSILON >= self.config.max_simulation_time {
            return Ok(Some(SimulationStatus::HaltedMaxTime));
        }
        Ok(None)
    }

    fn halt(&mut self, status: SimulationStatus) -> Result<(), MetabolismError> {
        self.state.status = status;
        self.reporter.emit(SimulationEvent::Halted {
            status,
            time: self.state.simulation_time,
        });
        self.emit_snapshot()
    }

    fn advance(&mut self) -> Result<TickTally, MetabolismError> {
        let mut tally = TickTally::default();

        self.replenish_mitochondrial_adp()?;

        let adp = self.cell.cytoplasm.quantity("adp")?;
        self.state.glycolysis_rate =
            self.config.base_glycolysis_rate * (1.0 + adp / self.config.adp_activation_scale);

        let remaining = (self.state.glucose_target as f64 - self.state.glucose_processed).max(0.0);
        let units = self
            .state
            .glycolysis_rate
            .min(self.cell.cytoplasm.available("glucose")?)
            .min(remaining)
            .floor();
        // a failed glycolysis restores its own pool, so only that phase is lost
        tally.glycolysis = match self
            .glycolysis
            .run(&mut self.cell.cytoplasm, units, &mut *self.reporter)
        {
            Ok(output) => output,
            Err(err) if err.is_recoverable() => {
                tally.glycolysis_failed = true;
                GlycolysisOutput::default()
            }
            Err(err) => return Err(err),
        };

        self.meet_atp_demand()?;
        self.shuttle_nadh()?;

        if self.config.respiration_enabled {
            self.import_pyruvate()?;
            tally.respiration = self.respiration.run(
                &mut self.cell.mitochondrion,
                &mut self.cell.proton_gradient,
                self.config.time_step,
                &mut *self.reporter,
            )?;
        }

        self.enforce_limits()?;
        Ok(tally)
    }

    fn commit(&mut self, tally: &TickTally) {
        let state = &mut self.state;
        if tally.glycolysis_failed {
            state.failed_glycolysis_ticks += 1;
        }
        state.glucose_processed += tally.glycolysis.glucose_consumed;
        state.glucose_consumed += tally.glycolysis.glucose_consumed;
        state.pyruvate_produced += tally.glycolysis.pyruvate_produced;
        state.atp.glycolysis += tally.glycolysis.net_atp();
        state.atp.substrate_level += tally.respiration.substrate_level_atp;
        state.atp.oxidative += tally.respiration.oxidative.atp_produced;
    }

    /// Low mitochondrial ADP pulls a bounded amount from the cytoplasm.
    ///
    /// The cytoplasm keeps back the ADP that glycolysis needs for the glucose
    /// still to be processed; only the surplus is moved.
    fn replenish_mitochondrial_adp(&mut self) -> Result<(), MetabolismError> {
        if self.cell.mitochondrion.quantity("adp")? >= self.config.low_mitochondrial_adp {
            return Ok(());
        }
        let pending = (self.state.glucose_target as f64 - self.state.glucose_processed)
            .max(0.0)
            .min(self.cell.cytoplasm.available("glucose")?)
            .floor();
        let spare = (self.cell.cytoplasm.available("adp")? - pending * GLYCOLYSIS_ADP_PER_GLUCOSE)
            .max(0.0);
        let amount = self
            .config
            .adp_transfer_limit
            .min(spare)
            .min(self.cell.mitochondrion.headroom("adp")?);
        if amount > 0.0 {
            self.transfer(CompartmentKind::Cytoplasm, "adp", amount)?;
        }
        Ok(())
    }

    fn meet_atp_demand(&mut self) -> Result<(), MetabolismError> {
        let cytoplasm = &mut self.cell.cytoplasm;
        let used = self
            .config
            .atp_demand_per_tick
            .min(cytoplasm.available("atp")?)
            .min(cytoplasm.headroom("adp")?);
        if used > 0.0 {
            cytoplasm.consume([("atp", used)])?;
            cytoplasm.produce([("adp", used)])?;
        }
        Ok(())
    }

    /// Cytoplasmic NADH is reoxidized; its reducing equivalents arrive in the
    /// matrix at `shuttle_efficiency`.
    fn shuttle_nadh(&mut self) -> Result<(), MetabolismError> {
        let efficiency = self.config.shuttle_efficiency;
        let offered = self
            .cell
            .cytoplasm
            .available("nadh")?
            .min(self.config.nadh_shuttle_rate);
        if offered <= 0.0 {
            return Ok(());
        }

        let mitochondrion = &mut self.cell.mitochondrion;
        let delivered = (offered * efficiency)
            .min(mitochondrion.available("nad")?)
            .min(mitochondrion.headroom("nadh")?);
        if delivered <= 0.0 {
            return Ok(());
        }
        let oxidized = (delivered / efficiency).min(offered);

        let cytoplasm = &mut self.cell.cytoplasm;
        cytoplasm.consume([("nadh", oxidized)])?;
        cytoplasm.produce([("nad", oxidized)])?;
        mitochondrion.consume([("nad", delivered)])?;
        mitochondrion.produce([("nadh", delivered)])?;

        self.reporter.emit(SimulationEvent::CompartmentTransfer {
            metabolite: "nadh".to_string(),
            from: CompartmentKind::Cytoplasm.to_string(),
            to: CompartmentKind::Mitochondrion.to_string(),
            amount: oxidized,
            received: delivered,
        });
        Ok(())
    }

    fn import_pyruvate(&mut self) -> Result<(), MetabolismError> {
        let amount = self
            .cell
            .cytoplasm
            .available("pyruvate")?
            .min(self.cell.mitochondrion.headroom("pyruvate")?);
        if amount > 0.0 {
            self.transfer(CompartmentKind::Cytoplasm, "pyruvate", amount)?;
        }
        Ok(())
    }

    /// Mitochondrial ATP above its ceiling moves to the cytoplasm, as far as
    /// the cytoplasmic ceiling allows. NADH above its ceiling is reoxidized
    /// in place.
    fn enforce_limits(&mut self) -> Result<(), MetabolismError> {
        let excess = (self.cell.mitochondrion.quantity("atp")? - self.config.max_mitochondrial_atp).max(0.0);
        let room = (self.config.max_cytoplasmic_atp - self.cell.cytoplasm.quantity("atp")?)
            .max(0.0)
            .min(self.cell.cytoplasm.headroom("atp")?);
        let moved = excess.min(room);
        if moved > 0.0 {
            self.transfer(CompartmentKind::Mitochondrion, "atp", moved)?;
        }

        for (kind, ceiling) in [
            (CompartmentKind::Cytoplasm, self.config.max_cytoplasmic_nadh),
            (CompartmentKind::Mitochondrion, self.config.max_mitochondrial_nadh),
        ] {
            let pool = self.cell.pool_mut(kind);
            let excess = (pool.quantity("nadh")? - ceiling)
                .max(0.0)
                .min(pool.headroom("nad")?);
            if excess > 0.0 {
                pool.consume([("nadh", excess)])?;
                pool.produce([("nad", excess)])?;
            }
        }
        Ok(())
    }

    fn transfer(&mut self, from: CompartmentKind, name: &str, amount: f64) -> Result<(), MetabolismError> {
        let (source, destination): (&mut MetabolitePool, &mut MetabolitePool) = match from {
            CompartmentKind::Cytoplasm => (&mut self.cell.cytoplasm, &mut self.cell.mitochondrion),
            CompartmentKind::Mitochondrion => (&mut self.cell.mitochondrion, &mut self.cell.cytoplasm),
        };
        source.transfer_to(destination, name, amount)?;

        self.reporter.emit(SimulationEvent::CompartmentTransfer {
            metabolite: name.to_string(),
            from: source.compartment().to_string(),
            to: destination.compartment().to_string(),
            amount,
            received: amount,
        });
        Ok(())
    }

    fn observe(&mut self) -> Result<(), MetabolismError> {
        let reporter = &mut *self.reporter;
        self.adenine_observer.observe(&mut self.cell, reporter)?;
        self.energy_observer.observe(&mut self.cell, reporter)?;
        Ok(())
    }

    fn emit_snapshot(&mut self) -> Result<(), MetabolismError> {
        let snapshot = self.current_snapshot();
        if let Some(logger) = &mut self.logger {
            logger.log_snapshot(&snapshot)?;
        }
        self.reporter.emit(SimulationEvent::StateSnapshot { snapshot });
        Ok(())
    }

    fn result(&self) -> Result<SimulationResult, MetabolismError> {
        let cytoplasm = &self.cell.cytoplasm;
        let mitochondrion = &self.cell.mitochondrion;

        let adenine_drift = if self.adenine_observer.drift_detected() {
            self.adenine_observer.baseline().map(|initial_total| AdenineDrift {
                initial_total,
                final_total: total_adenine_nucleotides(&self.cell.pools()),
            })
        } else {
            None
        };

        Ok(SimulationResult {
            status: self.state.status,
            total_atp_produced: self.state.total_atp_produced(),
            glucose_processed: self.state.glucose_processed,
            glucose_consumed: self.state.glucose_consumed,
            pyruvate_produced: self.state.pyruvate_produced,
            oxygen_remaining: mitochondrion.total_of(&["oxygen"]),
            final_cytoplasm_atp: cytoplasm.quantity("atp")?,
            final_mitochondrion_atp: mitochondrion.quantity("atp")?,
            final_cytoplasm_nadh: cytoplasm.quantity("nadh")?,
            final_mitochondrion_nadh: mitochondrion.quantity("nadh")?,
            simulation_time: self.state.simulation_time,
            ticks: self.state.ticks,
            skipped_ticks: self.state.skipped_ticks,
            atp_breakdown: self.state.atp,
            adenine_drift,
        })
    }

    /// Returns every pool to its seed, zeroes the gradient, time and
    /// counters, and forgets observer baselines.
    pub fn reset(&mut self) -> Result<(), MetabolismError> {
        self.cell.cytoplasm.reset()?;
        self.cell.mitochondrion.reset()?;
        self.cell.proton_gradient.reset();
        self.state = SimulationState {
            glycolysis_rate: self.config.base_glycolysis_rate,
            ..SimulationState::default()
        };
        self.adenine_observer.reset();
        self.energy_observer.reset();
        Ok(())
    }

    /// Quantity of a cytoplasmic metabolite.
    pub fn get_metabolite_quantity(&self, name: &str) -> Result<f64, MetabolismError> {
        self.cell.cytoplasm.quantity(name)
    }

    pub fn get_compartment_quantity(
        &self,
        kind: CompartmentKind,
        name: &str,
    ) -> Result<f64, MetabolismError> {
        self.cell.pool(kind).quantity(name)
    }

    pub fn current_snapshot(&self) -> StateSnapshot {
        self.state.snapshot(&self.cell)
    }

    pub fn get_status(&self) -> SimulationStatus {
        self.state.status
    }

    pub fn get_state(&self) -> &SimulationState {
        &self.state
    }

    pub fn get_cell(&self) -> &CellState {
        &self.cell
    }

    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn glycolysis_mut(&mut self) -> &mut Glycolysis {
        &mut self.glycolysis
    }

    pub fn respiration_mut(&mut self) -> &mut CellularRespiration {
        &mut self.respiration
    }
}
