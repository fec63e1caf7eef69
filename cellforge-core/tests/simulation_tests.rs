//! End-to-end tests of the simulation controller.
//!
//! Each test builds a controller through `SimulationBuilder`, runs it to a
//! halt and checks the result against the conditions that ended the run.

use cellforge_core::analysis::summarize_timeseries;
use cellforge_core::observer::total_adenine_nucleotides;
use cellforge_core::pathway::Pathway;
use cellforge_core::reporter::{NullReporter, RecordingReporter, SimulationEvent};
use cellforge_core::{MetabolismError, SimulationBuilder, SimulationController};
use cellforge_schemas::compartment::CompartmentKind;
use cellforge_schemas::config::SimulationConfig;
use cellforge_schemas::metabolite::SeedRegistry;
use cellforge_schemas::result::SimulationStatus;

fn create_controller() -> SimulationController {
    SimulationBuilder::new()
        .with_reporter(NullReporter)
        .build()
        .unwrap()
}

fn short_config(max_simulation_time: f64) -> SimulationConfig {
    SimulationConfig {
        time_step: 0.1,
        max_simulation_time,
        ..SimulationConfig::default()
    }
}

// ============================================================================
// Halting conditions
// ============================================================================

#[test]
fn test_run_completes_requested_glucose() {
    let mut controller = create_controller();
    let result = controller.run(5.0).unwrap();

    assert_eq!(result.status, SimulationStatus::Completed);
    assert_eq!(result.glucose_processed, 5.0);
    assert_eq!(result.pyruvate_produced, 10.0);
    assert_eq!(result.atp_breakdown.glycolysis, 10.0);
    assert!(result.total_atp_produced >= result.atp_breakdown.glycolysis);
    assert!(result.oxygen_remaining < 1000.0);
    assert_eq!(controller.get_status(), SimulationStatus::Completed);
}

#[test]
fn test_zero_glucose_halts_immediately() {
    let mut controller = create_controller();
    let result = controller.run(0.0).unwrap();
    assert_eq!(result.status, SimulationStatus::HaltedNoGlucose);
    assert_eq!(result.ticks, 0);
    assert_eq!(result.total_atp_produced, 0.0);
}

#[test]
fn test_fractional_glucose_below_one_unit_halts() {
    let mut controller = create_controller();
    let result = controller.run(0.5).unwrap();
    assert_eq!(result.status, SimulationStatus::HaltedNoGlucose);
    assert_eq!(result.ticks, 0);
    assert_eq!(result.glucose_processed, 0.0);
}

#[test]
fn test_negative_glucose_is_rejected() {
    let mut controller = create_controller();
    assert!(matches!(
        controller.run(-1.0),
        Err(MetabolismError::InvalidAmount { .. })
    ));
    assert_eq!(controller.get_status(), SimulationStatus::Idle);
}

#[test]
fn test_missing_oxygen_halts_the_run() {
    let mut controller = SimulationBuilder::new()
        .with_mitochondrion_seed(SeedRegistry::new().with("oxygen", 0.0, 1000.0))
        .with_reporter(NullReporter)
        .build()
        .unwrap();

    let result = controller.run(10.0).unwrap();
    assert_eq!(result.status, SimulationStatus::HaltedNoOxygen);
    assert_eq!(result.ticks, 0);
    assert_eq!(result.oxygen_remaining, 0.0);
}

#[test]
fn test_max_time_halts_the_run() {
    let mut controller = SimulationBuilder::new()
        .with_config(short_config(0.3))
        .with_reporter(NullReporter)
        .build()
        .unwrap();

    let result = controller.run(100.0).unwrap();
    assert_eq!(result.status, SimulationStatus::HaltedMaxTime);
    assert_eq!(result.ticks, 3);
    assert_eq!(result.glucose_processed, 3.0);
    assert!((result.simulation_time - 0.3).abs() < 1e-9);
}

// ============================================================================
// Glucose loading
// ============================================================================

#[test]
fn test_glucose_above_capacity_is_clamped() {
    let reporter = RecordingReporter::new();
    let mut controller = SimulationBuilder::new()
        .with_config(short_config(0.5))
        .with_reporter(reporter.clone())
        .build()
        .unwrap();

    let result = controller.run(1500.0).unwrap();
    assert_eq!(result.status, SimulationStatus::HaltedMaxTime);
    assert_eq!(controller.get_state().glucose_target, 1000);
    assert_eq!(
        controller.get_metabolite_quantity("glucose").unwrap(),
        1000.0 - result.glucose_processed
    );

    let clamped: Vec<_> = reporter
        .events()
        .into_iter()
        .filter_map(|e| match e {
            SimulationEvent::GlucoseClamped { requested, loaded } => Some((requested, loaded)),
            _ => None,
        })
        .collect();
    assert_eq!(clamped, vec![(1500.0, 1000.0)]);
    assert!(reporter.events().iter().any(|e| {
        matches!(e, SimulationEvent::RunStarted { glucose } if *glucose == 1000.0)
    }));
}

#[test]
fn test_second_run_sets_glucose_instead_of_adding() {
    let mut controller = SimulationBuilder::new()
        .with_config(short_config(0.5))
        .with_reporter(NullReporter)
        .build()
        .unwrap();

    let first = controller.run(900.0).unwrap();
    assert_eq!(first.status, SimulationStatus::HaltedMaxTime);
    assert!(controller.get_metabolite_quantity("glucose").unwrap() > 800.0);

    let second = controller.run(200.0).unwrap();
    assert_eq!(second.status, SimulationStatus::HaltedMaxTime);
    assert_eq!(
        controller.get_metabolite_quantity("glucose").unwrap(),
        200.0 - second.glucose_processed
    );
}

// ============================================================================
// Tick behaviour
// ============================================================================

#[test]
fn test_failed_glycolysis_drops_only_that_phase() {
    // without ADP the payoff phase cannot complete a single glucose unit
    let reporter = RecordingReporter::new();
    let mut controller = SimulationBuilder::new()
        .with_config(short_config(1.0))
        .with_cytoplasm_seed(
            SeedRegistry::new()
                .with("adp", 0.0, 1000.0)
                .with("nadh", 10.0, 1000.0),
        )
        .with_reporter(reporter.clone())
        .build()
        .unwrap();

    let result = controller.run(5.0).unwrap();
    assert_eq!(result.status, SimulationStatus::HaltedMaxTime);
    assert_eq!(result.ticks, 10);
    assert_eq!(result.skipped_ticks, 0);
    assert_eq!(controller.get_state().failed_glycolysis_ticks, 10);
    assert_eq!(result.glucose_processed, 0.0);
    assert_eq!(controller.get_metabolite_quantity("glucose").unwrap(), 5.0);
    assert_eq!(controller.get_metabolite_quantity("atp").unwrap(), 100.0);
    assert_eq!(
        reporter.count_where(|e| matches!(e, SimulationEvent::PathwayFailed { .. })),
        10
    );
    assert_eq!(
        reporter.count_where(|e| matches!(e, SimulationEvent::TickSkipped { .. })),
        0
    );

    // the NADH shuttle still ran in the ticks whose glycolysis failed
    assert!(controller.get_metabolite_quantity("nadh").unwrap() < 1e-9);
}

#[test]
fn test_deactivated_enzyme_stops_glycolysis() {
    let mut controller = SimulationBuilder::new()
        .with_config(short_config(0.5))
        .with_reporter(NullReporter)
        .build()
        .unwrap();
    controller
        .glycolysis_mut()
        .deactivate_enzyme("hexokinase")
        .unwrap();

    let result = controller.run(5.0).unwrap();
    assert_eq!(result.status, SimulationStatus::HaltedMaxTime);
    assert_eq!(controller.get_state().failed_glycolysis_ticks, result.ticks);
    assert_eq!(result.skipped_ticks, 0);
    assert_eq!(result.glucose_processed, 0.0);

    controller.reset().unwrap();
    let activated = controller
        .glycolysis_mut()
        .activate_enzyme("hexokinase")
        .unwrap();
    assert!(activated.contains(&"phosphoglucose_isomerase".to_string()));
    let result = controller.run(2.0).unwrap();
    assert_eq!(result.status, SimulationStatus::Completed);
}

#[test]
fn test_default_run_keeps_glycolysis_supplied_with_adp() {
    let mut controller = create_controller();
    let result = controller.run(50.0).unwrap();

    assert_eq!(result.status, SimulationStatus::Completed);
    assert_eq!(result.glucose_processed, 50.0);
    assert_eq!(result.skipped_ticks, 0);
    assert_eq!(controller.get_state().failed_glycolysis_ticks, 0);
    assert!(result.ticks <= 50, "took {} ticks", result.ticks);
}

#[test]
fn test_adp_raises_glycolysis_rate() {
    let mut controller = SimulationBuilder::new()
        .with_config(short_config(0.1))
        .with_cytoplasm_seed(SeedRegistry::new().with("adp", 500.0, 1000.0))
        .with_reporter(NullReporter)
        .build()
        .unwrap();

    let result = controller.run(10.0).unwrap();
    assert_eq!(result.ticks, 1);
    assert_eq!(controller.get_state().glycolysis_rate, 2.0);
    assert_eq!(result.glucose_processed, 2.0);
}

#[test]
fn test_tick_without_a_run_does_nothing() {
    let mut controller = create_controller();
    assert!(!controller.tick().unwrap());
    assert_eq!(controller.get_state().ticks, 0);
}

#[test]
fn test_without_respiration_pyruvate_accumulates() {
    let config = SimulationConfig {
        respiration_enabled: false,
        ..SimulationConfig::default()
    };
    let mut controller = SimulationBuilder::new()
        .with_config(config)
        .with_reporter(NullReporter)
        .build()
        .unwrap();

    let result = controller.run(3.0).unwrap();
    assert_eq!(result.status, SimulationStatus::Completed);
    assert_eq!(controller.get_metabolite_quantity("pyruvate").unwrap(), 6.0);
    assert_eq!(result.atp_breakdown.oxidative, 0.0);
    assert_eq!(result.atp_breakdown.substrate_level, 0.0);
}

// ============================================================================
// Conservation, reset and reporting
// ============================================================================

#[test]
fn test_adenine_nucleotides_are_conserved() {
    let mut controller = create_controller();
    let before = total_adenine_nucleotides(&controller.get_cell().pools());

    let result = controller.run(5.0).unwrap();
    let after = total_adenine_nucleotides(&controller.get_cell().pools());

    assert!(result.adenine_drift.is_none(), "unexpected drift: {:?}", result.adenine_drift);
    assert!(
        (after - before).abs() < 1e-6,
        "adenine total moved from {} to {}",
        before,
        after
    );
}

#[test]
fn test_reset_restores_seeds() {
    let mut controller = create_controller();
    controller.run(5.0).unwrap();
    assert_ne!(controller.get_metabolite_quantity("atp").unwrap(), 100.0);

    controller.reset().unwrap();
    assert_eq!(controller.get_status(), SimulationStatus::Idle);
    assert_eq!(controller.get_state().ticks, 0);
    assert_eq!(controller.get_metabolite_quantity("glucose").unwrap(), 0.0);
    assert_eq!(controller.get_metabolite_quantity("atp").unwrap(), 100.0);
    assert_eq!(
        controller
            .get_compartment_quantity(CompartmentKind::Mitochondrion, "oxygen")
            .unwrap(),
        1000.0
    );
    assert_eq!(controller.get_cell().proton_gradient.value(), 0.0);
}

#[test]
fn test_run_reports_start_snapshots_and_halt() {
    let reporter = RecordingReporter::new();
    let mut controller = SimulationBuilder::new()
        .with_reporter(reporter.clone())
        .build()
        .unwrap();
    controller.run(5.0).unwrap();

    let started = reporter.count_where(|e| matches!(e, SimulationEvent::RunStarted { .. }));
    let snapshots = reporter.count_where(|e| matches!(e, SimulationEvent::StateSnapshot { .. }));
    let halted = reporter.count_where(|e| {
        matches!(e, SimulationEvent::Halted { status: SimulationStatus::Completed, .. })
    });
    assert_eq!(started, 1);
    assert_eq!(snapshots, 2, "one at start, one at halt");
    assert_eq!(halted, 1);
    assert!(matches!(
        reporter.events().last(),
        Some(SimulationEvent::RunFinished { status: SimulationStatus::Completed, .. })
    ));
    assert!(reporter.count_where(|e| matches!(e, SimulationEvent::ReactionExecuted { .. })) > 0);
}

#[test]
fn test_timeseries_log_can_be_summarized() {
    let path = std::env::temp_dir().join("cellforge_simulation_timeseries.csv");
    let path = path.to_string_lossy().to_string();

    let mut controller = SimulationBuilder::new()
        .with_config(SimulationConfig {
            snapshot_interval: 0.2,
            ..SimulationConfig::default()
        })
        .with_reporter(NullReporter)
        .with_timeseries_logging_to_file(&path)
        .build()
        .unwrap();
    let result = controller.run(5.0).unwrap();
    drop(controller);

    let summary = summarize_timeseries(&path).unwrap();
    // start, t=0.2, t=0.4, halt
    assert_eq!(summary.snapshots, 4);
    assert_eq!(summary.glucose_processed, result.glucose_processed);
    assert!((summary.duration - result.simulation_time).abs() < 1e-9);
    assert!(summary.min_oxygen.is_some());

    let _ = std::fs::remove_file(&path);
}
