use cellforge_schemas::{result::SimulationStatus, snapshot::StateSnapshot};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

/// Everything the engine has to say about a run. The engine never prints;
/// it hands events to a [`Reporter`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationEvent {
    RunStarted {
        glucose: f64,
    },
    GlucoseClamped {
        requested: f64,
        loaded: f64,
    },
    ReactionExecuted {
        pathway: String,
        reaction: String,
        rate: f64,
        consumed: BTreeMap<String, f64>,
        produced: BTreeMap<String, f64>,
    },
    ReactionBlocked {
        pathway: String,
        reaction: String,
    },
    PathwayStalled {
        pathway: String,
        step: String,
        reason: String,
    },
    PathwayFailed {
        pathway: String,
        message: String,
    },
    CompartmentTransfer {
        metabolite: String,
        from: String,
        to: String,
        amount: f64,
        received: f64,
    },
    AdenineDrift {
        initial: f64,
        current: f64,
        corrected: bool,
    },
    EnergyDrift {
        initial: f64,
        current: f64,
    },
    TickSkipped {
        time: f64,
        error: String,
    },
    StateSnapshot {
        snapshot: StateSnapshot,
    },
    Halted {
        status: SimulationStatus,
        time: f64,
    },
    RunFinished {
        status: SimulationStatus,
        total_atp_produced: f64,
        ticks: u64,
    },
}

impl SimulationEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            SimulationEvent::RunStarted { .. }
            | SimulationEvent::ReactionExecuted { .. }
            | SimulationEvent::CompartmentTransfer { .. }
            | SimulationEvent::StateSnapshot { .. }
            | SimulationEvent::Halted { .. }
            | SimulationEvent::RunFinished { .. } => EventLevel::Info,
            SimulationEvent::ReactionBlocked { .. }
            | SimulationEvent::PathwayStalled { .. }
            | SimulationEvent::AdenineDrift { .. }
            | SimulationEvent::EnergyDrift { .. }
            | SimulationEvent::GlucoseClamped { .. }
            | SimulationEvent::TickSkipped { .. } => EventLevel::Warning,
            SimulationEvent::PathwayFailed { .. } => EventLevel::Error,
        }
    }
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationEvent::RunStarted { glucose } => {
                write!(f, "run started with {:.2} glucose", glucose)
            }
            SimulationEvent::GlucoseClamped { requested, loaded } => write!(
                f,
                "requested {:.2} glucose exceeds cytoplasmic capacity, loaded {:.2}",
                requested, loaded
            ),
            SimulationEvent::ReactionExecuted {
                pathway,
                reaction,
                rate,
                ..
            } => write!(f, "[{}] {} fired at rate {:.4}", pathway, reaction, rate),
            SimulationEvent::ReactionBlocked { pathway, reaction } => {
                write!(f, "[{}] {} is blocked", pathway, reaction)
            }
            SimulationEvent::PathwayStalled {
                pathway,
                step,
                reason,
            } => write!(f, "[{}] stalled at {}: {}", pathway, step, reason),
            SimulationEvent::PathwayFailed { pathway, message } => {
                write!(f, "[{}] failed: {}", pathway, message)
            }
            SimulationEvent::CompartmentTransfer {
                metabolite,
                from,
                to,
                amount,
                received,
            } => write!(
                f,
                "moved {:.3} {} from {} to {} ({:.3} received)",
                amount, metabolite, from, to, received
            ),
            SimulationEvent::AdenineDrift {
                initial,
                current,
                corrected,
            } => write!(
                f,
                "adenine nucleotide total drifted from {:.6} to {:.6}{}",
                initial,
                current,
                if *corrected { " (corrected)" } else { "" }
            ),
            SimulationEvent::EnergyDrift { initial, current } => {
                write!(f, "energy state drifted from {:.3} to {:.3}", initial, current)
            }
            SimulationEvent::TickSkipped { time, error } => {
                write!(f, "tick at t={:.2} skipped: {}", time, error)
            }
            SimulationEvent::StateSnapshot { snapshot } => write!(
                f,
                "t={:.2} glucose processed {:.0}, ATP produced {:.2}, proton gradient {:.2}",
                snapshot.simulation_time,
                snapshot.glucose_processed,
                snapshot.total_atp_produced,
                snapshot.proton_gradient
            ),
            SimulationEvent::Halted { status, time } => {
                write!(f, "simulation {} at t={:.2}", status.describe(), time)
            }
            SimulationEvent::RunFinished {
                status,
                total_atp_produced,
                ticks,
            } => write!(
                f,
                "run finished ({}) after {} ticks with {:.2} ATP produced",
                status.describe(),
                ticks,
                total_atp_produced
            ),
        }
    }
}

pub trait Reporter {
    fn emit(&mut self, event: SimulationEvent);
}

/// Forwards events to the `log` facade at the event's level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn emit(&mut self, event: SimulationEvent) {
        match event.level() {
            EventLevel::Info => match event {
                SimulationEvent::ReactionExecuted { .. } => log::debug!("{}", event),
                _ => log::info!("{}", event),
            },
            EventLevel::Warning => log::warn!("{}", event),
            EventLevel::Error => log::error!("{}", event),
        }
    }
}

/// Keeps every event in memory. Clones share the same buffer, so a handle
/// kept by the caller sees what the engine emitted.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    events: Rc<RefCell<Vec<SimulationEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SimulationEvent> {
        self.events.borrow().clone()
    }

    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&SimulationEvent) -> bool,
    {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Reporter for RecordingReporter {
    fn emit(&mut self, event: SimulationEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn emit(&mut self, _event: SimulationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_handles_share_events() {
        let handle = RecordingReporter::new();
        let mut reporter: Box<dyn Reporter> = Box::new(handle.clone());
        reporter.emit(SimulationEvent::RunStarted { glucose: 3.0 });
        reporter.emit(SimulationEvent::TickSkipped {
            time: 0.1,
            error: "short".into(),
        });
        assert_eq!(handle.events().len(), 2);
        assert_eq!(
            handle.count_where(|e| e.level() == EventLevel::Warning),
            1
        );
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = SimulationEvent::PathwayFailed {
            pathway: "glycolysis".into(),
            message: "no adp".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "pathway_failed");
        assert_eq!(event.level(), EventLevel::Error);
    }
}
