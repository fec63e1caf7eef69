pub mod analysis;
pub mod compartment;
pub mod enzyme;
pub mod error;
pub mod kinetics;
pub mod logger;
pub mod metabolite;
pub mod observer;
pub mod pathway;
pub mod reaction;
pub mod reporter;
pub mod simulation;

pub use error::MetabolismError;
pub use metabolite::{Metabolite, MetabolitePool};
pub use simulation::{builder::SimulationBuilder, engine::SimulationController};
