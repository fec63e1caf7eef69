use crate::{config::SimulationConfig, metabolite::SeedRegistry};
use serde::{Deserialize, Serialize};

/// On-disk layout of a simulation setup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationFile {
    pub schema_version: String,
    #[serde(default)]
    pub config: SimulationConfig,
    #[serde(default)]
    pub cytoplasm: Option<SeedRegistry>,
    #[serde(default)]
    pub mitochondrion: Option<SeedRegistry>,
}
