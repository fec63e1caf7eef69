use anyhow::{bail, Context, Result};
use cellforge_schemas::file_formats::SimulationFile;
use std::{fs, path::Path};

/// The setup file layout this build understands.
pub const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

/// Reads a YAML setup file: configuration plus optional per-compartment seeds.
pub fn load_simulation_file(path: &Path) -> Result<SimulationFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read setup file {:?}", path))?;
    let file: SimulationFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML from {:?}", path))?;

    if file.schema_version != SUPPORTED_SCHEMA_VERSION {
        bail!(
            "{:?} declares schema_version {}, expected {}",
            path,
            file.schema_version,
            SUPPORTED_SCHEMA_VERSION
        );
    }
    log::info!("Loaded setup file {:?}", path);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_setup_file() {
        let path = std::env::temp_dir().join("cellforge_setup_test.yaml");
        fs::write(
            &path,
            "schema_version: \"1.0\"\nconfig:\n  time_step: 0.5\ncytoplasm:\n  glucose:\n    quantity: 5.0\n    max_quantity: 50.0\n",
        )
        .unwrap();

        let file = load_simulation_file(&path).unwrap();
        assert_eq!(file.config.time_step, 0.5);
        assert_eq!(file.config.max_simulation_time, 20.0);
        assert_eq!(file.cytoplasm.unwrap().get("glucose").unwrap().quantity, 5.0);
        assert!(file.mitochondrion.is_none());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn bundled_setup_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("setup.yaml");
        let file = load_simulation_file(&path).unwrap();
        assert_eq!(file.config.atp_demand_per_tick, 2.0);
        assert_eq!(file.mitochondrion.unwrap().get("oxygen").unwrap().quantity, 400.0);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let path = std::env::temp_dir().join("cellforge_setup_version_test.yaml");
        fs::write(&path, "schema_version: \"9.9\"\n").unwrap();
        assert!(load_simulation_file(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
