use crate::application::simulation::SimulationConfig;
use crate::error::Result;
use std::path::Path;

/// Load and validate a simulation configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load and validate a simulation configuration from a JSON string
///
/// Missing fields take their default values.
pub fn load_config_from_str(json: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<SimulationConfig> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}
