//! Infrastructure Layer
//!
//! Loading simulation configuration from JSON.

mod config_loader;

pub use config_loader::{load_config, load_config_from_str, load_default_config};
