// Configuration module
// Public interface for configuration loading

pub mod constants;
mod loader;
mod settings;

pub use loader::{load_config, load_from_file};
pub use settings::{Config, ConfigFile, Overrides, Target, TargetDefaults, TargetEntry};
