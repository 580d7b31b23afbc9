pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{default_config_path, load_config};
pub use wiring::{wire_dependencies, MediaRuntime, WiringError, WiringResult};
