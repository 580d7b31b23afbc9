pub mod executor;
pub mod locks;
pub mod orchestrator;

pub use executor::{ExecutionConfig, PlanExecutor};
pub use locks::SpaceLocks;
pub use orchestrator::{ActivationPreview, MediaActivityOrchestrator};
