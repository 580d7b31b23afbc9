//! Smart Panel Media Application Layer
//!
//! Use cases of the media activity engine: capability scanning, endpoint
//! projection, binding management and activation orchestration.

pub mod deps;
pub mod errors;
pub mod usecases;

pub use deps::MediaActivityDeps;
pub use errors::MediaActivityError;
pub use usecases::activity::{ActivationPreview, ExecutionConfig};
pub use usecases::facade::{MediaActivityFacade, MediaActivityService};
