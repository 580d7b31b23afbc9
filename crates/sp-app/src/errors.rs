use sp_core::binding::BindingValidationError;
use sp_core::ids::{BindingId, SpaceId};
use sp_core::ports::{ActiveActivityRepositoryError, BindingRepositoryError, DeviceGraphError};

/// Errors surfaced by the media activity use cases.
#[derive(Debug, thiserror::Error)]
pub enum MediaActivityError {
    #[error("space {0} not found")]
    SpaceNotFound(SpaceId),

    #[error("activity binding {0} not found")]
    BindingNotFound(BindingId),

    #[error(transparent)]
    Validation(#[from] BindingValidationError),

    #[error("device graph error: {0}")]
    DeviceGraph(#[from] DeviceGraphError),

    #[error("binding storage failed: {0}")]
    BindingStorage(#[from] BindingRepositoryError),

    #[error("activity storage failed: {0}")]
    ActivityStorage(#[from] ActiveActivityRepositoryError),
}
