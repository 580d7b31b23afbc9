use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceGraphError {
    #[error("device graph unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform dispatch failed: {0}")]
    Dispatch(String),
}

#[derive(Debug, Error)]
pub enum BindingRepositoryError {
    #[error("activity binding not found")]
    NotFound,

    /// Unique (space, activity key) constraint hit.
    #[error("activity binding already exists")]
    Conflict,

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum ActiveActivityRepositoryError {
    #[error("storage error: {0}")]
    Storage(String),
}
