//! Ports the media engine depends on.

mod active_activity_repository;
mod binding_repository;
mod clock;
mod device_graph;
pub mod errors;
mod media_event;
mod platform;

pub use active_activity_repository::ActiveActivityRepositoryPort;
pub use binding_repository::ActivityBindingRepositoryPort;
pub use clock::ClockPort;
pub use device_graph::DeviceGraphPort;
pub use errors::{
    ActiveActivityRepositoryError, BindingRepositoryError, DeviceGraphError, PlatformError,
};
pub use media_event::MediaActivityEventPort;
pub use platform::{DevicePlatformPort, PlatformRegistryPort, PropertyCommand};
