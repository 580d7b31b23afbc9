//! Adapters behind the `sp-core` ports: SQLite persistence, the device graph
//! with its simulator platform, the event bus and the system clock.

pub mod db;
pub mod devices;
pub mod events;
pub mod time;

pub use devices::{InMemoryDeviceGraph, SimulatedPlatformRegistry};
pub use events::BroadcastMediaEventBus;
pub use time::SystemClock;
