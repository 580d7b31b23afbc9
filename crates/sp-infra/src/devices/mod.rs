mod in_memory_graph;
mod simulated_platform;

pub use in_memory_graph::{DeviceGraphFile, InMemoryDeviceGraph, SpaceDevices};
pub use simulated_platform::{SimulatedPlatform, SimulatedPlatformRegistry, SIMULATOR_PLATFORM};
