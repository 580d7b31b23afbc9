use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use sp_core::device::Device;
use sp_core::ports::{DevicePlatformPort, PlatformError, PlatformRegistryPort, PropertyCommand};

use crate::devices::InMemoryDeviceGraph;

/// Platform type served by [`SimulatedPlatform`].
pub const SIMULATOR_PLATFORM: &str = "simulator";

/// Device simulator: applies commands straight to the in-memory graph.
pub struct SimulatedPlatform {
    graph: Arc<InMemoryDeviceGraph>,
}

impl SimulatedPlatform {
    pub fn new(graph: Arc<InMemoryDeviceGraph>) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl DevicePlatformPort for SimulatedPlatform {
    async fn process_batch(&self, commands: Vec<PropertyCommand>) -> Result<bool, PlatformError> {
        let mut accepted = true;
        for command in &commands {
            if self.graph.write_property(command).await {
                debug!(device_id = %command.device_id, property_id = %command.property_id, "Simulated write");
            } else {
                warn!(
                    device_id = %command.device_id,
                    property_id = %command.property_id,
                    "Simulator rejected command"
                );
                accepted = false;
            }
        }
        Ok(accepted)
    }
}

/// Resolves `simulator` devices to the simulator; any other platform is unknown.
pub struct SimulatedPlatformRegistry {
    simulator: Arc<SimulatedPlatform>,
}

impl SimulatedPlatformRegistry {
    pub fn new(graph: Arc<InMemoryDeviceGraph>) -> Self {
        Self {
            simulator: Arc::new(SimulatedPlatform::new(graph)),
        }
    }
}

impl PlatformRegistryPort for SimulatedPlatformRegistry {
    fn get(&self, device: &Device) -> Option<Arc<dyn DevicePlatformPort>> {
        if device.platform == SIMULATOR_PLATFORM {
            Some(self.simulator.clone() as Arc<dyn DevicePlatformPort>)
        } else {
            None
        }
    }
}
