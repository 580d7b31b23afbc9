use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::device::{Device, PropertyValue};
use crate::ids::{ChannelId, DeviceId, PropertyId};
use crate::ports::errors::PlatformError;

/// One property write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCommand {
    pub device_id: DeviceId,
    pub channel_id: ChannelId,
    pub property_id: PropertyId,
    pub value: PropertyValue,
}

/// Command dispatcher of one platform plugin.
#[async_trait]
pub trait DevicePlatformPort: Send + Sync {
    /// Returns `Ok(false)` when the platform rejected the batch.
    async fn process_batch(&self, commands: Vec<PropertyCommand>) -> Result<bool, PlatformError>;
}

/// Looks up the dispatcher responsible for a device.
pub trait PlatformRegistryPort: Send + Sync {
    fn get(&self, device: &Device) -> Option<Arc<dyn DevicePlatformPort>>;
}
