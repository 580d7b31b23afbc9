use async_trait::async_trait;

use crate::device::Device;
use crate::ids::{DeviceId, SpaceId};
use crate::ports::errors::DeviceGraphError;

/// Read access to the device graph populated by platform plugins.
#[async_trait]
pub trait DeviceGraphPort: Send + Sync {
    async fn space_exists(&self, space_id: &SpaceId) -> Result<bool, DeviceGraphError>;

    /// Devices assigned to a space, in a stable order.
    async fn list_devices_in_space(&self, space_id: &SpaceId) -> Result<Vec<Device>, DeviceGraphError>;

    /// Devices by id, any space. Unknown ids are left out.
    async fn find_devices_by_ids(&self, ids: &[DeviceId]) -> Result<Vec<Device>, DeviceGraphError>;
}
