use std::sync::Arc;

use tracing::debug;

use sp_core::capability::{scan_device, CapabilitySummary};
use sp_core::ids::SpaceId;
use sp_core::ports::DeviceGraphPort;

use crate::errors::MediaActivityError;

/// Reduces the media devices of a space to capability summaries.
pub struct ScanMediaCapabilities {
    device_graph: Arc<dyn DeviceGraphPort>,
}

impl ScanMediaCapabilities {
    pub fn new(device_graph: Arc<dyn DeviceGraphPort>) -> Self {
        Self { device_graph }
    }

    pub async fn ensure_space(&self, space_id: &SpaceId) -> Result<(), MediaActivityError> {
        if self.device_graph.space_exists(space_id).await? {
            Ok(())
        } else {
            Err(MediaActivityError::SpaceNotFound(space_id.clone()))
        }
    }

    #[tracing::instrument(
        name = "usecase.scan_media_capabilities.execute",
        skip(self),
        fields(space_id = %space_id)
    )]
    pub async fn execute(&self, space_id: &SpaceId) -> Result<Vec<CapabilitySummary>, MediaActivityError> {
        self.ensure_space(space_id).await?;

        let devices = self.device_graph.list_devices_in_space(space_id).await?;
        let summaries: Vec<CapabilitySummary> = devices.iter().filter_map(scan_device).collect();

        debug!(
            devices = devices.len(),
            media_devices = summaries.len(),
            "Scanned media capabilities"
        );
        Ok(summaries)
    }
}
