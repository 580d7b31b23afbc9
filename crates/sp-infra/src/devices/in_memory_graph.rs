//! Device graph held in memory, optionally seeded from a JSON file.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use sp_core::device::{Device, PermissionType};
use sp_core::ids::{DeviceId, SpaceId};
use sp_core::ports::{DeviceGraphError, DeviceGraphPort, PropertyCommand};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceDevices {
    pub id: SpaceId,
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// On-disk layout: `{ "spaces": [{ "id": "...", "devices": [...] }] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceGraphFile {
    #[serde(default)]
    pub spaces: Vec<SpaceDevices>,
}

#[derive(Default)]
pub struct InMemoryDeviceGraph {
    spaces: RwLock<Vec<SpaceDevices>>,
}

impl InMemoryDeviceGraph {
    pub fn new(spaces: Vec<SpaceDevices>) -> Self {
        Self {
            spaces: RwLock::new(spaces),
        }
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read device graph: {}", path.display()))?;
        let file: DeviceGraphFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse device graph: {}", path.display()))?;

        info!(
            path = %path.display(),
            spaces = file.spaces.len(),
            "Loaded device graph"
        );
        Ok(Self::new(file.spaces))
    }

    /// Store a command value on its property, as a device would report it back.
    ///
    /// Returns false when the device is unknown or offline, or when the
    /// property is missing or not writable.
    pub async fn write_property(&self, command: &PropertyCommand) -> bool {
        let mut spaces = self.spaces.write().await;
        let Some(device) = spaces
            .iter_mut()
            .flat_map(|s| s.devices.iter_mut())
            .find(|d| d.id == command.device_id)
        else {
            return false;
        };
        if !device.online {
            return false;
        }

        match device.find_property_mut(&command.property_id) {
            Some(property) if is_writable(&property.permissions) => {
                property.value = Some(command.value.clone());
                debug!(
                    device_id = %command.device_id,
                    property_id = %command.property_id,
                    value = %command.value,
                    "Property updated"
                );
                true
            }
            _ => false,
        }
    }

    pub async fn snapshot(&self) -> DeviceGraphFile {
        DeviceGraphFile {
            spaces: self.spaces.read().await.clone(),
        }
    }
}

fn is_writable(permissions: &[PermissionType]) -> bool {
    permissions
        .iter()
        .any(|p| matches!(p, PermissionType::ReadWrite | PermissionType::WriteOnly))
}

#[async_trait]
impl DeviceGraphPort for InMemoryDeviceGraph {
    async fn space_exists(&self, space_id: &SpaceId) -> Result<bool, DeviceGraphError> {
        Ok(self.spaces.read().await.iter().any(|s| &s.id == space_id))
    }

    async fn list_devices_in_space(&self, space_id: &SpaceId) -> Result<Vec<Device>, DeviceGraphError> {
        Ok(self
            .spaces
            .read()
            .await
            .iter()
            .find(|s| &s.id == space_id)
            .map(|s| s.devices.clone())
            .unwrap_or_default())
    }

    async fn find_devices_by_ids(&self, ids: &[DeviceId]) -> Result<Vec<Device>, DeviceGraphError> {
        Ok(self
            .spaces
            .read()
            .await
            .iter()
            .flat_map(|s| s.devices.iter())
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::device::PropertyValue;
    use sp_core::ids::{ChannelId, PropertyId};

    const GRAPH: &str = r#"{
        "spaces": [{
            "id": "living",
            "devices": [{
                "id": "tv",
                "name": "Living TV",
                "category": "television",
                "platform": "simulator",
                "channels": [{
                    "id": "tv-main",
                    "category": "television",
                    "properties": [
                        { "id": "tv-on", "category": "on", "permissions": ["rw"], "value": false },
                        { "id": "tv-state", "category": "state", "permissions": ["ro"] }
                    ]
                }]
            }]
        }]
    }"#;

    fn command(property: &str, value: PropertyValue) -> PropertyCommand {
        PropertyCommand {
            device_id: DeviceId::from("tv"),
            channel_id: ChannelId::from("tv-main"),
            property_id: PropertyId::from(property),
            value,
        }
    }

    #[tokio::test]
    async fn loads_spaces_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        std::fs::write(&path, GRAPH).unwrap();

        let graph = InMemoryDeviceGraph::load(&path).await.unwrap();

        assert!(graph.space_exists(&SpaceId::from("living")).await.unwrap());
        assert!(!graph.space_exists(&SpaceId::from("attic")).await.unwrap());
        let devices = graph.list_devices_in_space(&SpaceId::from("living")).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert!(graph
            .find_devices_by_ids(&[DeviceId::from("radio")])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn writes_only_writable_properties() {
        let file: DeviceGraphFile = serde_json::from_str(GRAPH).unwrap();
        let graph = InMemoryDeviceGraph::new(file.spaces);

        assert!(graph.write_property(&command("tv-on", PropertyValue::Bool(true))).await);
        assert!(!graph.write_property(&command("tv-state", PropertyValue::Text("playing".into()))).await);
        assert!(!graph.write_property(&command("tv-mute", PropertyValue::Bool(true))).await);

        let devices = graph.find_devices_by_ids(&[DeviceId::from("tv")]).await.unwrap();
        let (_, on) = devices[0].find_property(&PropertyId::from("tv-on")).unwrap();
        assert_eq!(on.value, Some(PropertyValue::Bool(true)));
    }
}
