//! Media capability detection.
//!
//! Reduces a raw device graph to a [`CapabilitySummary`]: which property, on
//! which channel, implements each of the seven media capabilities.
//!
//! 能力检测是纯函数：相同的设备图总是得到相同的结果。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device::{ChannelCategory, Device, DeviceCategory, PermissionType, Property, PropertyCategory};
use crate::endpoint::{endpoint_type_rules, EndpointType};
use crate::ids::{ChannelId, DeviceId, PropertyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCapability {
    Power,
    Volume,
    Mute,
    Playback,
    PlaybackState,
    Input,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityPermission {
    Read,
    Write,
    ReadWrite,
}

impl CapabilityPermission {
    pub fn from_permissions(permissions: &[PermissionType]) -> Self {
        let read = permissions
            .iter()
            .any(|p| matches!(p, PermissionType::ReadOnly | PermissionType::ReadWrite));
        let write = permissions
            .iter()
            .any(|p| matches!(p, PermissionType::WriteOnly | PermissionType::ReadWrite));

        match (read, write) {
            (true, true) => CapabilityPermission::ReadWrite,
            (false, true) => CapabilityPermission::Write,
            _ => CapabilityPermission::Read,
        }
    }
}

/// Concrete property implementing a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityLink {
    pub property_id: PropertyId,
    pub channel_id: ChannelId,
    pub permission: CapabilityPermission,
}

/// One row of the detection table: a property of one of `properties` on a
/// channel of one of `channels` implements `capability`.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityRule {
    pub capability: MediaCapability,
    pub channels: &'static [ChannelCategory],
    pub properties: &'static [PropertyCategory],
}

impl CapabilityRule {
    fn matches(&self, channel: ChannelCategory, property: PropertyCategory) -> bool {
        self.channels.contains(&channel) && self.properties.contains(&property)
    }
}

pub const CAPABILITY_RULES: &[CapabilityRule] = &[
    CapabilityRule {
        capability: MediaCapability::Power,
        channels: &[ChannelCategory::Television, ChannelCategory::Switcher],
        properties: &[PropertyCategory::On, PropertyCategory::Active],
    },
    CapabilityRule {
        capability: MediaCapability::Volume,
        channels: &[ChannelCategory::Speaker, ChannelCategory::Television],
        properties: &[PropertyCategory::Volume],
    },
    CapabilityRule {
        capability: MediaCapability::Mute,
        channels: &[ChannelCategory::Speaker, ChannelCategory::Television],
        properties: &[PropertyCategory::Mute],
    },
    CapabilityRule {
        capability: MediaCapability::Playback,
        channels: &[ChannelCategory::MediaPlayback],
        properties: &[PropertyCategory::Command],
    },
    CapabilityRule {
        capability: MediaCapability::PlaybackState,
        channels: &[ChannelCategory::MediaPlayback],
        properties: &[PropertyCategory::State],
    },
    CapabilityRule {
        capability: MediaCapability::Input,
        channels: &[ChannelCategory::Television, ChannelCategory::MediaInput],
        properties: &[PropertyCategory::Source],
    },
    CapabilityRule {
        capability: MediaCapability::Remote,
        channels: &[ChannelCategory::Television],
        properties: &[PropertyCategory::RemoteKey],
    },
];

const SCANNED_CHANNELS: [ChannelCategory; 5] = [
    ChannelCategory::Television,
    ChannelCategory::Switcher,
    ChannelCategory::Speaker,
    ChannelCategory::MediaPlayback,
    ChannelCategory::MediaInput,
];

/// Functional view of one media device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySummary {
    pub device_id: DeviceId,
    pub device_name: String,
    pub device_category: DeviceCategory,
    pub online: bool,
    pub capabilities: BTreeMap<MediaCapability, CapabilityLink>,
    pub suggested_endpoint_types: Vec<EndpointType>,
}

impl CapabilitySummary {
    pub fn link(&self, capability: MediaCapability) -> Option<&CapabilityLink> {
        self.capabilities.get(&capability)
    }

    pub fn has(&self, capability: MediaCapability) -> bool {
        self.capabilities.contains_key(&capability)
    }
}

fn rule_for(channel: ChannelCategory, property: &Property) -> Option<&'static CapabilityRule> {
    CAPABILITY_RULES
        .iter()
        .find(|rule| rule.matches(channel, property.category))
}

/// Scan one device. Returns `None` for non-media devices and for media
/// devices without a single recognised capability.
pub fn scan_device(device: &Device) -> Option<CapabilitySummary> {
    if !device.category.is_media() {
        return None;
    }

    let mut capabilities = BTreeMap::new();
    for channel in device
        .channels
        .iter()
        .filter(|c| SCANNED_CHANNELS.contains(&c.category))
    {
        for property in &channel.properties {
            let Some(rule) = rule_for(channel.category, property) else {
                continue;
            };
            // First property found for a slot keeps it.
            capabilities
                .entry(rule.capability)
                .or_insert_with(|| CapabilityLink {
                    property_id: property.id.clone(),
                    channel_id: channel.id.clone(),
                    permission: CapabilityPermission::from_permissions(&property.permissions),
                });
        }
    }

    if capabilities.is_empty() {
        return None;
    }

    let suggested_endpoint_types = endpoint_type_rules(device.category)
        .iter()
        .filter(|rule| rule.requires.map_or(true, |cap| capabilities.contains_key(&cap)))
        .map(|rule| rule.endpoint_type)
        .collect();

    Some(CapabilitySummary {
        device_id: device.id.clone(),
        device_name: device.name.clone(),
        device_category: device.category,
        online: device.online,
        capabilities,
        suggested_endpoint_types,
    })
}
