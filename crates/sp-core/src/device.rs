//! Device graph model: device → channels → properties.
//!
//! This is the read model the engine consumes from the device graph. It is
//! populated by platform plugins and never mutated by the media engine itself.

use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, DeviceId, PropertyId};

/// Category of a physical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Television,
    Projector,
    AvReceiver,
    Speaker,
    SetTopBox,
    GameConsole,
    StreamingService,
    Media,
    #[serde(other)]
    Generic,
}

impl DeviceCategory {
    /// Categories the media engine looks at at all.
    pub const MEDIA: [DeviceCategory; 8] = [
        DeviceCategory::Television,
        DeviceCategory::Projector,
        DeviceCategory::AvReceiver,
        DeviceCategory::Speaker,
        DeviceCategory::SetTopBox,
        DeviceCategory::GameConsole,
        DeviceCategory::StreamingService,
        DeviceCategory::Media,
    ];

    pub fn is_media(&self) -> bool {
        Self::MEDIA.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Television => "television",
            DeviceCategory::Projector => "projector",
            DeviceCategory::AvReceiver => "av_receiver",
            DeviceCategory::Speaker => "speaker",
            DeviceCategory::SetTopBox => "set_top_box",
            DeviceCategory::GameConsole => "game_console",
            DeviceCategory::StreamingService => "streaming_service",
            DeviceCategory::Media => "media",
            DeviceCategory::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelCategory {
    Television,
    Switcher,
    Speaker,
    MediaPlayback,
    MediaInput,
    #[serde(other)]
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    On,
    Active,
    Volume,
    Mute,
    Command,
    State,
    Source,
    RemoteKey,
    #[serde(other)]
    Generic,
}

/// Access flags as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionType {
    #[serde(rename = "ro")]
    ReadOnly,
    #[serde(rename = "rw")]
    ReadWrite,
    #[serde(rename = "wo")]
    WriteOnly,
    #[serde(rename = "ev")]
    EventOnly,
}

/// Property value as stored in the graph and sent to platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub category: PropertyCategory,
    #[serde(default)]
    pub permissions: Vec<PermissionType>,
    #[serde(default)]
    pub value: Option<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub category: ChannelCategory,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub category: DeviceCategory,
    /// Platform plugin type that owns the device (e.g. `simulator`).
    #[serde(default)]
    pub platform: String,
    #[serde(default = "default_online")]
    pub online: bool,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

fn default_online() -> bool {
    true
}

impl Device {
    /// Locate a property and the channel that owns it.
    pub fn find_property(&self, property_id: &PropertyId) -> Option<(&Channel, &Property)> {
        self.channels.iter().find_map(|channel| {
            channel
                .properties
                .iter()
                .find(|p| &p.id == property_id)
                .map(|p| (channel, p))
        })
    }

    pub fn find_property_mut(&mut self, property_id: &PropertyId) -> Option<&mut Property> {
        self.channels
            .iter_mut()
            .flat_map(|c| c.properties.iter_mut())
            .find(|p| &p.id == property_id)
    }
}
