//! Derived media endpoints.
//!
//! An endpoint is a functional role a device plays in a space (display,
//! audio output, source, remote target). Endpoints are projected from
//! capability summaries on every read and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilitySummary, MediaCapability};
use crate::device::DeviceCategory;
use crate::ids::{DeviceId, EndpointId, PropertyId, SpaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointType {
    Display,
    AudioOutput,
    Source,
    RemoteTarget,
}

impl EndpointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointType::Display => "display",
            EndpointType::AudioOutput => "audio_output",
            EndpointType::Source => "source",
            EndpointType::RemoteTarget => "remote_target",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EndpointType::Display => "Display",
            EndpointType::AudioOutput => "Audio Output",
            EndpointType::Source => "Source",
            EndpointType::RemoteTarget => "Remote Target",
        }
    }
}

impl std::fmt::Display for EndpointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint type emitted for a device category, optionally gated on a capability.
#[derive(Debug, Clone, Copy)]
pub struct EndpointTypeRule {
    pub endpoint_type: EndpointType,
    pub requires: Option<MediaCapability>,
}

const fn always(endpoint_type: EndpointType) -> EndpointTypeRule {
    EndpointTypeRule {
        endpoint_type,
        requires: None,
    }
}

const fn when(endpoint_type: EndpointType, capability: MediaCapability) -> EndpointTypeRule {
    EndpointTypeRule {
        endpoint_type,
        requires: Some(capability),
    }
}

const SCREEN_RULES: &[EndpointTypeRule] = &[
    always(EndpointType::Display),
    when(EndpointType::AudioOutput, MediaCapability::Volume),
    when(EndpointType::RemoteTarget, MediaCapability::Remote),
];
const RECEIVER_RULES: &[EndpointTypeRule] = &[
    always(EndpointType::AudioOutput),
    when(EndpointType::Source, MediaCapability::Input),
];
const SPEAKER_RULES: &[EndpointTypeRule] = &[
    always(EndpointType::AudioOutput),
    when(EndpointType::Source, MediaCapability::Playback),
];
const PLAYER_RULES: &[EndpointTypeRule] = &[
    always(EndpointType::Source),
    when(EndpointType::RemoteTarget, MediaCapability::Remote),
];
const GENERIC_MEDIA_RULES: &[EndpointTypeRule] = &[
    when(EndpointType::Source, MediaCapability::Playback),
    when(EndpointType::AudioOutput, MediaCapability::Volume),
    when(EndpointType::RemoteTarget, MediaCapability::Remote),
];

/// Endpoint types a device category may produce, in emission order.
pub fn endpoint_type_rules(category: DeviceCategory) -> &'static [EndpointTypeRule] {
    match category {
        DeviceCategory::Television | DeviceCategory::Projector => SCREEN_RULES,
        DeviceCategory::AvReceiver => RECEIVER_RULES,
        DeviceCategory::Speaker => SPEAKER_RULES,
        DeviceCategory::SetTopBox | DeviceCategory::GameConsole | DeviceCategory::StreamingService => {
            PLAYER_RULES
        }
        DeviceCategory::Media => GENERIC_MEDIA_RULES,
        DeviceCategory::Generic => &[],
    }
}

/// Which capability flags an endpoint type is allowed to claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointProjection {
    pub power: bool,
    pub volume: bool,
    pub mute: bool,
    pub input_select: bool,
    pub playback: bool,
    pub track: bool,
    pub remote_commands: bool,
}

impl EndpointProjection {
    pub const fn for_type(endpoint_type: EndpointType) -> Self {
        match endpoint_type {
            EndpointType::Display | EndpointType::Source => Self {
                power: true,
                volume: false,
                mute: false,
                input_select: true,
                playback: true,
                track: true,
                remote_commands: false,
            },
            EndpointType::AudioOutput => Self {
                power: true,
                volume: true,
                mute: true,
                input_select: true,
                playback: true,
                track: true,
                remote_commands: false,
            },
            EndpointType::RemoteTarget => Self {
                power: true,
                volume: false,
                mute: false,
                input_select: false,
                playback: false,
                track: false,
                remote_commands: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCapabilities {
    pub power: bool,
    pub volume: bool,
    pub mute: bool,
    pub playback: bool,
    pub track: bool,
    pub input_select: bool,
    pub remote_commands: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyLink {
    pub property_id: PropertyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLink {
    pub commands: BTreeMap<String, PropertyId>,
}

pub const REMOTE_KEY_COMMAND: &str = "remote_key";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PropertyLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<PropertyLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<PropertyLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_select: Option<PropertyLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PropertyLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_state: Option<PropertyLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedEndpoint {
    pub endpoint_id: EndpointId,
    pub space_id: SpaceId,
    pub device_id: DeviceId,
    pub device_category: DeviceCategory,
    #[serde(rename = "type")]
    pub endpoint_type: EndpointType,
    pub name: String,
    pub capabilities: EndpointCapabilities,
    pub links: EndpointLinks,
}

fn link(summary: &CapabilitySummary, allowed: bool, capability: MediaCapability) -> Option<PropertyLink> {
    if !allowed {
        return None;
    }
    summary.link(capability).map(|l| PropertyLink {
        property_id: l.property_id.clone(),
    })
}

/// Project one endpoint of `endpoint_type` from a capability summary.
pub fn project_endpoint(
    space_id: &SpaceId,
    summary: &CapabilitySummary,
    endpoint_type: EndpointType,
) -> DerivedEndpoint {
    let allowed = EndpointProjection::for_type(endpoint_type);

    let links = EndpointLinks {
        power: link(summary, allowed.power, MediaCapability::Power),
        volume: link(summary, allowed.volume, MediaCapability::Volume),
        mute: link(summary, allowed.mute, MediaCapability::Mute),
        input_select: link(summary, allowed.input_select, MediaCapability::Input),
        playback: link(summary, allowed.playback, MediaCapability::Playback),
        playback_state: link(summary, allowed.track, MediaCapability::PlaybackState),
        remote: if allowed.remote_commands {
            summary.link(MediaCapability::Remote).map(|l| RemoteLink {
                commands: BTreeMap::from([(REMOTE_KEY_COMMAND.to_string(), l.property_id.clone())]),
            })
        } else {
            None
        },
    };

    let capabilities = EndpointCapabilities {
        power: links.power.is_some(),
        volume: links.volume.is_some(),
        mute: links.mute.is_some(),
        playback: links.playback.is_some(),
        track: links.playback_state.is_some(),
        input_select: links.input_select.is_some(),
        remote_commands: links.remote.is_some(),
    };

    DerivedEndpoint {
        endpoint_id: EndpointId::derive(space_id, endpoint_type, &summary.device_id),
        space_id: space_id.clone(),
        device_id: summary.device_id.clone(),
        device_category: summary.device_category,
        endpoint_type,
        name: format!("{} ({})", summary.device_name, endpoint_type.label()),
        capabilities,
        links,
    }
}

/// Project every endpoint of one device, in table order.
pub fn project_device(space_id: &SpaceId, summary: &CapabilitySummary) -> Vec<DerivedEndpoint> {
    summary
        .suggested_endpoint_types
        .iter()
        .map(|endpoint_type| project_endpoint(space_id, summary, *endpoint_type))
        .collect()
}

/// Endpoints of one space, addressable by id while keeping projection order.
#[derive(Debug, Clone, Default)]
pub struct EndpointMap {
    endpoints: Vec<DerivedEndpoint>,
}

impl EndpointMap {
    pub fn new(endpoints: Vec<DerivedEndpoint>) -> Self {
        Self { endpoints }
    }

    pub fn get(&self, id: &EndpointId) -> Option<&DerivedEndpoint> {
        self.endpoints.iter().find(|e| &e.endpoint_id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedEndpoint> {
        self.endpoints.iter()
    }

    pub fn of_type(&self, endpoint_type: EndpointType) -> impl Iterator<Item = &DerivedEndpoint> {
        self.endpoints
            .iter()
            .filter(move |e| e.endpoint_type == endpoint_type)
    }

    pub fn for_device<'a>(&'a self, device_id: &'a DeviceId) -> impl Iterator<Item = &'a DerivedEndpoint> {
        self.endpoints.iter().filter(move |e| &e.device_id == device_id)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn into_vec(self) -> Vec<DerivedEndpoint> {
        self.endpoints
    }
}
