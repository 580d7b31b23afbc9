//! Persisted activity bindings.
//!
//! A binding maps one activity key of one space to up to four derived
//! endpoints plus a few override values (input ids, volume preset).

mod report;
mod rules;

pub use report::{
    inspect_binding, missing_binding_report, BindingIssue, BindingValidationReport, IssueCode,
    IssueSeverity,
};
pub use rules::{settings_errors, validate_settings, BindingValidationError};

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointType;
use crate::ids::{BindingId, EndpointId, SpaceId};
use crate::ActivityKey;

/// Volume preset applied to Background when defaults are generated.
pub const BACKGROUND_DEFAULT_VOLUME: u8 = 20;

/// Endpoint slot of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSlot {
    Display,
    Audio,
    Source,
    Remote,
}

impl BindingSlot {
    pub const ALL: [BindingSlot; 4] = [
        BindingSlot::Display,
        BindingSlot::Audio,
        BindingSlot::Source,
        BindingSlot::Remote,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            BindingSlot::Display => "display_endpoint_id",
            BindingSlot::Audio => "audio_endpoint_id",
            BindingSlot::Source => "source_endpoint_id",
            BindingSlot::Remote => "remote_endpoint_id",
        }
    }

    pub fn expected_type(&self) -> EndpointType {
        match self {
            BindingSlot::Display => EndpointType::Display,
            BindingSlot::Audio => EndpointType::AudioOutput,
            BindingSlot::Source => EndpointType::Source,
            BindingSlot::Remote => EndpointType::RemoteTarget,
        }
    }
}

/// Override value that only makes sense while its parent slot is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOverride {
    DisplayInput,
    AudioInput,
    SourceInput,
    AudioVolumePreset,
}

impl BindingOverride {
    pub const ALL: [BindingOverride; 4] = [
        BindingOverride::DisplayInput,
        BindingOverride::AudioInput,
        BindingOverride::SourceInput,
        BindingOverride::AudioVolumePreset,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            BindingOverride::DisplayInput => "display_input_id",
            BindingOverride::AudioInput => "audio_input_id",
            BindingOverride::SourceInput => "source_input_id",
            BindingOverride::AudioVolumePreset => "audio_volume_preset",
        }
    }

    pub fn parent(&self) -> BindingSlot {
        match self {
            BindingOverride::DisplayInput => BindingSlot::Display,
            BindingOverride::AudioInput | BindingOverride::AudioVolumePreset => BindingSlot::Audio,
            BindingOverride::SourceInput => BindingSlot::Source,
        }
    }
}

/// The assignable part of a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSettings {
    pub display_endpoint_id: Option<EndpointId>,
    pub audio_endpoint_id: Option<EndpointId>,
    pub source_endpoint_id: Option<EndpointId>,
    pub remote_endpoint_id: Option<EndpointId>,
    pub display_input_id: Option<String>,
    pub audio_input_id: Option<String>,
    pub source_input_id: Option<String>,
    pub audio_volume_preset: Option<u8>,
}

impl BindingSettings {
    pub fn slot(&self, slot: BindingSlot) -> Option<&EndpointId> {
        match slot {
            BindingSlot::Display => self.display_endpoint_id.as_ref(),
            BindingSlot::Audio => self.audio_endpoint_id.as_ref(),
            BindingSlot::Source => self.source_endpoint_id.as_ref(),
            BindingSlot::Remote => self.remote_endpoint_id.as_ref(),
        }
    }

    pub fn has_override(&self, item: BindingOverride) -> bool {
        match item {
            BindingOverride::DisplayInput => self.display_input_id.is_some(),
            BindingOverride::AudioInput => self.audio_input_id.is_some(),
            BindingOverride::SourceInput => self.source_input_id.is_some(),
            BindingOverride::AudioVolumePreset => self.audio_volume_preset.is_some(),
        }
    }

    fn clear_override(&mut self, item: BindingOverride) {
        match item {
            BindingOverride::DisplayInput => self.display_input_id = None,
            BindingOverride::AudioInput => self.audio_input_id = None,
            BindingOverride::SourceInput => self.source_input_id = None,
            BindingOverride::AudioVolumePreset => self.audio_volume_preset = None,
        }
    }

    /// Empty strings mean "not set".
    pub fn normalized(self) -> Self {
        Self {
            display_endpoint_id: non_empty_endpoint(self.display_endpoint_id),
            audio_endpoint_id: non_empty_endpoint(self.audio_endpoint_id),
            source_endpoint_id: non_empty_endpoint(self.source_endpoint_id),
            remote_endpoint_id: non_empty_endpoint(self.remote_endpoint_id),
            display_input_id: non_empty(self.display_input_id),
            audio_input_id: non_empty(self.audio_input_id),
            source_input_id: non_empty(self.source_input_id),
            audio_volume_preset: self.audio_volume_preset,
        }
    }

    /// Merge a patch into these settings.
    ///
    /// A slot cleared by the patch also clears the overrides depending on it,
    /// unless the patch sets that override explicitly (which then fails
    /// validation).
    pub fn apply(&self, patch: &BindingSettingsPatch) -> Self {
        let mut next = Self {
            display_endpoint_id: merge(&self.display_endpoint_id, &patch.display_endpoint_id),
            audio_endpoint_id: merge(&self.audio_endpoint_id, &patch.audio_endpoint_id),
            source_endpoint_id: merge(&self.source_endpoint_id, &patch.source_endpoint_id),
            remote_endpoint_id: merge(&self.remote_endpoint_id, &patch.remote_endpoint_id),
            display_input_id: merge(&self.display_input_id, &patch.display_input_id),
            audio_input_id: merge(&self.audio_input_id, &patch.audio_input_id),
            source_input_id: merge(&self.source_input_id, &patch.source_input_id),
            audio_volume_preset: merge(&self.audio_volume_preset, &patch.audio_volume_preset),
        }
        .normalized();

        for item in BindingOverride::ALL {
            if next.slot(item.parent()).is_none() && !patch.sets_override(item) {
                next.clear_override(item);
            }
        }
        next
    }
}

fn merge<T: Clone>(current: &Option<T>, patch: &Option<Option<T>>) -> Option<T> {
    match patch {
        Some(value) => value.clone(),
        None => current.clone(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty_endpoint(value: Option<EndpointId>) -> Option<EndpointId> {
    value.filter(|v| !v.as_str().trim().is_empty())
}

/// Partial update. `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BindingSettingsPatch {
    #[serde(with = "::serde_with::rust::double_option")]
    pub display_endpoint_id: Option<Option<EndpointId>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub audio_endpoint_id: Option<Option<EndpointId>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub source_endpoint_id: Option<Option<EndpointId>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub remote_endpoint_id: Option<Option<EndpointId>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub display_input_id: Option<Option<String>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub audio_input_id: Option<Option<String>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub source_input_id: Option<Option<String>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub audio_volume_preset: Option<Option<u8>>,
}

impl BindingSettingsPatch {
    fn sets_override(&self, item: BindingOverride) -> bool {
        match item {
            BindingOverride::DisplayInput => matches!(self.display_input_id, Some(Some(_))),
            BindingOverride::AudioInput => matches!(self.audio_input_id, Some(Some(_))),
            BindingOverride::SourceInput => matches!(self.source_input_id, Some(Some(_))),
            BindingOverride::AudioVolumePreset => matches!(self.audio_volume_preset, Some(Some(_))),
        }
    }
}

/// Request to create a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivityBinding {
    pub activity_key: ActivityKey,
    #[serde(flatten)]
    pub settings: BindingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBinding {
    pub id: BindingId,
    pub space_id: SpaceId,
    pub activity_key: ActivityKey,
    #[serde(flatten)]
    pub settings: BindingSettings,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}
