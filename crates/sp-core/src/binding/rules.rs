use crate::binding::{BindingOverride, BindingSettings, BindingSlot};
use crate::endpoint::{DerivedEndpoint, EndpointMap, EndpointType};
use crate::ids::{BindingId, EndpointId, SpaceId};
use crate::ActivityKey;

/// Pre-flight rejection of a binding request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingValidationError {
    #[error("Invalid activity key \"{0}\"")]
    InvalidActivityKey(String),

    #[error("Endpoint \"{endpoint_id}\" referenced in {field} does not exist in this space")]
    UnknownEndpoint {
        field: &'static str,
        endpoint_id: EndpointId,
    },

    #[error("Endpoint \"{endpoint_id}\" referenced in {field} has type {actual}, expected {expected}")]
    EndpointTypeMismatch {
        field: &'static str,
        endpoint_id: EndpointId,
        actual: EndpointType,
        expected: EndpointType,
    },

    #[error("{field} requires a {parent} to be set")]
    OverrideWithoutSlot {
        field: &'static str,
        parent: &'static str,
    },

    #[error("{field} requires endpoint \"{endpoint_id}\" to support {capability}")]
    OverrideNotSupported {
        field: &'static str,
        endpoint_id: EndpointId,
        capability: &'static str,
    },

    #[error("audio_volume_preset must be between 0 and 100, got {0}")]
    VolumePresetOutOfRange(u8),

    #[error("Activity binding for key \"{key}\" already exists in space {space_id}")]
    DuplicateBinding { key: ActivityKey, space_id: SpaceId },

    #[error("No activity binding configured for \"{key}\" in space {space_id}")]
    MissingBinding { key: ActivityKey, space_id: SpaceId },

    #[error("Activity binding {binding_id} does not belong to space {space_id}")]
    BindingNotInSpace {
        binding_id: BindingId,
        space_id: SpaceId,
    },
}

impl BindingValidationError {
    /// Binding field the error is about, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::UnknownEndpoint { field, .. }
            | Self::EndpointTypeMismatch { field, .. }
            | Self::OverrideWithoutSlot { field, .. }
            | Self::OverrideNotSupported { field, .. } => Some(*field),
            Self::VolumePresetOutOfRange(_) => Some(BindingOverride::AudioVolumePreset.field_name()),
            _ => None,
        }
    }
}

fn override_supported(item: BindingOverride, endpoint: &DerivedEndpoint) -> (bool, &'static str) {
    match item {
        BindingOverride::AudioVolumePreset => (endpoint.capabilities.volume, "volume"),
        BindingOverride::DisplayInput | BindingOverride::AudioInput | BindingOverride::SourceInput => {
            (endpoint.capabilities.input_select, "input_select")
        }
    }
}

/// Every rule violation of `settings` against the live endpoints of a space.
pub fn settings_errors(settings: &BindingSettings, endpoints: &EndpointMap) -> Vec<BindingValidationError> {
    let mut errors = Vec::new();

    if let Some(preset) = settings.audio_volume_preset {
        if preset > 100 {
            errors.push(BindingValidationError::VolumePresetOutOfRange(preset));
        }
    }

    for slot in BindingSlot::ALL {
        let Some(endpoint_id) = settings.slot(slot) else {
            continue;
        };
        match endpoints.get(endpoint_id) {
            None => errors.push(BindingValidationError::UnknownEndpoint {
                field: slot.field_name(),
                endpoint_id: endpoint_id.clone(),
            }),
            Some(endpoint) if endpoint.endpoint_type != slot.expected_type() => {
                errors.push(BindingValidationError::EndpointTypeMismatch {
                    field: slot.field_name(),
                    endpoint_id: endpoint_id.clone(),
                    actual: endpoint.endpoint_type,
                    expected: slot.expected_type(),
                })
            }
            Some(_) => {}
        }
    }

    for item in BindingOverride::ALL {
        if !settings.has_override(item) {
            continue;
        }
        let parent = item.parent();
        let Some(endpoint_id) = settings.slot(parent) else {
            errors.push(BindingValidationError::OverrideWithoutSlot {
                field: item.field_name(),
                parent: parent.field_name(),
            });
            continue;
        };
        // Unknown or mistyped parents are already reported above.
        let Some(endpoint) = endpoints
            .get(endpoint_id)
            .filter(|e| e.endpoint_type == parent.expected_type())
        else {
            continue;
        };
        let (supported, capability) = override_supported(item, endpoint);
        if !supported {
            errors.push(BindingValidationError::OverrideNotSupported {
                field: item.field_name(),
                endpoint_id: endpoint_id.clone(),
                capability,
            });
        }
    }

    errors
}

/// First violation, if any.
pub fn validate_settings(
    settings: &BindingSettings,
    endpoints: &EndpointMap,
) -> Result<(), BindingValidationError> {
    match settings_errors(settings, endpoints).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
