use serde::{Deserialize, Serialize};

use crate::binding::{settings_errors, ActivityBinding, BindingSlot, BindingValidationError};
use crate::endpoint::EndpointMap;
use crate::ids::BindingId;
use crate::ActivityKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// No binding exists for a configurable key.
    Missing,
    EndpointNotFound,
    EndpointTypeMismatch,
    /// A slot the activity normally needs is empty.
    SlotEmpty,
    OverrideInvalid,
    PresetOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub field: Option<String>,
    pub message: String,
}

impl From<&BindingValidationError> for BindingIssue {
    fn from(err: &BindingValidationError) -> Self {
        let code = match err {
            BindingValidationError::UnknownEndpoint { .. } => IssueCode::EndpointNotFound,
            BindingValidationError::EndpointTypeMismatch { .. } => IssueCode::EndpointTypeMismatch,
            BindingValidationError::VolumePresetOutOfRange(_) => IssueCode::PresetOutOfRange,
            _ => IssueCode::OverrideInvalid,
        };
        Self {
            severity: IssueSeverity::Error,
            code,
            field: err.field().map(str::to_string),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingValidationReport {
    pub binding_id: Option<BindingId>,
    pub activity_key: ActivityKey,
    pub valid: bool,
    pub issues: Vec<BindingIssue>,
}

/// Slots whose absence degrades an activity.
fn recommended_slots(key: ActivityKey) -> &'static [BindingSlot] {
    match key {
        ActivityKey::Watch | ActivityKey::Gaming => &[BindingSlot::Display, BindingSlot::Audio],
        ActivityKey::Listen | ActivityKey::Background => &[BindingSlot::Audio],
        ActivityKey::Off => &[],
    }
}

/// Re-check a stored binding against the live endpoints.
pub fn inspect_binding(binding: &ActivityBinding, endpoints: &EndpointMap) -> BindingValidationReport {
    let mut issues: Vec<BindingIssue> = settings_errors(&binding.settings, endpoints)
        .iter()
        .map(BindingIssue::from)
        .collect();

    for slot in recommended_slots(binding.activity_key) {
        if binding.settings.slot(*slot).is_none() {
            issues.push(BindingIssue {
                severity: IssueSeverity::Warning,
                code: IssueCode::SlotEmpty,
                field: Some(slot.field_name().to_string()),
                message: format!(
                    "No {} endpoint assigned for {}",
                    slot.expected_type().label().to_lowercase(),
                    binding.activity_key
                ),
            });
        }
    }

    let valid = !issues.iter().any(|i| i.severity == IssueSeverity::Error);
    BindingValidationReport {
        binding_id: Some(binding.id.clone()),
        activity_key: binding.activity_key,
        valid,
        issues,
    }
}

/// Informational entry for a configurable key without a binding.
pub fn missing_binding_report(key: ActivityKey) -> BindingValidationReport {
    BindingValidationReport {
        binding_id: None,
        activity_key: key,
        valid: true,
        issues: vec![BindingIssue {
            severity: IssueSeverity::Info,
            code: IssueCode::Missing,
            field: None,
            message: format!("No binding configured for {key}"),
        }],
    }
}
