//! Execution plan construction.
//!
//! A plan is a pure function of one binding and the current endpoints of the
//! space: `activate` and `preview` both go through [`build_execution_plan`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::activity::{ControlTargets, ResolvedDevices, StepActionKind};
use crate::binding::{BindingOverride, BindingSettings, BindingSlot};
use crate::device::PropertyValue;
use crate::endpoint::{DerivedEndpoint, EndpointMap, EndpointType};
use crate::ids::{DeviceId, PropertyId};
use crate::ActivityKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    SetProperty {
        property_id: PropertyId,
        value: PropertyValue,
    },
}

impl StepAction {
    pub fn kind(&self) -> StepActionKind {
        match self {
            StepAction::SetProperty { .. } => StepActionKind::SetProperty,
        }
    }

    pub fn property_id(&self) -> &PropertyId {
        match self {
            StepAction::SetProperty { property_id, .. } => property_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub target_device_id: DeviceId,
    pub action: StepAction,
    pub critical: bool,
    pub label: String,
}

/// Step as announced in events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub index: usize,
    pub label: String,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub activity_key: ActivityKey,
    pub resolved: ResolvedDevices,
    pub steps: Vec<ExecutionStep>,
}

impl ExecutionPlan {
    pub fn empty(activity_key: ActivityKey) -> Self {
        Self {
            activity_key,
            resolved: ResolvedDevices::default(),
            steps: Vec::new(),
        }
    }

    pub fn descriptors(&self) -> Vec<StepDescriptor> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepDescriptor {
                index,
                label: step.label.clone(),
                critical: step.critical,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDiagnosticKind {
    /// A bound endpoint is gone or no longer has the slot's type.
    MissingEndpoint,
    /// An override is configured but its endpoint cannot apply it.
    OverrideSkipped,
    /// A bound device has no power control.
    PowerSkipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDiagnostic {
    pub kind: PlanDiagnosticKind,
    pub field: Option<String>,
    pub message: String,
}

/// Plan plus the guardrails hit while building it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedActivation {
    pub plan: ExecutionPlan,
    pub diagnostics: Vec<PlanDiagnostic>,
}

struct BoundEndpoints<'a> {
    display: Option<&'a DerivedEndpoint>,
    audio: Option<&'a DerivedEndpoint>,
    source: Option<&'a DerivedEndpoint>,
    remote: Option<&'a DerivedEndpoint>,
}

impl<'a> BoundEndpoints<'a> {
    fn resolve(
        settings: &BindingSettings,
        endpoints: &'a EndpointMap,
        diagnostics: &mut Vec<PlanDiagnostic>,
    ) -> Self {
        let mut lookup = |slot: BindingSlot| {
            let id = settings.slot(slot)?;
            let found = endpoints
                .get(id)
                .filter(|e| e.endpoint_type == slot.expected_type());
            if found.is_none() {
                diagnostics.push(PlanDiagnostic {
                    kind: PlanDiagnosticKind::MissingEndpoint,
                    field: Some(slot.field_name().to_string()),
                    message: format!("Endpoint {id} is no longer available; slot skipped"),
                });
            }
            found
        };

        Self {
            display: lookup(BindingSlot::Display),
            audio: lookup(BindingSlot::Audio),
            source: lookup(BindingSlot::Source),
            remote: lookup(BindingSlot::Remote),
        }
    }

    fn resolved(&self, endpoints: &EndpointMap) -> ResolvedDevices {
        let device = |e: Option<&DerivedEndpoint>| e.map(|e| e.device_id.clone());
        ResolvedDevices {
            display_device_id: device(self.display),
            audio_device_id: device(self.audio),
            source_device_id: device(self.source),
            remote_device_id: device(self.remote),
            control_targets: resolve_control_targets(self, endpoints),
        }
    }
}

/// Preferred endpoints in order, then the first fallback that satisfies `capable`.
fn pick<'a>(
    preferred: &[Option<&'a DerivedEndpoint>],
    fallback: impl Iterator<Item = &'a DerivedEndpoint>,
    capable: impl Fn(&DerivedEndpoint) -> bool,
) -> Option<DeviceId> {
    preferred
        .iter()
        .flatten()
        .copied()
        .find(|e| capable(*e))
        .or_else(|| fallback.into_iter().find(|e| capable(*e)))
        .map(|e| e.device_id.clone())
}

fn resolve_control_targets(bound: &BoundEndpoints<'_>, endpoints: &EndpointMap) -> ControlTargets {
    ControlTargets {
        volume_target_device_id: pick(
            &[bound.audio, bound.display],
            endpoints.of_type(EndpointType::AudioOutput),
            |e| e.capabilities.volume,
        ),
        input_target_device_id: pick(
            &[bound.display],
            endpoints.of_type(EndpointType::Display),
            |e| e.capabilities.input_select,
        ),
        playback_target_device_id: pick(
            &[bound.source, bound.audio],
            endpoints.iter(),
            |e| e.capabilities.playback,
        ),
        remote_target_device_id: pick(
            &[bound.remote, bound.display],
            endpoints.of_type(EndpointType::RemoteTarget),
            |e| e.capabilities.remote_commands,
        ),
    }
}

/// Build the ordered plan for `key` from its binding settings.
///
/// Step order: power-on of every distinct bound device, display input,
/// audio input, source input, volume preset.
pub fn build_execution_plan(
    key: ActivityKey,
    settings: &BindingSettings,
    endpoints: &EndpointMap,
) -> PlannedActivation {
    let mut diagnostics = Vec::new();
    let bound = BoundEndpoints::resolve(settings, endpoints, &mut diagnostics);
    let resolved = bound.resolved(endpoints);
    let mut steps = Vec::new();

    let mut powered: HashSet<&DeviceId> = HashSet::new();
    for endpoint in [bound.display, bound.audio, bound.source].into_iter().flatten() {
        if powered.contains(&endpoint.device_id) {
            continue;
        }
        let Some(power) = &endpoint.links.power else {
            diagnostics.push(PlanDiagnostic {
                kind: PlanDiagnosticKind::PowerSkipped,
                field: None,
                message: format!("{} has no power control; power-on skipped", endpoint.name),
            });
            continue;
        };
        powered.insert(&endpoint.device_id);
        steps.push(ExecutionStep {
            target_device_id: endpoint.device_id.clone(),
            action: StepAction::SetProperty {
                property_id: power.property_id.clone(),
                value: PropertyValue::Bool(true),
            },
            critical: key.is_video(),
            label: format!("Power on {}", endpoint.name),
        });
    }

    let input_overrides = [
        (BindingOverride::DisplayInput, bound.display, &settings.display_input_id, "display"),
        (BindingOverride::AudioInput, bound.audio, &settings.audio_input_id, "audio"),
        (BindingOverride::SourceInput, bound.source, &settings.source_input_id, "source"),
    ];
    for (item, endpoint, input_id, role) in input_overrides {
        let Some(input_id) = input_id else {
            continue;
        };
        match endpoint.and_then(|e| e.links.input_select.as_ref().map(|l| (e, l))) {
            Some((endpoint, link)) => steps.push(ExecutionStep {
                target_device_id: endpoint.device_id.clone(),
                action: StepAction::SetProperty {
                    property_id: link.property_id.clone(),
                    value: PropertyValue::Text(input_id.clone()),
                },
                critical: true,
                label: format!("Set {role} input to {input_id}"),
            }),
            None => diagnostics.push(override_skipped(item, "input selection")),
        }
    }

    if let Some(preset) = settings.audio_volume_preset {
        match bound.audio.and_then(|e| e.links.volume.as_ref().map(|l| (e, l))) {
            Some((endpoint, link)) => steps.push(ExecutionStep {
                target_device_id: endpoint.device_id.clone(),
                action: StepAction::SetProperty {
                    property_id: link.property_id.clone(),
                    value: PropertyValue::Int(i64::from(preset)),
                },
                critical: false,
                label: format!("Set volume to {preset}%"),
            }),
            None => diagnostics.push(override_skipped(
                BindingOverride::AudioVolumePreset,
                "volume control",
            )),
        }
    }

    PlannedActivation {
        plan: ExecutionPlan {
            activity_key: key,
            resolved,
            steps,
        },
        diagnostics,
    }
}

fn override_skipped(item: BindingOverride, needs: &str) -> PlanDiagnostic {
    PlanDiagnostic {
        kind: PlanDiagnosticKind::OverrideSkipped,
        field: Some(item.field_name().to_string()),
        message: format!(
            "{} skipped: {} endpoint is unavailable or lacks {needs}",
            item.field_name(),
            item.parent().field_name()
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::capability::{CapabilityLink, CapabilityPermission, CapabilitySummary, MediaCapability};
    use crate::device::DeviceCategory;
    use crate::endpoint::{endpoint_type_rules, project_device};
    use crate::ids::{ChannelId, EndpointId, SpaceId};

    fn summary(id: &str, category: DeviceCategory, caps: &[MediaCapability]) -> CapabilitySummary {
        let capabilities: BTreeMap<_, _> = caps
            .iter()
            .map(|cap| {
                (
                    *cap,
                    CapabilityLink {
                        property_id: PropertyId::from(format!("{id}-{cap:?}").to_lowercase()),
                        channel_id: ChannelId::from(format!("{id}-ch")),
                        permission: CapabilityPermission::ReadWrite,
                    },
                )
            })
            .collect();
        let suggested_endpoint_types = endpoint_type_rules(category)
            .iter()
            .filter(|r| r.requires.map_or(true, |c| capabilities.contains_key(&c)))
            .map(|r| r.endpoint_type)
            .collect();
        CapabilitySummary {
            device_id: DeviceId::from(id),
            device_name: id.to_uppercase(),
            device_category: category,
            online: true,
            capabilities,
            suggested_endpoint_types,
        }
    }

    fn rig() -> EndpointMap {
        use MediaCapability::*;
        let space = SpaceId::from("s");
        let summaries = [
            summary("tv", DeviceCategory::Television, &[Power, Input, Remote]),
            summary("avr", DeviceCategory::AvReceiver, &[Power, Volume, Mute, Input]),
            summary("streamer", DeviceCategory::StreamingService, &[Power, Playback, PlaybackState]),
        ];
        EndpointMap::new(summaries.iter().flat_map(|s| project_device(&space, s)).collect())
    }

    fn watch_settings() -> BindingSettings {
        BindingSettings {
            display_endpoint_id: Some(EndpointId::from("s:display:tv")),
            audio_endpoint_id: Some(EndpointId::from("s:audio_output:avr")),
            source_endpoint_id: Some(EndpointId::from("s:source:streamer")),
            remote_endpoint_id: Some(EndpointId::from("s:remote_target:tv")),
            display_input_id: Some("hdmi2".to_string()),
            audio_volume_preset: Some(40),
            ..Default::default()
        }
    }

    #[test]
    fn steps_follow_power_input_volume_order() {
        let planned = build_execution_plan(ActivityKey::Watch, &watch_settings(), &rig());
        let labels: Vec<&str> = planned.plan.steps.iter().map(|s| s.label.as_str()).collect();

        assert_eq!(
            labels,
            vec![
                "Power on TV (Display)",
                "Power on AVR (Audio Output)",
                "Power on STREAMER (Source)",
                "Set display input to hdmi2",
                "Set volume to 40%",
            ]
        );
        assert!(planned.plan.steps[..4].iter().all(|s| s.critical));
        assert!(!planned.plan.steps[4].critical);
        assert!(planned.diagnostics.is_empty());
    }

    #[test]
    fn power_steps_are_not_critical_for_audio_activities() {
        let settings = BindingSettings {
            audio_endpoint_id: Some(EndpointId::from("s:audio_output:avr")),
            ..Default::default()
        };
        let planned = build_execution_plan(ActivityKey::Listen, &settings, &rig());
        assert_eq!(planned.plan.steps.len(), 1);
        assert!(!planned.plan.steps[0].critical);
    }

    #[test]
    fn power_on_is_deduplicated_per_device() {
        let mut settings = watch_settings();
        settings.audio_endpoint_id = None;
        settings.source_endpoint_id = Some(EndpointId::from("s:source:avr"));
        let planned = build_execution_plan(ActivityKey::Gaming, &settings, &rig());

        let power_targets: Vec<&str> = planned
            .plan
            .steps
            .iter()
            .filter(|s| s.label.starts_with("Power on"))
            .map(|s| s.target_device_id.as_str())
            .collect();
        assert_eq!(power_targets, vec!["tv", "avr"]);
    }

    #[test]
    fn vanished_endpoint_becomes_a_diagnostic() {
        let mut settings = watch_settings();
        settings.display_endpoint_id = Some(EndpointId::from("s:display:projector"));
        let planned = build_execution_plan(ActivityKey::Watch, &settings, &rig());

        assert!(planned.plan.resolved.display_device_id.is_none());
        let kinds: Vec<_> = planned.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![PlanDiagnosticKind::MissingEndpoint, PlanDiagnosticKind::OverrideSkipped]
        );
    }

    #[test]
    fn control_targets_fall_back_across_endpoints() {
        let settings = BindingSettings {
            display_endpoint_id: Some(EndpointId::from("s:display:tv")),
            ..Default::default()
        };
        let planned = build_execution_plan(ActivityKey::Watch, &settings, &rig());
        let targets = &planned.plan.resolved.control_targets;

        assert_eq!(targets.volume_target_device_id, Some(DeviceId::from("avr")));
        assert_eq!(targets.input_target_device_id, Some(DeviceId::from("tv")));
        assert_eq!(targets.playback_target_device_id, Some(DeviceId::from("streamer")));
        assert_eq!(targets.remote_target_device_id, Some(DeviceId::from("tv")));
    }
}
