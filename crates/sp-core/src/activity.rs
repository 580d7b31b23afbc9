//! Per-space activation record and its typed snapshots.

use serde::{Deserialize, Serialize};

use crate::ids::{ActiveActivityId, DeviceId, PropertyId, SpaceId};
use crate::ActivityKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    Activating,
    Active,
    Failed,
    Deactivated,
}

impl ActivationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationState::Activating => "activating",
            ActivationState::Active => "active",
            ActivationState::Failed => "failed",
            ActivationState::Deactivated => "deactivated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "activating" => Some(ActivationState::Activating),
            "active" => Some(ActivationState::Active),
            "failed" => Some(ActivationState::Failed),
            "deactivated" => Some(ActivationState::Deactivated),
            _ => None,
        }
    }

    /// Activating or active.
    pub fn is_running(&self) -> bool {
        matches!(self, ActivationState::Activating | ActivationState::Active)
    }
}

impl std::fmt::Display for ActivationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best device per control, a UI hint only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTargets {
    pub volume_target_device_id: Option<DeviceId>,
    pub input_target_device_id: Option<DeviceId>,
    pub playback_target_device_id: Option<DeviceId>,
    pub remote_target_device_id: Option<DeviceId>,
}

/// Devices an activation resolved its slots to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDevices {
    pub display_device_id: Option<DeviceId>,
    pub audio_device_id: Option<DeviceId>,
    pub source_device_id: Option<DeviceId>,
    pub remote_device_id: Option<DeviceId>,
    pub control_targets: ControlTargets,
}

impl ResolvedDevices {
    /// Distinct bound devices, slot order.
    pub fn device_ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = Vec::new();
        for id in [
            &self.display_device_id,
            &self.audio_device_id,
            &self.source_device_id,
            &self.remote_device_id,
        ]
        .into_iter()
        .flatten()
        {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepActionKind {
    SetProperty,
}

/// Why one plan step did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// `None` for failures outside any step.
    pub step_index: Option<usize>,
    pub label: String,
    pub critical: bool,
    pub reason: String,
    pub target_device_id: Option<DeviceId>,
    pub kind: StepActionKind,
    pub property_id: Option<PropertyId>,
    pub timestamp_ms: i64,
}

/// Outcome of one plan execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSummary {
    pub steps_total: usize,
    pub steps_succeeded: usize,
    pub steps_failed: usize,
    pub failures: Vec<StepFailure>,
    /// Non-critical failures.
    pub warnings: Vec<StepFailure>,
    /// Critical failures.
    pub errors: Vec<StepFailure>,
    pub warning_count: usize,
    pub error_count: usize,
    /// Best-effort notes raised outside the plan, e.g. a paused conflicting source.
    #[serde(default)]
    pub advisories: Vec<String>,
}

impl ActivationSummary {
    pub fn new(steps_total: usize, steps_succeeded: usize, failures: Vec<StepFailure>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = failures.iter().cloned().partition(|f| f.critical);
        Self {
            steps_total,
            steps_succeeded,
            steps_failed: failures.len(),
            warning_count: warnings.len(),
            error_count: errors.len(),
            failures,
            warnings,
            errors,
            advisories: Vec::new(),
        }
    }

    pub fn has_critical_failure(&self) -> bool {
        self.error_count > 0
    }

    /// Human-readable form of the non-critical failures.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(|w| format!("{}: {}", w.label, w.reason))
            .collect()
    }

    /// Advisories first, then the non-critical step failures.
    /// 返回给调用方的完整警告列表。
    pub fn all_warnings(&self) -> Vec<String> {
        let mut messages = self.advisories.clone();
        messages.extend(self.warning_messages());
        messages
    }
}

/// The single "current activity" row of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveActivityRecord {
    pub id: ActiveActivityId,
    pub space_id: SpaceId,
    pub activity_key: Option<ActivityKey>,
    pub state: ActivationState,
    pub activated_at_ms: Option<i64>,
    pub resolved: Option<ResolvedDevices>,
    pub last_result: Option<ActivationSummary>,
    pub updated_at_ms: i64,
}

impl ActiveActivityRecord {
    /// Row for a space that has never been activated.
    pub fn deactivated(space_id: SpaceId, now_ms: i64) -> Self {
        Self {
            id: ActiveActivityId::new(),
            space_id,
            activity_key: None,
            state: ActivationState::Deactivated,
            activated_at_ms: None,
            resolved: None,
            last_result: None,
            updated_at_ms: now_ms,
        }
    }

    /// Whether `key` is already running here, so activating it again is a no-op.
    pub fn is_running(&self, key: ActivityKey) -> bool {
        self.activity_key == Some(key) && self.state.is_running()
    }

    /// Start a new activation cycle.
    pub fn begin(&mut self, key: ActivityKey, resolved: ResolvedDevices, now_ms: i64) {
        self.activity_key = Some(key);
        self.state = ActivationState::Activating;
        self.activated_at_ms = Some(now_ms);
        self.resolved = Some(resolved);
        self.last_result = None;
        self.updated_at_ms = now_ms;
    }

    /// Close the cycle: failed iff a critical step failed.
    pub fn finish(&mut self, summary: ActivationSummary, now_ms: i64) {
        self.state = if summary.has_critical_failure() {
            ActivationState::Failed
        } else {
            ActivationState::Active
        };
        self.last_result = Some(summary);
        self.updated_at_ms = now_ms;
    }

    /// Force a failed cycle for `key`, whatever state the record was in.
    pub fn fail(&mut self, key: ActivityKey, summary: ActivationSummary, now_ms: i64) {
        self.activity_key = Some(key);
        self.state = ActivationState::Failed;
        self.last_result = Some(summary);
        self.updated_at_ms = now_ms;
    }

    pub fn deactivate(&mut self, now_ms: i64) {
        self.activity_key = None;
        self.state = ActivationState::Deactivated;
        self.last_result = None;
        self.updated_at_ms = now_ms;
    }

    pub fn to_result(&self, warnings: Vec<String>) -> ActivationResult {
        ActivationResult {
            activity_key: self.activity_key,
            state: self.state,
            resolved: self.resolved.clone(),
            summary: self.last_result.clone(),
            warnings,
        }
    }
}

/// What `activate` / `deactivate` hand back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResult {
    pub activity_key: Option<ActivityKey>,
    pub state: ActivationState,
    pub resolved: Option<ResolvedDevices>,
    pub summary: Option<ActivationSummary>,
    pub warnings: Vec<String>,
}
