//! Lifecycle events of media activations.

use serde::{Deserialize, Serialize};

use crate::activity::{ActivationState, ActivationSummary, ResolvedDevices};
use crate::ids::SpaceId;
use crate::plan::StepDescriptor;
use crate::ActivityKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Executing,
    Succeeded,
    Failed,
}

/// Every variant carries the space, the activity key, the record state and a
/// timestamp. `activity_key` is `null` once the space is deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MediaActivityEvent {
    Activating {
        space_id: SpaceId,
        activity_key: ActivityKey,
        state: ActivationState,
        resolved: ResolvedDevices,
        steps: Vec<StepDescriptor>,
        timestamp_ms: i64,
    },
    StepProgress {
        space_id: SpaceId,
        activity_key: ActivityKey,
        /// Still `activating` while steps run.
        state: ActivationState,
        step_index: usize,
        steps_total: usize,
        status: StepStatus,
        label: String,
        timestamp_ms: i64,
    },
    Activated {
        space_id: SpaceId,
        activity_key: ActivityKey,
        state: ActivationState,
        resolved: Option<ResolvedDevices>,
        summary: ActivationSummary,
        warnings: Vec<String>,
        timestamp_ms: i64,
    },
    Failed {
        space_id: SpaceId,
        activity_key: ActivityKey,
        state: ActivationState,
        resolved: Option<ResolvedDevices>,
        summary: ActivationSummary,
        warnings: Vec<String>,
        timestamp_ms: i64,
    },
    Deactivated {
        space_id: SpaceId,
        activity_key: Option<ActivityKey>,
        state: ActivationState,
        warnings: Vec<String>,
        timestamp_ms: i64,
    },
}

impl MediaActivityEvent {
    pub fn space_id(&self) -> &SpaceId {
        match self {
            Self::Activating { space_id, .. }
            | Self::StepProgress { space_id, .. }
            | Self::Activated { space_id, .. }
            | Self::Failed { space_id, .. }
            | Self::Deactivated { space_id, .. } => space_id,
        }
    }

    /// `None` once the space is deactivated.
    pub fn activity_key(&self) -> Option<ActivityKey> {
        match self {
            Self::Activating { activity_key, .. }
            | Self::StepProgress { activity_key, .. }
            | Self::Activated { activity_key, .. }
            | Self::Failed { activity_key, .. } => Some(*activity_key),
            Self::Deactivated { activity_key, .. } => *activity_key,
        }
    }

    pub fn state(&self) -> ActivationState {
        match self {
            Self::Activating { state, .. }
            | Self::StepProgress { state, .. }
            | Self::Activated { state, .. }
            | Self::Failed { state, .. }
            | Self::Deactivated { state, .. } => *state,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Activating { .. } => "media_activity.activating",
            Self::StepProgress { .. } => "media_activity.step_progress",
            Self::Activated { .. } => "media_activity.activated",
            Self::Failed { .. } => "media_activity.failed",
            Self::Deactivated { .. } => "media_activity.deactivated",
        }
    }
}
