use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use sp_core::activity::{
    ActivationResult, ActivationState, ActivationSummary, ActiveActivityRecord, ResolvedDevices,
    StepActionKind, StepFailure,
};
use sp_core::binding::{BindingSettings, BindingValidationError};
use sp_core::endpoint::{DerivedEndpoint, EndpointMap};
use sp_core::events::MediaActivityEvent;
use sp_core::ids::SpaceId;
use sp_core::plan::{build_execution_plan, ExecutionPlan, ExecutionStep, PlanDiagnostic};
use sp_core::ports::{ActiveActivityRepositoryPort, ClockPort, MediaActivityEventPort};
use sp_core::ActivityKey;

use crate::errors::MediaActivityError;
use crate::usecases::activity::{PlanExecutor, SpaceLocks};
use crate::usecases::bindings::ActivityBindingService;
use crate::usecases::DeriveMediaEndpoints;

/// Dry-run view of an activation: what would be dispatched, and what was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationPreview {
    pub activity_key: ActivityKey,
    pub resolved: ResolvedDevices,
    pub steps: Vec<ExecutionStep>,
    pub diagnostics: Vec<PlanDiagnostic>,
}

/// Drives the per-space activation state machine.
///
/// `activate` and `deactivate` hold the space's lock for their whole run, so
/// calls on one space are linearizable while other spaces proceed in parallel.
pub struct MediaActivityOrchestrator {
    endpoints: Arc<DeriveMediaEndpoints>,
    bindings: Arc<ActivityBindingService>,
    records: Arc<dyn ActiveActivityRepositoryPort>,
    executor: Arc<PlanExecutor>,
    events: Arc<dyn MediaActivityEventPort>,
    clock: Arc<dyn ClockPort>,
    locks: SpaceLocks,
}

impl MediaActivityOrchestrator {
    pub fn new(
        endpoints: Arc<DeriveMediaEndpoints>,
        bindings: Arc<ActivityBindingService>,
        records: Arc<dyn ActiveActivityRepositoryPort>,
        executor: Arc<PlanExecutor>,
        events: Arc<dyn MediaActivityEventPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            endpoints,
            bindings,
            records,
            executor,
            events,
            clock,
            locks: SpaceLocks::default(),
        }
    }

    pub async fn get_active(&self, space_id: &SpaceId) -> Result<Option<ActiveActivityRecord>, MediaActivityError> {
        self.endpoints.ensure_space(space_id).await?;
        Ok(self.records.find_by_space(space_id).await?)
    }

    #[tracing::instrument(
        name = "usecase.media_activity.activate",
        skip(self),
        fields(space_id = %space_id, activity_key = %key)
    )]
    pub async fn activate(&self, space_id: &SpaceId, key: ActivityKey) -> Result<ActivationResult, MediaActivityError> {
        self.endpoints.ensure_space(space_id).await?;
        let _guard = self.locks.lock(space_id).await;

        if key == ActivityKey::Off {
            return self.deactivate_locked(space_id).await;
        }

        let existing = self.records.find_by_space(space_id).await?;
        if let Some(record) = existing.as_ref().filter(|r| r.is_running(key)) {
            info!(state = %record.state, "Activity already running, returning stored result");
            let warnings = record
                .last_result
                .as_ref()
                .map(ActivationSummary::all_warnings)
                .unwrap_or_default();
            return Ok(record.to_result(warnings));
        }

        let binding = self
            .bindings
            .find_for_key(space_id, key)
            .await?
            .ok_or_else(|| BindingValidationError::MissingBinding {
                key,
                space_id: space_id.clone(),
            })?;

        let previous = existing
            .as_ref()
            .filter(|r| r.state.is_running())
            .and_then(|r| r.activity_key)
            .filter(|k| *k != key);
        let mut record =
            existing.unwrap_or_else(|| ActiveActivityRecord::deactivated(space_id.clone(), self.clock.now_ms()));

        let mut steps_total = 0;
        match self
            .run_activation(space_id, key, &binding.settings, previous, &mut record, &mut steps_total)
            .await
        {
            Ok(result) => Ok(result),
            Err(err) => Ok(self
                .fail_unexpected(space_id, key, &mut record, steps_total, err)
                .await),
        }
    }

    #[tracing::instrument(name = "usecase.media_activity.deactivate", skip(self), fields(space_id = %space_id))]
    pub async fn deactivate(&self, space_id: &SpaceId) -> Result<ActivationResult, MediaActivityError> {
        self.endpoints.ensure_space(space_id).await?;
        let _guard = self.locks.lock(space_id).await;
        self.deactivate_locked(space_id).await
    }

    pub async fn preview(&self, space_id: &SpaceId, key: ActivityKey) -> Result<ActivationPreview, MediaActivityError> {
        self.endpoints.ensure_space(space_id).await?;

        if key == ActivityKey::Off {
            let plan = ExecutionPlan::empty(key);
            return Ok(ActivationPreview {
                activity_key: key,
                resolved: plan.resolved,
                steps: plan.steps,
                diagnostics: Vec::new(),
            });
        }

        let binding = self
            .bindings
            .find_for_key(space_id, key)
            .await?
            .ok_or_else(|| BindingValidationError::MissingBinding {
                key,
                space_id: space_id.clone(),
            })?;
        let endpoints = self.endpoints.endpoint_map(space_id).await?;
        let planned = build_execution_plan(key, &binding.settings, &endpoints);

        Ok(ActivationPreview {
            activity_key: key,
            resolved: planned.plan.resolved,
            steps: planned.plan.steps,
            diagnostics: planned.diagnostics,
        })
    }

    async fn run_activation(
        &self,
        space_id: &SpaceId,
        key: ActivityKey,
        settings: &BindingSettings,
        previous: Option<ActivityKey>,
        record: &mut ActiveActivityRecord,
        steps_total: &mut usize,
    ) -> anyhow::Result<ActivationResult> {
        let endpoints = self.endpoints.endpoint_map(space_id).await?;
        let planned = build_execution_plan(key, settings, &endpoints);
        for diagnostic in &planned.diagnostics {
            warn!(kind = ?diagnostic.kind, field = ?diagnostic.field, "{}", diagnostic.message);
        }
        let plan = planned.plan;
        *steps_total = plan.steps.len();

        record.begin(key, plan.resolved.clone(), self.clock.now_ms());
        self.records.save(record).await?;
        self.events
            .emit(MediaActivityEvent::Activating {
                space_id: space_id.clone(),
                activity_key: key,
                state: ActivationState::Activating,
                resolved: plan.resolved.clone(),
                steps: plan.descriptors(),
                timestamp_ms: self.clock.now_ms(),
            })
            .await;
        info!(steps = plan.steps.len(), "Activation started");

        let advisories = match previous {
            Some(previous) if previous.is_audio_only() && key.is_video() => {
                let playing: Vec<&DerivedEndpoint> =
                    endpoints.iter().filter(|e| e.links.playback.is_some()).collect();
                self.executor.pause_playback(&playing, Some(previous)).await
            }
            _ => Vec::new(),
        };

        let mut summary = self.executor.execute(space_id, &plan).await?;
        summary.advisories = advisories;
        let warnings = summary.all_warnings();
        record.finish(summary.clone(), self.clock.now_ms());
        self.records.save(record).await?;

        let timestamp_ms = self.clock.now_ms();
        let resolved = record.resolved.clone();
        let event = if record.state == ActivationState::Failed {
            warn!(failed = summary.steps_failed, "Activation failed");
            MediaActivityEvent::Failed {
                space_id: space_id.clone(),
                activity_key: key,
                state: record.state,
                resolved,
                summary,
                warnings: warnings.clone(),
                timestamp_ms,
            }
        } else {
            info!(
                succeeded = summary.steps_succeeded,
                warnings = warnings.len(),
                "Activation completed"
            );
            MediaActivityEvent::Activated {
                space_id: space_id.clone(),
                activity_key: key,
                state: record.state,
                resolved,
                summary,
                warnings: warnings.clone(),
                timestamp_ms,
            }
        };
        self.events.emit(event).await;

        Ok(record.to_result(warnings))
    }

    /// Never leave a record in `activating`: turn the error into a failed cycle.
    /// `steps_total` is the plan size, or 0 when the error came before planning.
    async fn fail_unexpected(
        &self,
        space_id: &SpaceId,
        key: ActivityKey,
        record: &mut ActiveActivityRecord,
        steps_total: usize,
        err: anyhow::Error,
    ) -> ActivationResult {
        error!(error = %err, "Activation aborted by unexpected error");
        let now_ms = self.clock.now_ms();
        let failure = StepFailure {
            step_index: None,
            label: "Activation".to_string(),
            critical: true,
            reason: format!("Unexpected error: {err}"),
            target_device_id: None,
            kind: StepActionKind::SetProperty,
            property_id: None,
            timestamp_ms: now_ms,
        };
        let summary = ActivationSummary::new(steps_total, 0, vec![failure]);
        record.fail(key, summary.clone(), now_ms);

        if let Err(save_err) = self.records.save(record).await {
            error!(error = %save_err, "Failed to persist failed activation");
        }
        self.events
            .emit(MediaActivityEvent::Failed {
                space_id: space_id.clone(),
                activity_key: key,
                state: record.state,
                resolved: record.resolved.clone(),
                summary,
                warnings: Vec::new(),
                timestamp_ms: now_ms,
            })
            .await;

        record.to_result(Vec::new())
    }

    async fn deactivate_locked(&self, space_id: &SpaceId) -> Result<ActivationResult, MediaActivityError> {
        let existing = self.records.find_by_space(space_id).await?;

        let mut warnings = Vec::new();
        let result = match existing {
            Some(mut record) => {
                if record.state != ActivationState::Deactivated {
                    if let Some(resolved) = &record.resolved {
                        warnings = self.stop_playback(space_id, resolved).await;
                    }
                }
                record.deactivate(self.clock.now_ms());
                self.records.save(&record).await?;
                record.to_result(warnings.clone())
            }
            // Nothing was ever activated here: report it, but store nothing.
            None => {
                debug!("No activity record, nothing to persist");
                ActivationResult {
                    activity_key: None,
                    state: ActivationState::Deactivated,
                    resolved: None,
                    summary: None,
                    warnings: Vec::new(),
                }
            }
        };

        self.events
            .emit(MediaActivityEvent::Deactivated {
                space_id: space_id.clone(),
                activity_key: None,
                state: ActivationState::Deactivated,
                warnings: warnings.clone(),
                timestamp_ms: self.clock.now_ms(),
            })
            .await;
        info!(warnings = warnings.len(), "Activity deactivated");

        Ok(result)
    }

    /// Stop pass over the devices of the last resolved snapshot.
    async fn stop_playback(&self, space_id: &SpaceId, resolved: &ResolvedDevices) -> Vec<String> {
        let endpoints: EndpointMap = match self.endpoints.endpoint_map(space_id).await {
            Ok(endpoints) => endpoints,
            Err(err) => {
                warn!(error = %err, "Cannot load endpoints for stop pass");
                return vec![format!("Failed to stop playback: {err} (non-critical)")];
            }
        };

        let device_ids = resolved.device_ids();
        let playing: Vec<&DerivedEndpoint> = endpoints
            .iter()
            .filter(|e| device_ids.contains(&e.device_id) && e.links.playback.is_some())
            .collect();
        debug!(targets = playing.len(), "Stopping playback");

        self.executor.pause_playback(&playing, None).await
    }
}
