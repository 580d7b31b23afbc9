//! Sequential plan execution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use sp_core::activity::{ActivationState, ActivationSummary, StepFailure};
use sp_core::config::MediaConfig;
use sp_core::device::{Device, PropertyValue};
use sp_core::endpoint::DerivedEndpoint;
use sp_core::events::{MediaActivityEvent, StepStatus};
use sp_core::ids::{DeviceId, PropertyId, SpaceId};
use sp_core::plan::{ExecutionPlan, ExecutionStep, StepAction};
use sp_core::ports::{
    ClockPort, DeviceGraphError, DeviceGraphPort, MediaActivityEventPort, PlatformRegistryPort,
    PropertyCommand,
};
use sp_core::ActivityKey;

const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(250);
const PAUSE_COMMAND: &str = "pause";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Bound on a single dispatch. Advisory: the platform call is dropped, not undone.
    pub step_timeout: Duration,
    /// Wait before each step so a preceding power-on can take effect.
    pub settle_delay: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            step_timeout: DEFAULT_STEP_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl ExecutionConfig {
    /// Zero values in the config fall back to the defaults.
    pub fn from_media_config(config: &MediaConfig) -> Self {
        let or_default = |ms: u64, default: Duration| {
            if ms == 0 {
                default
            } else {
                Duration::from_millis(ms)
            }
        };
        Self {
            step_timeout: or_default(config.step_timeout_ms, DEFAULT_STEP_TIMEOUT),
            settle_delay: or_default(config.step_settle_delay_ms, DEFAULT_SETTLE_DELAY),
        }
    }
}

/// Dispatches plan steps one at a time, in plan order.
pub struct PlanExecutor {
    device_graph: Arc<dyn DeviceGraphPort>,
    platforms: Arc<dyn PlatformRegistryPort>,
    events: Arc<dyn MediaActivityEventPort>,
    clock: Arc<dyn ClockPort>,
    config: ExecutionConfig,
}

impl PlanExecutor {
    pub fn new(
        device_graph: Arc<dyn DeviceGraphPort>,
        platforms: Arc<dyn PlatformRegistryPort>,
        events: Arc<dyn MediaActivityEventPort>,
        clock: Arc<dyn ClockPort>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            device_graph,
            platforms,
            events,
            clock,
            config,
        }
    }

    /// Run every step of `plan`. A failed critical step stops the run.
    ///
    /// Step failures are part of the summary; only a failing device graph
    /// read is returned as an error.
    pub async fn execute(
        &self,
        space_id: &SpaceId,
        plan: &ExecutionPlan,
    ) -> Result<ActivationSummary, DeviceGraphError> {
        let devices = self.load_devices(plan.steps.iter().map(|s| &s.target_device_id)).await?;
        let steps_total = plan.steps.len();
        let mut steps_succeeded = 0;
        let mut failures = Vec::new();

        for (index, step) in plan.steps.iter().enumerate() {
            self.progress(space_id, plan.activity_key, index, steps_total, step, StepStatus::Executing)
                .await;

            if !self.config.settle_delay.is_zero() {
                tokio::time::sleep(self.config.settle_delay).await;
            }

            match self.run_step(&devices, step).await {
                Ok(()) => {
                    steps_succeeded += 1;
                    debug!(step_index = index, label = %step.label, "Step succeeded");
                    self.progress(space_id, plan.activity_key, index, steps_total, step, StepStatus::Succeeded)
                        .await;
                }
                Err(reason) => {
                    warn!(
                        step_index = index,
                        label = %step.label,
                        critical = step.critical,
                        reason = %reason,
                        "Step failed"
                    );
                    self.progress(space_id, plan.activity_key, index, steps_total, step, StepStatus::Failed)
                        .await;
                    failures.push(StepFailure {
                        step_index: Some(index),
                        label: step.label.clone(),
                        critical: step.critical,
                        reason,
                        target_device_id: Some(step.target_device_id.clone()),
                        kind: step.action.kind(),
                        property_id: Some(step.action.property_id().clone()),
                        timestamp_ms: self.clock.now_ms(),
                    });
                    if step.critical {
                        info!(
                            skipped = steps_total - index - 1,
                            "Critical step failed, aborting remaining steps"
                        );
                        break;
                    }
                }
            }
        }

        Ok(ActivationSummary::new(steps_total, steps_succeeded, failures))
    }

    /// Best-effort pause of every given endpoint's playback, once per device.
    ///
    /// Never fails: each problem becomes a warning string. With `conflict`
    /// set, successful pauses are reported too.
    pub async fn pause_playback(
        &self,
        endpoints: &[&DerivedEndpoint],
        conflict: Option<ActivityKey>,
    ) -> Vec<String> {
        let mut targets: Vec<(&DerivedEndpoint, &PropertyId)> = Vec::new();
        for endpoint in endpoints {
            let Some(link) = &endpoint.links.playback else {
                continue;
            };
            if targets.iter().all(|(e, _)| e.device_id != endpoint.device_id) {
                targets.push((endpoint, &link.property_id));
            }
        }
        if targets.is_empty() {
            return Vec::new();
        }

        let devices = match self.load_devices(targets.iter().map(|(e, _)| &e.device_id)).await {
            Ok(devices) => devices,
            Err(err) => return vec![format!("Failed to pause playback: {err} (non-critical)")],
        };

        let mut warnings = Vec::new();
        for (endpoint, property_id) in targets {
            let outcome = match devices.get(&endpoint.device_id) {
                Some(device) => {
                    self.dispatch(device, property_id, PropertyValue::Text(PAUSE_COMMAND.to_string()))
                        .await
                }
                None => Err(format!("Device {} not found", endpoint.device_id)),
            };
            match (outcome, conflict) {
                (Ok(()), Some(key)) => {
                    warnings.push(format!("Paused playback on {} (conflict with {key})", endpoint.name))
                }
                (Ok(()), None) => debug!(endpoint = %endpoint.name, "Paused playback"),
                (Err(reason), _) => {
                    warn!(endpoint = %endpoint.name, reason = %reason, "Failed to pause playback");
                    warnings.push(format!("Failed to pause {}: {reason} (non-critical)", endpoint.name))
                }
            }
        }
        warnings
    }

    async fn load_devices<'a>(
        &self,
        ids: impl Iterator<Item = &'a DeviceId>,
    ) -> Result<HashMap<DeviceId, Device>, DeviceGraphError> {
        let mut unique: Vec<DeviceId> = Vec::new();
        for id in ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let devices = self.device_graph.find_devices_by_ids(&unique).await?;
        Ok(devices.into_iter().map(|d| (d.id.clone(), d)).collect())
    }

    async fn run_step(&self, devices: &HashMap<DeviceId, Device>, step: &ExecutionStep) -> Result<(), String> {
        let device = devices
            .get(&step.target_device_id)
            .ok_or_else(|| format!("Device {} not found", step.target_device_id))?;

        match &step.action {
            StepAction::SetProperty { property_id, value } => {
                self.dispatch(device, property_id, value.clone()).await
            }
        }
    }

    async fn dispatch(&self, device: &Device, property_id: &PropertyId, value: PropertyValue) -> Result<(), String> {
        let platform = self
            .platforms
            .get(device)
            .ok_or_else(|| format!("No platform for device {}", device.id))?;
        let (channel, _) = device
            .find_property(property_id)
            .ok_or_else(|| format!("Property {property_id} not found on device {}", device.id))?;

        let command = PropertyCommand {
            device_id: device.id.clone(),
            channel_id: channel.id.clone(),
            property_id: property_id.clone(),
            value,
        };

        match tokio::time::timeout(self.config.step_timeout, platform.process_batch(vec![command])).await {
            Err(_) => Err(format!(
                "Step timed out after {}ms",
                self.config.step_timeout.as_millis()
            )),
            Ok(Err(err)) => Err(err.to_string()),
            Ok(Ok(false)) => Err("Command execution returned false".to_string()),
            Ok(Ok(true)) => Ok(()),
        }
    }

    async fn progress(
        &self,
        space_id: &SpaceId,
        activity_key: ActivityKey,
        step_index: usize,
        steps_total: usize,
        step: &ExecutionStep,
        status: StepStatus,
    ) {
        self.events
            .emit(MediaActivityEvent::StepProgress {
                space_id: space_id.clone(),
                activity_key,
                state: ActivationState::Activating,
                step_index,
                steps_total,
                status,
                label: step.label.clone(),
                timestamp_ms: self.clock.now_ms(),
            })
            .await;
    }
}
