//! # sp-core
//!
//! Core domain models and rules of the smart panel media activity engine.
//!
//! This crate is pure: capability detection, endpoint projection, binding
//! rules and plan construction are plain functions over the device graph.
//! Everything with side effects sits behind the traits in [`ports`].

pub mod activity;
mod activity_key;
pub mod binding;
pub mod capability;
pub mod config;
pub mod device;
pub mod endpoint;
pub mod events;
pub mod ids;
pub mod plan;
pub mod ports;

pub use activity::{
    ActivationResult, ActivationState, ActivationSummary, ActiveActivityRecord, ControlTargets,
    ResolvedDevices, StepFailure,
};
pub use activity_key::ActivityKey;
pub use binding::{ActivityBinding, BindingSettings, BindingSettingsPatch, NewActivityBinding};
pub use capability::{CapabilitySummary, MediaCapability};
pub use config::MediaConfig;
pub use device::{Device, DeviceCategory, PropertyValue};
pub use endpoint::{DerivedEndpoint, EndpointMap, EndpointType};
pub use events::{MediaActivityEvent, StepStatus};
pub use ids::{ActiveActivityId, BindingId, ChannelId, DeviceId, EndpointId, PropertyId, SpaceId};
pub use plan::{build_execution_plan, ExecutionPlan, PlannedActivation};
