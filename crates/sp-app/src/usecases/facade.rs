use std::sync::Arc;

use async_trait::async_trait;

use sp_core::activity::{ActivationResult, ActiveActivityRecord};
use sp_core::binding::{
    ActivityBinding, BindingSettingsPatch, BindingValidationReport, NewActivityBinding,
};
use sp_core::capability::CapabilitySummary;
use sp_core::endpoint::DerivedEndpoint;
use sp_core::ids::{BindingId, SpaceId};
use sp_core::ActivityKey;

use crate::deps::MediaActivityDeps;
use crate::errors::MediaActivityError;
use crate::usecases::activity::{ActivationPreview, MediaActivityOrchestrator, PlanExecutor};
use crate::usecases::bindings::ActivityBindingService;
use crate::usecases::{DeriveMediaEndpoints, ScanMediaCapabilities};

/// Operations the media engine exposes to its hosts (CLI, panel backend).
#[async_trait]
pub trait MediaActivityFacade: Send + Sync {
    async fn get_capabilities(&self, space_id: &SpaceId) -> Result<Vec<CapabilitySummary>, MediaActivityError>;
    async fn derive_endpoints(&self, space_id: &SpaceId) -> Result<Vec<DerivedEndpoint>, MediaActivityError>;

    async fn list_bindings(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, MediaActivityError>;
    async fn get_binding(
        &self,
        space_id: &SpaceId,
        binding_id: &BindingId,
    ) -> Result<ActivityBinding, MediaActivityError>;
    async fn create_binding(
        &self,
        space_id: &SpaceId,
        request: NewActivityBinding,
    ) -> Result<ActivityBinding, MediaActivityError>;
    async fn update_binding(
        &self,
        space_id: &SpaceId,
        binding_id: &BindingId,
        patch: BindingSettingsPatch,
    ) -> Result<ActivityBinding, MediaActivityError>;
    async fn delete_binding(&self, space_id: &SpaceId, binding_id: &BindingId) -> Result<(), MediaActivityError>;
    async fn apply_defaults(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, MediaActivityError>;
    async fn validate_bindings(&self, space_id: &SpaceId)
        -> Result<Vec<BindingValidationReport>, MediaActivityError>;

    async fn get_active(&self, space_id: &SpaceId) -> Result<Option<ActiveActivityRecord>, MediaActivityError>;
    async fn activate(&self, space_id: &SpaceId, key: ActivityKey) -> Result<ActivationResult, MediaActivityError>;
    async fn deactivate(&self, space_id: &SpaceId) -> Result<ActivationResult, MediaActivityError>;
    async fn preview(&self, space_id: &SpaceId, key: ActivityKey) -> Result<ActivationPreview, MediaActivityError>;
}

/// Default facade: wires the use cases over one set of ports.
pub struct MediaActivityService {
    scanner: Arc<ScanMediaCapabilities>,
    endpoints: Arc<DeriveMediaEndpoints>,
    bindings: Arc<ActivityBindingService>,
    orchestrator: MediaActivityOrchestrator,
}

impl MediaActivityService {
    /// Build every use case from the dependency manifest.
    /// 从依赖清单构建所有用例。
    pub fn from_deps(deps: MediaActivityDeps) -> Self {
        let scanner = Arc::new(ScanMediaCapabilities::new(deps.device_graph.clone()));
        let endpoints = Arc::new(DeriveMediaEndpoints::new(scanner.clone()));
        let bindings = Arc::new(ActivityBindingService::new(
            endpoints.clone(),
            deps.binding_repo,
            deps.clock.clone(),
        ));
        let executor = Arc::new(PlanExecutor::new(
            deps.device_graph,
            deps.platforms,
            deps.events.clone(),
            deps.clock.clone(),
            deps.execution,
        ));
        let orchestrator = MediaActivityOrchestrator::new(
            endpoints.clone(),
            bindings.clone(),
            deps.activity_repo,
            executor,
            deps.events,
            deps.clock,
        );

        Self {
            scanner,
            endpoints,
            bindings,
            orchestrator,
        }
    }
}

#[async_trait]
impl MediaActivityFacade for MediaActivityService {
    async fn get_capabilities(&self, space_id: &SpaceId) -> Result<Vec<CapabilitySummary>, MediaActivityError> {
        self.scanner.execute(space_id).await
    }

    async fn derive_endpoints(&self, space_id: &SpaceId) -> Result<Vec<DerivedEndpoint>, MediaActivityError> {
        self.endpoints.execute(space_id).await
    }

    async fn list_bindings(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, MediaActivityError> {
        self.bindings.list(space_id).await
    }

    async fn get_binding(
        &self,
        space_id: &SpaceId,
        binding_id: &BindingId,
    ) -> Result<ActivityBinding, MediaActivityError> {
        self.bindings.get(space_id, binding_id).await
    }

    async fn create_binding(
        &self,
        space_id: &SpaceId,
        request: NewActivityBinding,
    ) -> Result<ActivityBinding, MediaActivityError> {
        self.bindings.create(space_id, request).await
    }

    async fn update_binding(
        &self,
        space_id: &SpaceId,
        binding_id: &BindingId,
        patch: BindingSettingsPatch,
    ) -> Result<ActivityBinding, MediaActivityError> {
        self.bindings.update(space_id, binding_id, patch).await
    }

    async fn delete_binding(&self, space_id: &SpaceId, binding_id: &BindingId) -> Result<(), MediaActivityError> {
        self.bindings.delete(space_id, binding_id).await
    }

    async fn apply_defaults(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, MediaActivityError> {
        self.bindings.apply_defaults(space_id).await
    }

    async fn validate_bindings(
        &self,
        space_id: &SpaceId,
    ) -> Result<Vec<BindingValidationReport>, MediaActivityError> {
        self.bindings.validate(space_id).await
    }

    async fn get_active(&self, space_id: &SpaceId) -> Result<Option<ActiveActivityRecord>, MediaActivityError> {
        self.orchestrator.get_active(space_id).await
    }

    async fn activate(&self, space_id: &SpaceId, key: ActivityKey) -> Result<ActivationResult, MediaActivityError> {
        self.orchestrator.activate(space_id, key).await
    }

    async fn deactivate(&self, space_id: &SpaceId) -> Result<ActivationResult, MediaActivityError> {
        self.orchestrator.deactivate(space_id).await
    }

    async fn preview(&self, space_id: &SpaceId, key: ActivityKey) -> Result<ActivationPreview, MediaActivityError> {
        self.orchestrator.preview(space_id, key).await
    }
}
