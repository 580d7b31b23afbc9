use std::sync::Arc;

use tracing::{debug, info, warn};

use sp_core::binding::{
    inspect_binding, missing_binding_report, validate_settings, ActivityBinding, BindingSettings,
    BindingSettingsPatch, BindingValidationError, BindingValidationReport, NewActivityBinding,
};
use sp_core::ids::{BindingId, SpaceId};
use sp_core::ports::{ActivityBindingRepositoryPort, BindingRepositoryError, ClockPort};
use sp_core::ActivityKey;

use crate::errors::MediaActivityError;
use crate::usecases::bindings::propose_default;
use crate::usecases::DeriveMediaEndpoints;

/// Binding store: CRUD, heuristic defaults and validation of activity bindings.
pub struct ActivityBindingService {
    endpoints: Arc<DeriveMediaEndpoints>,
    repo: Arc<dyn ActivityBindingRepositoryPort>,
    clock: Arc<dyn ClockPort>,
}

impl ActivityBindingService {
    pub fn new(
        endpoints: Arc<DeriveMediaEndpoints>,
        repo: Arc<dyn ActivityBindingRepositoryPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            endpoints,
            repo,
            clock,
        }
    }

    pub async fn list(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, MediaActivityError> {
        self.endpoints.ensure_space(space_id).await?;
        Ok(self.repo.list_by_space(space_id).await?)
    }

    /// Binding of one key, without the space existence check.
    pub async fn find_for_key(
        &self,
        space_id: &SpaceId,
        key: ActivityKey,
    ) -> Result<Option<ActivityBinding>, MediaActivityError> {
        Ok(self.repo.find_by_space_and_key(space_id, key).await?)
    }

    pub async fn get(
        &self,
        space_id: &SpaceId,
        binding_id: &BindingId,
    ) -> Result<ActivityBinding, MediaActivityError> {
        self.endpoints.ensure_space(space_id).await?;
        self.load_in_space(space_id, binding_id).await
    }

    #[tracing::instrument(
        name = "usecase.activity_binding.create",
        skip(self, request),
        fields(space_id = %space_id, activity_key = %request.activity_key)
    )]
    pub async fn create(
        &self,
        space_id: &SpaceId,
        request: NewActivityBinding,
    ) -> Result<ActivityBinding, MediaActivityError> {
        let endpoints = self.endpoints.endpoint_map(space_id).await?;
        let settings = request.settings.normalized();
        validate_settings(&settings, &endpoints)?;

        let binding = self.insert(space_id, request.activity_key, settings).await?;
        info!(binding_id = %binding.id, "Created activity binding");
        Ok(binding)
    }

    #[tracing::instrument(
        name = "usecase.activity_binding.update",
        skip(self, patch),
        fields(space_id = %space_id, binding_id = %binding_id)
    )]
    pub async fn update(
        &self,
        space_id: &SpaceId,
        binding_id: &BindingId,
        patch: BindingSettingsPatch,
    ) -> Result<ActivityBinding, MediaActivityError> {
        let endpoints = self.endpoints.endpoint_map(space_id).await?;
        let mut binding = self.load_in_space(space_id, binding_id).await?;

        let settings = binding.settings.apply(&patch);
        validate_settings(&settings, &endpoints)?;

        binding.settings = settings;
        binding.updated_at_ms = self.clock.now_ms();
        self.repo.update(&binding).await.map_err(|e| match e {
            BindingRepositoryError::NotFound => MediaActivityError::BindingNotFound(binding_id.clone()),
            other => other.into(),
        })?;

        info!("Updated activity binding");
        Ok(binding)
    }

    #[tracing::instrument(
        name = "usecase.activity_binding.delete",
        skip(self),
        fields(space_id = %space_id, binding_id = %binding_id)
    )]
    pub async fn delete(&self, space_id: &SpaceId, binding_id: &BindingId) -> Result<(), MediaActivityError> {
        self.endpoints.ensure_space(space_id).await?;
        self.load_in_space(space_id, binding_id).await?;

        self.repo.delete(binding_id).await.map_err(|e| match e {
            BindingRepositoryError::NotFound => MediaActivityError::BindingNotFound(binding_id.clone()),
            other => other.into(),
        })?;

        info!("Deleted activity binding");
        Ok(())
    }

    /// Create heuristic bindings for configurable keys that have none yet.
    ///
    /// Existing bindings are never touched. A key whose default cannot be
    /// stored is logged and skipped.
    #[tracing::instrument(
        name = "usecase.activity_binding.apply_defaults",
        skip(self),
        fields(space_id = %space_id)
    )]
    pub async fn apply_defaults(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, MediaActivityError> {
        let endpoints = self.endpoints.endpoint_map(space_id).await?;
        let existing = self.repo.list_by_space(space_id).await?;

        for key in ActivityKey::CONFIGURABLE {
            if existing.iter().any(|b| b.activity_key == key) {
                debug!(activity_key = %key, "Binding exists, keeping it");
                continue;
            }

            let settings = propose_default(key, &endpoints);
            match self.insert(space_id, key, settings).await {
                Ok(binding) => info!(
                    activity_key = %key,
                    binding_id = %binding.id,
                    "Created default activity binding"
                ),
                Err(err) => warn!(
                    activity_key = %key,
                    error = %err,
                    "Failed to create default activity binding, continuing"
                ),
            }
        }

        Ok(self.repo.list_by_space(space_id).await?)
    }

    /// Re-check every binding of a space against its current endpoints.
    #[tracing::instrument(
        name = "usecase.activity_binding.validate",
        skip(self),
        fields(space_id = %space_id)
    )]
    pub async fn validate(&self, space_id: &SpaceId) -> Result<Vec<BindingValidationReport>, MediaActivityError> {
        let endpoints = self.endpoints.endpoint_map(space_id).await?;
        let bindings = self.repo.list_by_space(space_id).await?;

        let mut reports: Vec<BindingValidationReport> = bindings
            .iter()
            .map(|binding| inspect_binding(binding, &endpoints))
            .collect();

        for key in ActivityKey::CONFIGURABLE {
            if !bindings.iter().any(|b| b.activity_key == key) {
                reports.push(missing_binding_report(key));
            }
        }

        let invalid = reports.iter().filter(|r| !r.valid).count();
        if invalid > 0 {
            warn!(invalid, "Found invalid activity bindings");
        }
        Ok(reports)
    }

    async fn insert(
        &self,
        space_id: &SpaceId,
        key: ActivityKey,
        settings: BindingSettings,
    ) -> Result<ActivityBinding, MediaActivityError> {
        let duplicate = || BindingValidationError::DuplicateBinding {
            key,
            space_id: space_id.clone(),
        };

        if self.repo.find_by_space_and_key(space_id, key).await?.is_some() {
            return Err(duplicate().into());
        }

        let now = self.clock.now_ms();
        let binding = ActivityBinding {
            id: BindingId::new(),
            space_id: space_id.clone(),
            activity_key: key,
            settings,
            created_at_ms: now,
            updated_at_ms: now,
        };

        match self.repo.insert(&binding).await {
            Ok(()) => Ok(binding),
            Err(BindingRepositoryError::Conflict) => Err(duplicate().into()),
            Err(other) => Err(other.into()),
        }
    }

    async fn load_in_space(
        &self,
        space_id: &SpaceId,
        binding_id: &BindingId,
    ) -> Result<ActivityBinding, MediaActivityError> {
        let binding = self
            .repo
            .find_by_id(binding_id)
            .await?
            .ok_or_else(|| MediaActivityError::BindingNotFound(binding_id.clone()))?;

        if &binding.space_id != space_id {
            return Err(BindingValidationError::BindingNotInSpace {
                binding_id: binding_id.clone(),
                space_id: space_id.clone(),
            }
            .into());
        }
        Ok(binding)
    }
}
