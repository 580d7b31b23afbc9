use async_trait::async_trait;

use crate::binding::ActivityBinding;
use crate::ids::{BindingId, SpaceId};
use crate::ports::errors::BindingRepositoryError;
use crate::ActivityKey;

#[async_trait]
pub trait ActivityBindingRepositoryPort: Send + Sync {
    /// All bindings of a space, ordered by activity key.
    async fn list_by_space(&self, space_id: &SpaceId) -> Result<Vec<ActivityBinding>, BindingRepositoryError>;

    async fn find_by_id(&self, id: &BindingId) -> Result<Option<ActivityBinding>, BindingRepositoryError>;

    async fn find_by_space_and_key(
        &self,
        space_id: &SpaceId,
        key: ActivityKey,
    ) -> Result<Option<ActivityBinding>, BindingRepositoryError>;

    /// Fails with `Conflict` when the space already has a binding for the key.
    async fn insert(&self, binding: &ActivityBinding) -> Result<(), BindingRepositoryError>;

    async fn update(&self, binding: &ActivityBinding) -> Result<(), BindingRepositoryError>;

    async fn delete(&self, id: &BindingId) -> Result<(), BindingRepositoryError>;
}
