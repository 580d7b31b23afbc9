use async_trait::async_trait;

use crate::activity::ActiveActivityRecord;
use crate::ids::SpaceId;
use crate::ports::errors::ActiveActivityRepositoryError;

#[async_trait]
pub trait ActiveActivityRepositoryPort: Send + Sync {
    async fn find_by_space(
        &self,
        space_id: &SpaceId,
    ) -> Result<Option<ActiveActivityRecord>, ActiveActivityRepositoryError>;

    /// Insert or overwrite the single row of the record's space.
    async fn save(&self, record: &ActiveActivityRecord) -> Result<(), ActiveActivityRepositoryError>;
}
