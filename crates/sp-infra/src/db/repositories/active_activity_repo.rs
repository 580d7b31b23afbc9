use async_trait::async_trait;
use diesel::prelude::*;

use sp_core::activity::ActiveActivityRecord;
use sp_core::ids::SpaceId;
use sp_core::ports::{ActiveActivityRepositoryError, ActiveActivityRepositoryPort};

use crate::db::models::{ActiveActivityRow, NewActiveActivityRow};
use crate::db::ports::{DbExecutor, InsertMapper, RowMapper};
use crate::db::schema::active_media_activity::dsl::*;

/// One row per space; `save` upserts on `space_id`.
pub struct DieselActiveActivityRepository<E, M> {
    executor: E,
    mapper: M,
}

impl<E, M> DieselActiveActivityRepository<E, M> {
    pub fn new(executor: E, mapper: M) -> Self {
        Self { executor, mapper }
    }
}

#[async_trait]
impl<E, M> ActiveActivityRepositoryPort for DieselActiveActivityRepository<E, M>
where
    E: DbExecutor,
    M: InsertMapper<ActiveActivityRecord, NewActiveActivityRow>
        + RowMapper<ActiveActivityRow, ActiveActivityRecord>
        + Send
        + Sync,
{
    async fn find_by_space(
        &self,
        space: &SpaceId,
    ) -> Result<Option<ActiveActivityRecord>, ActiveActivityRepositoryError> {
        let space_str = space.as_str().to_string();
        self.executor
            .run(move |conn| {
                let row = active_media_activity
                    .filter(space_id.eq(&space_str))
                    .first::<ActiveActivityRow>(conn)
                    .optional()?;

                row.map(|r| self.mapper.to_domain(&r)).transpose()
            })
            .map_err(|e| ActiveActivityRepositoryError::Storage(e.to_string()))
    }

    async fn save(&self, record: &ActiveActivityRecord) -> Result<(), ActiveActivityRepositoryError> {
        let row = self
            .mapper
            .to_row(record)
            .map_err(|e| ActiveActivityRepositoryError::Storage(e.to_string()))?;

        self.executor
            .run(move |conn| {
                diesel::insert_into(active_media_activity)
                    .values(&row)
                    .on_conflict(space_id)
                    .do_update()
                    .set((
                        activity_key.eq(row.activity_key.clone()),
                        state.eq(row.state.clone()),
                        activated_at.eq(row.activated_at),
                        resolved_json.eq(row.resolved_json.clone()),
                        last_result_json.eq(row.last_result_json.clone()),
                        updated_at.eq(row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(|e| ActiveActivityRepositoryError::Storage(e.to_string()))?;
                Ok(())
            })
            .map_err(|e| ActiveActivityRepositoryError::Storage(e.to_string()))
    }
}
