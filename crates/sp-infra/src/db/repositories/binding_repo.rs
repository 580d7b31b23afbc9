use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use sp_core::binding::ActivityBinding;
use sp_core::ids::{BindingId, SpaceId};
use sp_core::ports::{ActivityBindingRepositoryPort, BindingRepositoryError};
use sp_core::ActivityKey;

use crate::db::models::{BindingRow, NewBindingRow};
use crate::db::ports::{DbExecutor, InsertMapper, RowMapper};
use crate::db::schema::media_activity_binding::dsl::*;

pub struct DieselActivityBindingRepository<E, M> {
    executor: E,
    mapper: M,
}

impl<E, M> DieselActivityBindingRepository<E, M> {
    pub fn new(executor: E, mapper: M) -> Self {
        Self { executor, mapper }
    }
}

fn storage(e: impl std::fmt::Display) -> BindingRepositoryError {
    BindingRepositoryError::Storage(e.to_string())
}

#[async_trait]
impl<E, M> ActivityBindingRepositoryPort for DieselActivityBindingRepository<E, M>
where
    E: DbExecutor,
    M: InsertMapper<ActivityBinding, NewBindingRow> + RowMapper<BindingRow, ActivityBinding> + Send + Sync,
{
    async fn list_by_space(&self, space: &SpaceId) -> Result<Vec<ActivityBinding>, BindingRepositoryError> {
        let space_str = space.as_str().to_string();
        self.executor
            .run(move |conn| {
                let rows = media_activity_binding
                    .filter(space_id.eq(&space_str))
                    .order(activity_key.asc())
                    .load::<BindingRow>(conn)
                    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

                let mut bindings = Vec::with_capacity(rows.len());
                for row in rows {
                    let binding = self
                        .mapper
                        .to_domain(&row)
                        .map_err(|e| anyhow::anyhow!("Failed to map binding {}: {}", row.id, e))?;
                    bindings.push(binding);
                }
                Ok(bindings)
            })
            .map_err(storage)
    }

    async fn find_by_id(&self, binding_id: &BindingId) -> Result<Option<ActivityBinding>, BindingRepositoryError> {
        let id_str = binding_id.as_str().to_string();
        self.executor
            .run(move |conn| {
                let row = media_activity_binding
                    .filter(id.eq(&id_str))
                    .first::<BindingRow>(conn)
                    .optional()?;

                row.map(|r| self.mapper.to_domain(&r)).transpose()
            })
            .map_err(storage)
    }

    async fn find_by_space_and_key(
        &self,
        space: &SpaceId,
        key: ActivityKey,
    ) -> Result<Option<ActivityBinding>, BindingRepositoryError> {
        let space_str = space.as_str().to_string();
        self.executor
            .run(move |conn| {
                let row = media_activity_binding
                    .filter(space_id.eq(&space_str))
                    .filter(activity_key.eq(key.as_str()))
                    .first::<BindingRow>(conn)
                    .optional()?;

                row.map(|r| self.mapper.to_domain(&r)).transpose()
            })
            .map_err(storage)
    }

    async fn insert(&self, binding: &ActivityBinding) -> Result<(), BindingRepositoryError> {
        let row = self.mapper.to_row(binding).map_err(storage)?;

        let result = self.executor.run(move |conn| {
            diesel::insert_into(media_activity_binding)
                .values(&row)
                .execute(conn)
                .map_err(anyhow::Error::from)
        });

        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.downcast_ref::<DieselError>() {
                Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Err(BindingRepositoryError::Conflict)
                }
                _ => Err(storage(e)),
            },
        }
    }

    async fn update(&self, binding: &ActivityBinding) -> Result<(), BindingRepositoryError> {
        let row = self.mapper.to_row(binding).map_err(storage)?;

        let affected = self
            .executor
            .run(move |conn| {
                diesel::update(media_activity_binding.filter(id.eq(&row.id)))
                    .set((
                        display_endpoint_id.eq(row.display_endpoint_id.clone()),
                        audio_endpoint_id.eq(row.audio_endpoint_id.clone()),
                        source_endpoint_id.eq(row.source_endpoint_id.clone()),
                        remote_endpoint_id.eq(row.remote_endpoint_id.clone()),
                        display_input_id.eq(row.display_input_id.clone()),
                        audio_input_id.eq(row.audio_input_id.clone()),
                        source_input_id.eq(row.source_input_id.clone()),
                        audio_volume_preset.eq(row.audio_volume_preset),
                        updated_at.eq(row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(|e| anyhow::anyhow!(e.to_string()))
            })
            .map_err(storage)?;

        if affected == 0 {
            return Err(BindingRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, binding_id: &BindingId) -> Result<(), BindingRepositoryError> {
        let id_str = binding_id.as_str().to_string();
        let affected = self
            .executor
            .run(move |conn| {
                diesel::delete(media_activity_binding.filter(id.eq(&id_str)))
                    .execute(conn)
                    .map_err(|e| anyhow::anyhow!(e.to_string()))
            })
            .map_err(storage)?;

        if affected == 0 {
            return Err(BindingRepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::executor::DieselSqliteExecutor;
    use crate::db::mappers::BindingRowMapper;
    use crate::db::pool::init_db_pool;
    use sp_core::binding::BindingSettings;
    use sp_core::ids::EndpointId;
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> DieselActivityBindingRepository<DieselSqliteExecutor, BindingRowMapper> {
        let db_path = dir.path().join("media.db");
        let pool = init_db_pool(db_path.to_str().unwrap()).expect("Failed to init db");
        DieselActivityBindingRepository::new(DieselSqliteExecutor::new(pool), BindingRowMapper)
    }

    fn binding(key: ActivityKey) -> ActivityBinding {
        ActivityBinding {
            id: BindingId::new(),
            space_id: SpaceId::from("living"),
            activity_key: key,
            settings: BindingSettings {
                audio_endpoint_id: Some(EndpointId::from("living:audio_output:avr")),
                audio_volume_preset: Some(20),
                ..Default::default()
            },
            created_at_ms: 1,
            updated_at_ms: 1,
        }
    }

    #[tokio::test]
    async fn bindings_survive_a_new_pool() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let listen = binding(ActivityKey::Listen);
        let background = binding(ActivityKey::Background);
        {
            let repo = repo(&dir);
            repo.insert(&listen).await.unwrap();
            repo.insert(&background).await.unwrap();
        }

        let fresh = repo(&dir);
        let loaded = fresh.list_by_space(&SpaceId::from("living")).await.unwrap();
        assert_eq!(loaded, vec![background, listen.clone()]);

        let by_key = fresh
            .find_by_space_and_key(&SpaceId::from("living"), ActivityKey::Listen)
            .await
            .unwrap();
        assert_eq!(by_key, Some(listen));
    }

    #[tokio::test]
    async fn duplicate_key_is_a_conflict() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo(&dir);
        repo.insert(&binding(ActivityKey::Watch)).await.unwrap();

        let err = repo.insert(&binding(ActivityKey::Watch)).await.unwrap_err();
        assert!(matches!(err, BindingRepositoryError::Conflict));
    }

    #[tokio::test]
    async fn update_clears_columns_and_delete_removes_row() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo(&dir);
        let mut watch = binding(ActivityKey::Watch);
        repo.insert(&watch).await.unwrap();

        watch.settings.audio_volume_preset = None;
        watch.updated_at_ms = 5;
        repo.update(&watch).await.unwrap();
        let loaded = repo.find_by_id(&watch.id).await.unwrap().unwrap();
        assert_eq!(loaded.settings.audio_volume_preset, None);
        assert_eq!(loaded.updated_at_ms, 5);

        repo.delete(&watch.id).await.unwrap();
        assert!(repo.find_by_id(&watch.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(&watch.id).await, Err(BindingRepositoryError::NotFound)));
    }
}
