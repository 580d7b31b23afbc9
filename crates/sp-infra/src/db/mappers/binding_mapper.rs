use anyhow::{anyhow, Result};

use sp_core::binding::{ActivityBinding, BindingSettings};
use sp_core::ids::{BindingId, EndpointId, SpaceId};
use sp_core::ActivityKey;

use crate::db::models::{BindingRow, NewBindingRow};
use crate::db::ports::{InsertMapper, RowMapper};

pub struct BindingRowMapper;

impl InsertMapper<ActivityBinding, NewBindingRow> for BindingRowMapper {
    fn to_row(&self, domain: &ActivityBinding) -> Result<NewBindingRow> {
        let endpoint = |id: &Option<EndpointId>| id.as_ref().map(|e| e.as_str().to_string());
        let settings = &domain.settings;

        Ok(NewBindingRow {
            id: domain.id.as_str().to_string(),
            space_id: domain.space_id.as_str().to_string(),
            activity_key: domain.activity_key.as_str().to_string(),
            display_endpoint_id: endpoint(&settings.display_endpoint_id),
            audio_endpoint_id: endpoint(&settings.audio_endpoint_id),
            source_endpoint_id: endpoint(&settings.source_endpoint_id),
            remote_endpoint_id: endpoint(&settings.remote_endpoint_id),
            display_input_id: settings.display_input_id.clone(),
            audio_input_id: settings.audio_input_id.clone(),
            source_input_id: settings.source_input_id.clone(),
            audio_volume_preset: settings.audio_volume_preset.map(i32::from),
            created_at: domain.created_at_ms,
            updated_at: domain.updated_at_ms,
        })
    }
}

impl RowMapper<BindingRow, ActivityBinding> for BindingRowMapper {
    fn to_domain(&self, row: &BindingRow) -> Result<ActivityBinding> {
        let endpoint = |id: &Option<String>| id.as_deref().map(EndpointId::from);
        let activity_key: ActivityKey = row
            .activity_key
            .parse()
            .map_err(|_| anyhow!("invalid activity_key: {}", row.activity_key))?;
        let audio_volume_preset = row
            .audio_volume_preset
            .map(u8::try_from)
            .transpose()
            .map_err(|_| anyhow!("invalid audio_volume_preset: {:?}", row.audio_volume_preset))?;

        Ok(ActivityBinding {
            id: BindingId::from(row.id.as_str()),
            space_id: SpaceId::from(row.space_id.as_str()),
            activity_key,
            settings: BindingSettings {
                display_endpoint_id: endpoint(&row.display_endpoint_id),
                audio_endpoint_id: endpoint(&row.audio_endpoint_id),
                source_endpoint_id: endpoint(&row.source_endpoint_id),
                remote_endpoint_id: endpoint(&row.remote_endpoint_id),
                display_input_id: row.display_input_id.clone(),
                audio_input_id: row.audio_input_id.clone(),
                source_input_id: row.source_input_id.clone(),
                audio_volume_preset,
            },
            created_at_ms: row.created_at,
            updated_at_ms: row.updated_at,
        })
    }
}
