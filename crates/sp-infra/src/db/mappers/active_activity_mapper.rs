use anyhow::{anyhow, Context, Result};

use sp_core::activity::{ActivationState, ActiveActivityRecord};
use sp_core::ids::{ActiveActivityId, SpaceId};
use sp_core::ActivityKey;

use crate::db::models::{ActiveActivityRow, NewActiveActivityRow};
use crate::db::ports::{InsertMapper, RowMapper};

/// Snapshots and summaries are stored as JSON text columns.
pub struct ActiveActivityRowMapper;

impl InsertMapper<ActiveActivityRecord, NewActiveActivityRow> for ActiveActivityRowMapper {
    fn to_row(&self, domain: &ActiveActivityRecord) -> Result<NewActiveActivityRow> {
        let resolved_json = domain
            .resolved
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("serialize resolved devices")?;
        let last_result_json = domain
            .last_result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("serialize activation summary")?;

        Ok(NewActiveActivityRow {
            id: domain.id.as_str().to_string(),
            space_id: domain.space_id.as_str().to_string(),
            activity_key: domain.activity_key.map(|k| k.as_str().to_string()),
            state: domain.state.as_str().to_string(),
            activated_at: domain.activated_at_ms,
            resolved_json,
            last_result_json,
            updated_at: domain.updated_at_ms,
        })
    }
}

impl RowMapper<ActiveActivityRow, ActiveActivityRecord> for ActiveActivityRowMapper {
    fn to_domain(&self, row: &ActiveActivityRow) -> Result<ActiveActivityRecord> {
        let activity_key = row
            .activity_key
            .as_deref()
            .map(|k| k.parse::<ActivityKey>().map_err(|_| anyhow!("invalid activity_key: {k}")))
            .transpose()?;
        let state = ActivationState::parse(&row.state).ok_or_else(|| anyhow!("invalid state: {}", row.state))?;
        let resolved = row
            .resolved_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("parse resolved_json")?;
        let last_result = row
            .last_result_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("parse last_result_json")?;

        Ok(ActiveActivityRecord {
            id: ActiveActivityId::from(row.id.as_str()),
            space_id: SpaceId::from(row.space_id.as_str()),
            activity_key,
            state,
            activated_at_ms: row.activated_at,
            resolved,
            last_result,
            updated_at_ms: row.updated_at,
        })
    }
}
