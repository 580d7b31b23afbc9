use crate::db::schema::media_activity_binding;
use diesel::prelude::*;

#[derive(Debug, Queryable)]
#[diesel(table_name = media_activity_binding)]
pub struct BindingRow {
    pub id: String,
    pub space_id: String,
    pub activity_key: String,
    pub display_endpoint_id: Option<String>,
    pub audio_endpoint_id: Option<String>,
    pub source_endpoint_id: Option<String>,
    pub remote_endpoint_id: Option<String>,
    pub display_input_id: Option<String>,
    pub audio_input_id: Option<String>,
    pub source_input_id: Option<String>,
    pub audio_volume_preset: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = media_activity_binding)]
pub struct NewBindingRow {
    pub id: String,
    pub space_id: String,
    pub activity_key: String,
    pub display_endpoint_id: Option<String>,
    pub audio_endpoint_id: Option<String>,
    pub source_endpoint_id: Option<String>,
    pub remote_endpoint_id: Option<String>,
    pub display_input_id: Option<String>,
    pub audio_input_id: Option<String>,
    pub source_input_id: Option<String>,
    pub audio_volume_preset: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}
