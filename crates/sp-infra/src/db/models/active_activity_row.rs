use crate::db::schema::active_media_activity;
use diesel::prelude::*;

#[derive(Debug, Queryable)]
#[diesel(table_name = active_media_activity)]
pub struct ActiveActivityRow {
    pub id: String,
    pub space_id: String,
    pub activity_key: Option<String>,
    pub state: String,
    pub activated_at: Option<i64>,
    pub resolved_json: Option<String>,
    pub last_result_json: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = active_media_activity)]
pub struct NewActiveActivityRow {
    pub id: String,
    pub space_id: String,
    pub activity_key: Option<String>,
    pub state: String,
    pub activated_at: Option<i64>,
    pub resolved_json: Option<String>,
    pub last_result_json: Option<String>,
    pub updated_at: i64,
}
