use crate::model::common::{
    deserialize_flexible_i64, deserialize_optional_f64, deserialize_optional_flexible_i64,
    deserialize_optional_string, EpochMillis, SessionId, UserId,
};
use serde::Deserialize;

/// One song metadata file: a single flat JSON object.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SongRecord {
    #[serde(default, deserialize_with = "deserialize_optional_flexible_i64")]
    pub num_songs: Option<i64>,
    pub artist_id: String,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub artist_latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub artist_longitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub artist_location: Option<String>,
    pub artist_name: String,
    pub song_id: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_optional_f64")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_i64")]
    pub year: Option<i64>,
}

/// One line of an activity log file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub auth: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_i64")]
    pub item_in_session: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub method: Option<String>,
    pub page: String,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub registration: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_i64")]
    pub session_id: Option<SessionId>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub song: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_i64")]
    pub status: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub ts: EpochMillis,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_i64")]
    pub user_id: Option<UserId>,
}

impl LogEvent {
    pub fn is_page(&self, page: &str) -> bool {
        self.page == page
    }
}
