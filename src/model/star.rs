use super::common::{SessionId, UserId};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TimeRow {
    pub start_time: String,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub user_id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

/// Song and artist keys of a resolved play. Both or neither are known.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SongArtistKeys {
    pub song_id: String,
    pub artist_id: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongplayRow {
    pub start_time: String,
    pub user_id: UserId,
    pub level: Option<String>,
    pub keys: Option<SongArtistKeys>,
    pub session_id: SessionId,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongplayRow {
    pub fn song_id(&self) -> Option<&str> {
        self.keys.as_ref().map(|k| k.song_id.as_str())
    }

    pub fn artist_id(&self) -> Option<&str> {
        self.keys.as_ref().map(|k| k.artist_id.as_str())
    }
}

/// Natural key a play is matched on: song title, artist name and track length.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupKey {
    pub title: String,
    pub artist_name: String,
    pub duration: f64,
}
