pub mod loader;
pub mod schema;
pub mod sqlite;

use crate::error::StoreError;
use crate::model::star::{
    ArtistRow, LookupKey, SongArtistKeys, SongRow, SongplayRow, TimeRow, UserRow,
};
use std::fmt;

pub use loader::{LoadEngine, LoadOutcome};
pub use sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Songs,
    Artists,
    Time,
    Users,
    Songplays,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::Songs,
        TableKind::Artists,
        TableKind::Time,
        TableKind::Users,
        TableKind::Songplays,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            TableKind::Songs => "songs",
            TableKind::Artists => "artists",
            TableKind::Time => "time",
            TableKind::Users => "users",
            TableKind::Songplays => "songplays",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A borrowed row headed for one of the five tables.
#[derive(Debug, Clone, Copy)]
pub enum StarRow<'a> {
    Song(&'a SongRow),
    Artist(&'a ArtistRow),
    Time(&'a TimeRow),
    User(&'a UserRow),
    Songplay(&'a SongplayRow),
}

impl StarRow<'_> {
    pub fn table(&self) -> TableKind {
        match self {
            StarRow::Song(_) => TableKind::Songs,
            StarRow::Artist(_) => TableKind::Artists,
            StarRow::Time(_) => TableKind::Time,
            StarRow::User(_) => TableKind::Users,
            StarRow::Songplay(_) => TableKind::Songplays,
        }
    }

    /// Short human-readable identity used in log lines.
    pub fn describe(&self) -> String {
        match self {
            StarRow::Song(r) => format!("song {} '{}'", r.song_id, r.title),
            StarRow::Artist(r) => format!("artist {} '{}'", r.artist_id, r.name),
            StarRow::Time(r) => format!("time {}", r.start_time),
            StarRow::User(r) => format!("user {}", r.user_id),
            StarRow::Songplay(r) => format!(
                "songplay {} user {} session {}",
                r.start_time, r.user_id, r.session_id
            ),
        }
    }
}

/// One resolved play as read back by the verification report.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplaySample {
    pub songplay_id: i64,
    pub start_time: String,
    pub user_id: i64,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
}

/// Target store of the star schema. Every call is one round-trip.
pub trait StarStore {
    fn insert(&mut self, row: StarRow<'_>) -> Result<(), StoreError>;

    /// Overwrites the descriptive attributes of an existing user.
    fn refresh_user(&mut self, row: &UserRow) -> Result<(), StoreError>;

    fn find_song_artist(&mut self, key: &LookupKey)
        -> Result<Option<SongArtistKeys>, StoreError>;

    fn count_rows(&mut self, table: TableKind) -> Result<i64, StoreError>;

    fn sample_resolved_songplays(&mut self, limit: usize)
        -> Result<Vec<SongplaySample>, StoreError>;
}
