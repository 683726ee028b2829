use super::schema;
use super::{SongplaySample, StarRow, StarStore, TableKind};
use crate::config::FactPolicy;
use crate::error::{AppResult, StoreError};
use crate::logging::{log, LogLevel};
use crate::model::star::{LookupKey, SongArtistKeys, UserRow};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const INSERT_SONG: &str =
    "INSERT INTO songs (song_id, title, artist_id, year, duration) VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_ARTIST: &str = "INSERT INTO artists (artist_id, name, location, latitude, longitude) \
     VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_TIME: &str = "INSERT INTO \"time\" (start_time, hour, day, week, month, year, weekday) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const INSERT_USER: &str = "INSERT INTO users (user_id, first_name, last_name, gender, level) \
     VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_SONGPLAY: &str = "INSERT INTO songplays \
     (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const UPDATE_USER: &str =
    "UPDATE users SET first_name = ?2, last_name = ?3, gender = ?4, level = ?5 WHERE user_id = ?1";
const SELECT_SONG_ARTIST: &str = "SELECT songs.song_id, artists.artist_id \
     FROM songs JOIN artists ON songs.artist_id = artists.artist_id \
     WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3 \
     ORDER BY songs.song_id LIMIT 1";
const SELECT_RESOLVED_SONGPLAYS: &str =
    "SELECT songplay_id, start_time, user_id, song_id, artist_id FROM songplays \
     WHERE song_id IS NOT NULL ORDER BY songplay_id LIMIT ?1";

/// SQLite-backed star schema. Autocommit: every statement stands alone.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P, fact_policy: FactPolicy) -> AppResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn, fact_policy)
    }

    pub fn in_memory(fact_policy: FactPolicy) -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, fact_policy)
    }

    fn from_connection(conn: Connection, fact_policy: FactPolicy) -> AppResult<Self> {
        schema::create_tables(&conn, fact_policy)?;
        Ok(SqliteStore { conn })
    }

    /// Drops and recreates every table.
    pub fn reset(&mut self, fact_policy: FactPolicy) -> AppResult<()> {
        log(LogLevel::Warning, "Dropping and recreating all tables.");
        schema::drop_tables(&self.conn)?;
        schema::create_tables(&self.conn, fact_policy)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StarStore for SqliteStore {
    fn insert(&mut self, row: StarRow<'_>) -> Result<(), StoreError> {
        let table = row.table();
        let result = match row {
            StarRow::Song(r) => self.conn.prepare_cached(INSERT_SONG).and_then(|mut stmt| {
                stmt.execute(params![r.song_id, r.title, r.artist_id, r.year, r.duration])
            }),
            StarRow::Artist(r) => self.conn.prepare_cached(INSERT_ARTIST).and_then(|mut stmt| {
                stmt.execute(params![r.artist_id, r.name, r.location, r.latitude, r.longitude])
            }),
            StarRow::Time(r) => self.conn.prepare_cached(INSERT_TIME).and_then(|mut stmt| {
                stmt.execute(params![
                    r.start_time,
                    r.hour,
                    r.day,
                    r.week,
                    r.month,
                    r.year,
                    r.weekday
                ])
            }),
            StarRow::User(r) => self.conn.prepare_cached(INSERT_USER).and_then(|mut stmt| {
                stmt.execute(params![r.user_id, r.first_name, r.last_name, r.gender, r.level])
            }),
            StarRow::Songplay(r) => {
                self.conn
                    .prepare_cached(INSERT_SONGPLAY)
                    .and_then(|mut stmt| {
                        stmt.execute(params![
                            r.start_time,
                            r.user_id,
                            r.level,
                            r.song_id(),
                            r.artist_id(),
                            r.session_id,
                            r.location,
                            r.user_agent
                        ])
                    })
            }
        };
        result
            .map(|_| ())
            .map_err(|e| StoreError::from_sqlite(table, e))
    }

    fn refresh_user(&mut self, row: &UserRow) -> Result<(), StoreError> {
        self.conn
            .prepare_cached(UPDATE_USER)
            .and_then(|mut stmt| {
                stmt.execute(params![
                    row.user_id,
                    row.first_name,
                    row.last_name,
                    row.gender,
                    row.level
                ])
            })
            .map(|_| ())
            .map_err(|e| StoreError::from_sqlite(TableKind::Users, e))
    }

    fn find_song_artist(
        &mut self,
        key: &LookupKey,
    ) -> Result<Option<SongArtistKeys>, StoreError> {
        let mut stmt = self.conn.prepare_cached(SELECT_SONG_ARTIST)?;
        let found = stmt
            .query_row(params![key.title, key.artist_name, key.duration], |row| {
                Ok(SongArtistKeys {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()?;
        Ok(found)
    }

    fn count_rows(&mut self, table: TableKind) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.table_name());
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    fn sample_resolved_songplays(
        &mut self,
        limit: usize,
    ) -> Result<Vec<SongplaySample>, StoreError> {
        let mut stmt = self.conn.prepare_cached(SELECT_RESOLVED_SONGPLAYS)?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(SongplaySample {
                songplay_id: row.get(0)?,
                start_time: row.get(1)?,
                user_id: row.get(2)?,
                song_id: row.get(3)?,
                artist_id: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
