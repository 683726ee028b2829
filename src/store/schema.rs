//! DDL for the five star-schema tables.
//!
//! Dimension keys are primary keys so the store rejects repeats. The
//! `songplays` table carries no uniqueness unless the dedupe fact policy
//! installs the natural-key index.

use super::TableKind;
use crate::config::FactPolicy;
use rusqlite::Connection;

pub struct TableDef {
    pub kind: TableKind,
    pub create_sql: &'static str,
}

pub const TABLES: &[TableDef] = &[
    TableDef {
        kind: TableKind::Songplays,
        create_sql: "CREATE TABLE IF NOT EXISTS songplays (
            songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_time TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            level TEXT,
            song_id TEXT,
            artist_id TEXT,
            session_id INTEGER NOT NULL,
            location TEXT,
            user_agent TEXT,
            CHECK ((song_id IS NULL) = (artist_id IS NULL))
        )",
    },
    TableDef {
        kind: TableKind::Users,
        create_sql: "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            first_name TEXT,
            last_name TEXT,
            gender TEXT,
            level TEXT
        )",
    },
    TableDef {
        kind: TableKind::Songs,
        create_sql: "CREATE TABLE IF NOT EXISTS songs (
            song_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            artist_id TEXT NOT NULL,
            year INTEGER,
            duration REAL NOT NULL
        )",
    },
    TableDef {
        kind: TableKind::Artists,
        create_sql: "CREATE TABLE IF NOT EXISTS artists (
            artist_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT,
            latitude REAL,
            longitude REAL
        )",
    },
    TableDef {
        kind: TableKind::Time,
        create_sql: "CREATE TABLE IF NOT EXISTS \"time\" (
            start_time TEXT PRIMARY KEY,
            hour INTEGER NOT NULL,
            day INTEGER NOT NULL,
            week INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            weekday TEXT NOT NULL
        )",
    },
];

const LOOKUP_INDICES: &str = "
    CREATE INDEX IF NOT EXISTS idx_songs_title_duration ON songs (title, duration);
    CREATE INDEX IF NOT EXISTS idx_artists_name ON artists (name);
";

const SONGPLAY_NATURAL_KEY_INDEX: &str = "idx_songplays_natural_key";

pub fn create_tables(conn: &Connection, fact_policy: FactPolicy) -> rusqlite::Result<()> {
    for table in TABLES {
        conn.execute(table.create_sql, [])?;
    }
    conn.execute_batch(LOOKUP_INDICES)?;
    apply_fact_policy(conn, fact_policy)
}

/// Installs or removes the songplays natural-key index.
///
/// Switching an existing database to dedupe fails here if it already holds
/// repeated plays.
pub fn apply_fact_policy(conn: &Connection, fact_policy: FactPolicy) -> rusqlite::Result<()> {
    let sql = match fact_policy {
        FactPolicy::Append => format!("DROP INDEX IF EXISTS {}", SONGPLAY_NATURAL_KEY_INDEX),
        FactPolicy::Dedupe => format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON songplays (start_time, user_id, session_id)",
            SONGPLAY_NATURAL_KEY_INDEX
        ),
    };
    conn.execute(&sql, [])?;
    Ok(())
}

pub fn drop_tables(conn: &Connection) -> rusqlite::Result<()> {
    for table in TABLES {
        conn.execute(
            &format!("DROP TABLE IF EXISTS \"{}\"", table.kind.table_name()),
            [],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('songs','artists','time','users','songplays')",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn creates_and_drops_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, FactPolicy::Append).unwrap();
        assert_eq!(table_count(&conn), 5);

        // idempotent
        create_tables(&conn, FactPolicy::Append).unwrap();

        drop_tables(&conn).unwrap();
        assert_eq!(table_count(&conn), 0);
    }

    #[test]
    fn fact_policy_toggles_natural_key_index() {
        let conn = Connection::open_in_memory().unwrap();
        let index_count = |conn: &Connection| -> i64 {
            conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name = ?1",
                [SONGPLAY_NATURAL_KEY_INDEX],
                |row| row.get(0),
            )
            .unwrap()
        };

        create_tables(&conn, FactPolicy::Dedupe).unwrap();
        assert_eq!(index_count(&conn), 1);

        apply_fact_policy(&conn, FactPolicy::Append).unwrap();
        assert_eq!(index_count(&conn), 0);
    }
}
