use super::{StarRow, StarStore, TableKind};
use crate::config::UserPolicy;
use crate::core::stats::RunStats;
use crate::error::StoreError;
use crate::logging::{log, LogLevel};
use crate::model::star::UserRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Saved,
    DuplicateKey,
    OtherError,
}

/// Issues one insert per row and turns the store's answer into counters.
/// A failing row never stops the caller.
pub struct LoadEngine<'s, S: StarStore + ?Sized> {
    store: &'s mut S,
    user_policy: UserPolicy,
}

impl<'s, S: StarStore + ?Sized> LoadEngine<'s, S> {
    pub fn new(store: &'s mut S, user_policy: UserPolicy) -> Self {
        LoadEngine { store, user_policy }
    }

    pub fn store(&mut self) -> &mut S {
        &mut *self.store
    }

    pub fn insert(&mut self, row: StarRow<'_>, stats: &mut RunStats) -> LoadOutcome {
        let table = row.table();
        stats.table_mut(table).attempted += 1;

        match self.store.insert(row) {
            Ok(()) => {
                stats.table_mut(table).saved += 1;
                log(LogLevel::Debug, &format!("Saved {}", row.describe()));
                LoadOutcome::Saved
            }
            Err(StoreError::DuplicateKey { .. }) => {
                stats.table_mut(table).duplicate += 1;
                log(
                    LogLevel::Debug,
                    &format!("Store reports a duplicate key for {}", row.describe()),
                );
                if let StarRow::User(user) = row {
                    self.refresh_user(user, stats);
                }
                LoadOutcome::DuplicateKey
            }
            Err(e) => {
                stats.store_errors += 1;
                log(
                    LogLevel::Error,
                    &format!("Error saving {}: {}", row.describe(), e),
                );
                LoadOutcome::OtherError
            }
        }
    }

    // A repeated user keeps its most recent attributes under last-seen.
    fn refresh_user(&mut self, user: &UserRow, stats: &mut RunStats) {
        if self.user_policy != UserPolicy::LastSeen {
            return;
        }
        if let Err(e) = self.store.refresh_user(user) {
            stats.store_errors += 1;
            log(
                LogLevel::Error,
                &format!("Error refreshing {}: {}", TableKind::Users, e),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactPolicy;
    use crate::model::star::{LookupKey, SongArtistKeys, SongRow};
    use crate::store::{SongplaySample, SqliteStore};

    /// Rejects every write with a non-duplicate failure.
    struct BrokenStore;

    impl StarStore for BrokenStore {
        fn insert(&mut self, _row: StarRow<'_>) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk I/O error".to_string()))
        }
        fn refresh_user(&mut self, _row: &UserRow) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk I/O error".to_string()))
        }
        fn find_song_artist(
            &mut self,
            _key: &LookupKey,
        ) -> Result<Option<SongArtistKeys>, StoreError> {
            Err(StoreError::Backend("disk I/O error".to_string()))
        }
        fn count_rows(&mut self, _table: TableKind) -> Result<i64, StoreError> {
            Ok(0)
        }
        fn sample_resolved_songplays(
            &mut self,
            _limit: usize,
        ) -> Result<Vec<SongplaySample>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn song() -> SongRow {
        SongRow {
            song_id: "SOX1".to_string(),
            title: "Test Song".to_string(),
            artist_id: "ARX1".to_string(),
            year: 2001,
            duration: 200.5,
        }
    }

    fn user(level: &str) -> UserRow {
        UserRow {
            user_id: 15,
            first_name: Some("Lily".to_string()),
            last_name: Some("Koch".to_string()),
            gender: Some("F".to_string()),
            level: Some(level.to_string()),
        }
    }

    #[test]
    fn same_song_twice_is_one_saved_one_duplicate() {
        let mut store = SqliteStore::in_memory(FactPolicy::Append).unwrap();
        let mut engine = LoadEngine::new(&mut store, UserPolicy::LastSeen);
        let mut stats = RunStats::default();

        let first = engine.insert(StarRow::Song(&song()), &mut stats);
        let second = engine.insert(StarRow::Song(&song()), &mut stats);

        assert_eq!(first, LoadOutcome::Saved);
        assert_eq!(second, LoadOutcome::DuplicateKey);
        let songs = stats.table(TableKind::Songs);
        assert_eq!((songs.attempted, songs.saved, songs.duplicate), (2, 1, 1));
        assert_eq!(stats.handled_errors(), 0);
    }

    #[test]
    fn other_store_failures_are_counted_and_swallowed() {
        let mut store = BrokenStore;
        let mut engine = LoadEngine::new(&mut store, UserPolicy::LastSeen);
        let mut stats = RunStats::default();

        assert_eq!(
            engine.insert(StarRow::Song(&song()), &mut stats),
            LoadOutcome::OtherError
        );
        assert_eq!(
            engine.insert(StarRow::Song(&song()), &mut stats),
            LoadOutcome::OtherError
        );
        assert_eq!(stats.store_errors, 2);
        assert_eq!(stats.table(TableKind::Songs).saved, 0);
    }

    #[test]
    fn last_seen_refreshes_repeated_user() {
        let mut store = SqliteStore::in_memory(FactPolicy::Append).unwrap();
        let mut stats = RunStats::default();
        {
            let mut engine = LoadEngine::new(&mut store, UserPolicy::LastSeen);
            engine.insert(StarRow::User(&user("free")), &mut stats);
            engine.insert(StarRow::User(&user("paid")), &mut stats);
        }

        let level: String = store
            .connection()
            .query_row("SELECT level FROM users WHERE user_id = 15", [], |r| r.get(0))
            .unwrap();
        assert_eq!(level, "paid");
        assert_eq!(stats.table(TableKind::Users).duplicate, 1);
    }

    #[test]
    fn first_seen_keeps_stored_user() {
        let mut store = SqliteStore::in_memory(FactPolicy::Append).unwrap();
        let mut stats = RunStats::default();
        {
            let mut engine = LoadEngine::new(&mut store, UserPolicy::FirstSeen);
            engine.insert(StarRow::User(&user("free")), &mut stats);
            engine.insert(StarRow::User(&user("paid")), &mut stats);
        }

        let level: String = store
            .connection()
            .query_row("SELECT level FROM users WHERE user_id = 15", [], |r| r.get(0))
            .unwrap();
        assert_eq!(level, "free");
    }
}
