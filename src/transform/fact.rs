use crate::error::{AppError, AppResult};
use crate::model::raw::LogEvent;
use crate::model::star::{LookupKey, SongArtistKeys, SongplayRow};
use crate::store::StarStore;
use crate::transform::time::format_start_time;
use crate::transform::util::{normalize_optional_text, normalize_text};

/// Result of resolving one playback row against the dimension tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub row: SongplayRow,
    pub hit: bool,
}

/// Lookup key of a playback, or `None` when song, artist or length is absent.
pub fn lookup_key(event: &LogEvent) -> Option<LookupKey> {
    match (&event.song, &event.artist, event.length) {
        (Some(song), Some(artist), Some(length)) => Some(LookupKey {
            title: normalize_text(song),
            artist_name: normalize_text(artist),
            duration: length,
        }),
        _ => None,
    }
}

/// Builds the fact row of a playback with the given keys.
pub fn build_songplay(event: &LogEvent, keys: Option<SongArtistKeys>) -> AppResult<SongplayRow> {
    let user_id = event.user_id.ok_or_else(|| {
        AppError::transform(format!("playback at {} has no user id", event.ts))
    })?;
    let session_id = event.session_id.ok_or_else(|| {
        AppError::transform(format!("playback at {} has no session id", event.ts))
    })?;

    Ok(SongplayRow {
        start_time: format_start_time(event.ts)?,
        user_id,
        level: event.level.clone(),
        keys,
        session_id,
        location: normalize_optional_text(event.location.as_deref()),
        user_agent: event.user_agent.clone(),
    })
}

/// Validates the playback, looks up its song and artist, and returns the fact
/// row. A lookup miss is not an error: the row carries no keys.
pub fn resolve_songplay<S: StarStore + ?Sized>(
    store: &mut S,
    event: &LogEvent,
) -> AppResult<Resolution> {
    // Validate first so a row that cannot be stored costs no lookup.
    let unresolved = build_songplay(event, None)?;

    let keys = match lookup_key(event) {
        Some(key) => store.find_song_artist(&key)?,
        None => None,
    };

    let hit = keys.is_some();
    Ok(Resolution {
        row: SongplayRow { keys, ..unresolved },
        hit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactPolicy;
    use crate::extract::reader::parse_log_events;
    use crate::model::star::{ArtistRow, SongRow};
    use crate::store::{SqliteStore, StarRow};
    use std::path::Path;

    fn event(line: &str) -> LogEvent {
        parse_log_events(Path::new("t.json"), line).unwrap().remove(0)
    }

    fn seeded_store() -> SqliteStore {
        let mut store = SqliteStore::in_memory(FactPolicy::Append).unwrap();
        store
            .insert(StarRow::Song(&SongRow {
                song_id: "SOX1".to_string(),
                title: "Test Song".to_string(),
                artist_id: "ARX1".to_string(),
                year: 2001,
                duration: 200.5,
            }))
            .unwrap();
        store
            .insert(StarRow::Artist(&ArtistRow {
                artist_id: "ARX1".to_string(),
                name: "Tester".to_string(),
                location: None,
                latitude: None,
                longitude: None,
            }))
            .unwrap();
        store
    }

    #[test]
    fn hit_sets_both_keys() {
        let mut store = seeded_store();
        let e = event(
            r#"{"page":"NextSong","ts":1541106106796,"userId":"8","sessionId":139,"level":"free","song":"Test Song","artist":"Tester","length":200.5,"location":"Phoenix-Mesa-Scottsdale, AZ","userAgent":"UA"}"#,
        );

        let resolved = resolve_songplay(&mut store, &e).unwrap();
        assert!(resolved.hit);
        assert_eq!(resolved.row.song_id(), Some("SOX1"));
        assert_eq!(resolved.row.artist_id(), Some("ARX1"));
        assert_eq!(resolved.row.start_time, "2018-11-01 21:01:46.796");
        assert_eq!(resolved.row.user_id, 8);
        assert_eq!(resolved.row.session_id, 139);
    }

    #[test]
    fn miss_leaves_both_keys_null() {
        let mut store = seeded_store();
        let e = event(
            r#"{"page":"NextSong","ts":1541106106796,"userId":"8","sessionId":139,"song":"Test Song","artist":"Somebody Else","length":200.5}"#,
        );

        let resolved = resolve_songplay(&mut store, &e).unwrap();
        assert!(!resolved.hit);
        assert_eq!(resolved.row.song_id(), None);
        assert_eq!(resolved.row.artist_id(), None);
    }

    #[test]
    fn missing_length_is_a_miss_without_lookup() {
        let e = event(r#"{"page":"NextSong","ts":1,"userId":"8","sessionId":1,"song":"x","artist":"y"}"#);
        assert_eq!(lookup_key(&e), None);
    }

    #[test]
    fn playback_without_session_is_transform_error() {
        let mut store = seeded_store();
        let e = event(r#"{"page":"NextSong","ts":1,"userId":"8"}"#);
        assert!(matches!(
            resolve_songplay(&mut store, &e),
            Err(AppError::Transform(_))
        ));
    }
}
