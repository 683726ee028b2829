use crate::config::{self, UserPolicy};
use crate::error::{AppError, AppResult};
use crate::model::common::UserId;
use crate::model::raw::{LogEvent, SongRecord};
use crate::model::star::{ArtistRow, SongRow, TimeRow, UserRow};
use crate::transform::time::derive_time;
use crate::transform::util::{normalize_optional_text, normalize_text};
use std::collections::HashMap;

fn required_text(value: &str, field: &str, context: &str) -> AppResult<String> {
    let text = normalize_text(value);
    if text.is_empty() {
        Err(AppError::transform(format!("{} has an empty '{}'", context, field)))
    } else {
        Ok(text)
    }
}

/// Builds the song and artist rows carried by one metadata record.
pub fn song_dimensions(record: &SongRecord) -> AppResult<(SongRow, ArtistRow)> {
    let song_id = required_text(&record.song_id, "song_id", "song record")?;
    let context = format!("song {}", song_id);
    let artist_id = required_text(&record.artist_id, "artist_id", &context)?;
    let duration = record
        .duration
        .ok_or_else(|| AppError::transform(format!("{} has no duration", context)))?;

    let song = SongRow {
        song_id,
        title: required_text(&record.title, "title", &context)?,
        artist_id: artist_id.clone(),
        year: record.year.unwrap_or(0),
        duration,
    };
    let artist = ArtistRow {
        artist_id,
        name: required_text(&record.artist_name, "artist_name", &context)?,
        location: normalize_optional_text(record.artist_location.as_deref()),
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    };
    Ok((song, artist))
}

/// Rows recording a completed playback, in file order.
pub fn filter_next_song(events: &[LogEvent]) -> Vec<&LogEvent> {
    events
        .iter()
        .filter(|e| e.is_page(config::NEXT_SONG_PAGE))
        .collect()
}

/// One time row per event, in file order. Equal timestamps give equal rows.
pub fn time_rows(events: &[LogEvent]) -> Vec<AppResult<TimeRow>> {
    events.iter().map(|e| derive_time(e.ts)).collect()
}

fn user_row(event: &LogEvent, user_id: UserId) -> UserRow {
    UserRow {
        user_id,
        first_name: normalize_optional_text(event.first_name.as_deref()),
        last_name: normalize_optional_text(event.last_name.as_deref()),
        gender: event.gender.clone(),
        level: event.level.clone(),
    }
}

/// One user row per distinct user id, ordered by first appearance.
///
/// Under `FirstSeen` the attributes of the first row win; under `LastSeen`
/// later rows overwrite earlier ones. Rows without a user id yield an error
/// entry each.
pub fn user_rows(events: &[&LogEvent], policy: UserPolicy) -> Vec<AppResult<UserRow>> {
    let mut out: Vec<AppResult<UserRow>> = Vec::new();
    let mut positions: HashMap<UserId, usize> = HashMap::new();

    for event in events {
        let Some(user_id) = event.user_id else {
            out.push(Err(AppError::transform(format!(
                "playback at {} has no user id",
                event.ts
            ))));
            continue;
        };

        match positions.get(&user_id) {
            Some(&idx) => {
                if policy == UserPolicy::LastSeen {
                    out[idx] = Ok(user_row(event, user_id));
                }
            }
            None => {
                positions.insert(user_id, out.len());
                out.push(Ok(user_row(event, user_id)));
            }
        }
    }
    out
}
