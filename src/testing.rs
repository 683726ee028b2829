use crate::config::UserPolicy;
use crate::extract::{load_source_file, SourceFile, SourceKind};
use crate::error::AppResult;
use crate::io;
use crate::logging::{log, LogLevel};
use crate::model::star::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
use crate::transform::{build_songplay, filter_next_song, song_dimensions, time_rows, user_rows};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Rows one file would produce, before any store is involved.
/// Songplays are shown unresolved.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectOutput {
    pub source: String,
    pub songs: Vec<SongRow>,
    pub artists: Vec<ArtistRow>,
    pub time: Vec<TimeRow>,
    pub users: Vec<UserRow>,
    pub songplays: Vec<SongplayRow>,
    pub errors: Vec<String>,
}

fn push_or_record<T>(target: &mut Vec<T>, errors: &mut Vec<String>, row: AppResult<T>) {
    match row {
        Ok(row) => target.push(row),
        Err(e) => errors.push(e.to_string()),
    }
}

pub fn inspect_source(
    source: &Path,
    file: &SourceFile,
    user_policy: UserPolicy,
) -> InspectOutput {
    let mut out = InspectOutput {
        source: source.display().to_string(),
        ..Default::default()
    };

    match file {
        SourceFile::Song(record) => match song_dimensions(record) {
            Ok((song, artist)) => {
                out.songs.push(song);
                out.artists.push(artist);
            }
            Err(e) => out.errors.push(e.to_string()),
        },
        SourceFile::Log(events) => {
            let playbacks = filter_next_song(events);
            for row in time_rows(events) {
                push_or_record(&mut out.time, &mut out.errors, row);
            }
            for row in user_rows(&playbacks, user_policy) {
                push_or_record(&mut out.users, &mut out.errors, row);
            }
            for event in playbacks {
                push_or_record(
                    &mut out.songplays,
                    &mut out.errors,
                    build_songplay(event, None),
                );
            }
        }
    }
    out
}

pub async fn inspect_file(
    input_path: &Path,
    kind: SourceKind,
    user_policy: UserPolicy,
    output_path: PathBuf,
) -> AppResult<()> {
    log(LogLevel::Info, "--- Running Single File Inspection ---");
    log(
        LogLevel::Info,
        &format!("Input file: {} ({:?})", input_path.display(), kind),
    );
    log(
        LogLevel::Info,
        &format!("Output file: {}", output_path.display()),
    );

    let file = load_source_file(input_path.to_path_buf(), kind)
        .await
        .inspect_err(|e| log(LogLevel::Error, &format!("Decoding failed: {}", e)))?;

    let output = inspect_source(input_path, &file, user_policy);
    log(
        LogLevel::Info,
        &format!(
            "Transformed rows: {} song, {} artist, {} time, {} user, {} songplay ({} error(s))",
            output.songs.len(),
            output.artists.len(),
            output.time.len(),
            output.users.len(),
            output.songplays.len(),
            output.errors.len()
        ),
    );
    for e in &output.errors {
        log(LogLevel::Warning, e);
    }

    let log_ctx = format!("Inspection of {}", input_path.display());
    io::save_json(output_path.clone(), output, log_ctx).await?;
    log(
        LogLevel::Success,
        &format!("Saved transformed rows to {}", output_path.display()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn inspects_log_file_without_store() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("events.json");
        let output = dir.path().join("out.json");
        std::fs::write(
            &input,
            concat!(
                r#"{"page":"NextSong","ts":1541106106796,"userId":"8","sessionId":139,"song":"x","artist":"y","length":1.5}"#,
                "\n",
                r#"{"page":"Home","ts":1541106106797,"userId":"8","sessionId":139}"#,
                "\n",
                r#"{"page":"NextSong","ts":1541106106798,"userId":"8"}"#,
            ),
        )
        .unwrap();

        inspect_file(&input, SourceKind::Log, UserPolicy::LastSeen, output.clone())
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["time"].as_array().unwrap().len(), 3);
        assert_eq!(written["users"].as_array().unwrap().len(), 1);
        assert_eq!(written["songplays"].as_array().unwrap().len(), 1);
        assert_eq!(written["errors"].as_array().unwrap().len(), 1);
        assert!(written["songplays"][0]["keys"].is_null());
    }

    #[tokio::test]
    async fn undecodable_file_is_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.json");
        std::fs::write(&input, "[1, 2").unwrap();

        let result = inspect_file(
            &input,
            SourceKind::Song,
            UserPolicy::LastSeen,
            dir.path().join("out.json"),
        )
        .await;
        assert!(result.is_err());
    }
}
