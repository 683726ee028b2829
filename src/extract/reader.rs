use crate::error::{AppError, AppResult};
use crate::io::map_io_error;
use crate::model::raw::{LogEvent, SongRecord};
use crate::utils;
use std::path::{Path, PathBuf};

/// Which of the two known record shapes a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Song,
    Log,
}

/// A decoded source file.
#[derive(Debug, Clone)]
pub enum SourceFile {
    Song(SongRecord),
    Log(Vec<LogEvent>),
}

fn read_utf8(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path).map_err(|e| map_io_error(e, path))?;
    String::from_utf8(bytes).map_err(|e| AppError::parse(path, format!("not valid UTF-8: {}", e)))
}

/// Decodes a song file: exactly one JSON object.
pub fn parse_song_record(path: &Path, content: &str) -> AppResult<SongRecord> {
    serde_json::from_str(content).map_err(|e| AppError::parse(path, e.to_string()))
}

/// Decodes a log file: one JSON object per line, blank lines ignored.
/// Row order is the file's line order.
pub fn parse_log_events(path: &Path, content: &str) -> AppResult<Vec<LogEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<LogEvent>(line)
                .map_err(|e| AppError::parse(path, format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}

pub fn read_source_file(path: &Path, kind: SourceKind) -> AppResult<SourceFile> {
    let content = read_utf8(path)?;
    match kind {
        SourceKind::Song => parse_song_record(path, &content).map(SourceFile::Song),
        SourceKind::Log => parse_log_events(path, &content).map(SourceFile::Log),
    }
}

/// Reads and decodes `path` on the blocking pool.
pub async fn load_source_file(path: PathBuf, kind: SourceKind) -> AppResult<SourceFile> {
    utils::run_blocking(move || read_source_file(&path, kind)).await
}
