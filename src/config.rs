use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

pub const DEFAULT_SONG_DATA_DIR: &str = "data/song_data";
pub const DEFAULT_LOG_DATA_DIR: &str = "data/log_data";
pub const DEFAULT_DATABASE_PATH: &str = "sparkify.db";
pub const DATA_FILE_EXTENSION: &str = "json";

/// `page` value of a log row that records a completed playback.
pub const NEXT_SONG_PAGE: &str = "NextSong";

pub const VERIFY_SAMPLE_LIMIT: usize = 5;
pub const MAX_READ_AHEAD: usize = 64;

/// Text layout of `start_time` columns in the `time` and `songplays` tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// How repeated fact rows are treated across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FactPolicy {
    /// Facts are an append-only event log; re-runs add rows.
    #[default]
    Append,
    /// `(start_time, user_id, session_id)` is unique; repeats are counted as duplicates.
    Dedupe,
}

/// Which occurrence of a user id wins within one log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UserPolicy {
    #[default]
    LastSeen,
    FirstSeen,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub database_path: PathBuf,
    pub extension: String,
    pub fact_policy: FactPolicy,
    pub user_policy: UserPolicy,
    pub read_ahead: usize,
    pub reset: bool,
    pub verify: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            song_data_dir: PathBuf::from(DEFAULT_SONG_DATA_DIR),
            log_data_dir: PathBuf::from(DEFAULT_LOG_DATA_DIR),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            extension: DATA_FILE_EXTENSION.to_string(),
            fact_policy: FactPolicy::default(),
            user_policy: UserPolicy::default(),
            read_ahead: default_read_ahead(),
            reset: false,
            verify: false,
        }
    }
}

pub fn default_read_ahead() -> usize {
    num_cpus::get().clamp(1, MAX_READ_AHEAD)
}
