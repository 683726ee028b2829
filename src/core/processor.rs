use crate::config::{self, PipelineConfig, UserPolicy};
use crate::core::stats::{self, log_phase_completion, RunStats};
use crate::core::verify;
use crate::error::{AppError, AppResult};
use crate::extract::{load_source_file, SourceFile, SourceKind};
use crate::io;
use crate::logging::{log, LogLevel};
use crate::model::raw::{LogEvent, SongRecord};
use crate::store::{LoadEngine, SqliteStore, StarRow, StarStore};
use crate::transform::{filter_next_song, resolve_songplay, song_dimensions, time_rows, user_rows};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::Path;
use std::time::Instant;

/// Orchestrator state. Metadata is fully loaded before any log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingMetadata,
    LoadingLogs,
    Done,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Idle => Phase::LoadingMetadata,
            Phase::LoadingMetadata => Phase::LoadingLogs,
            Phase::LoadingLogs | Phase::Done => Phase::Done,
        }
    }

    fn source<'c>(self, config: &'c PipelineConfig) -> Option<(&'c Path, SourceKind)> {
        match self {
            Phase::LoadingMetadata => Some((config.song_data_dir.as_path(), SourceKind::Song)),
            Phase::LoadingLogs => Some((config.log_data_dir.as_path(), SourceKind::Log)),
            Phase::Idle | Phase::Done => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "Idle",
            Phase::LoadingMetadata => "Song Metadata",
            Phase::LoadingLogs => "Activity Log",
            Phase::Done => "Done",
        };
        f.write_str(label)
    }
}

/// Opens the store, loads both source trees, prints the summary and,
/// when asked, the verification report. Returns the process exit code.
pub async fn run(config: PipelineConfig) -> AppResult<i32> {
    let overall_start_time = Instant::now();
    let start_ts_str = Utc::now().format("%Y-%m-%d %H:%M:%S %Z").to_string();

    log(
        LogLevel::Step,
        &format!("Starting star-schema load at {}", start_ts_str),
    );
    log(
        LogLevel::Info,
        &format!(
            "Song data: {} | Log data: {} | Database: {}",
            config.song_data_dir.display(),
            config.log_data_dir.display(),
            config.database_path.display()
        ),
    );
    log(
        LogLevel::Debug,
        &format!(
            "Fact policy: {:?}, user policy: {:?}, read-ahead: {}",
            config.fact_policy, config.user_policy, config.read_ahead
        ),
    );

    let mut store = match SqliteStore::open(&config.database_path, config.fact_policy) {
        Ok(store) => store,
        Err(e) => {
            log(
                LogLevel::Error,
                &format!(
                    "Critical: Could not open database '{}': {}",
                    config.database_path.display(),
                    e
                ),
            );
            return Ok(1);
        }
    };

    if config.reset {
        if let Err(e) = store.reset(config.fact_policy) {
            log(LogLevel::Error, &format!("Critical: Reset failed: {}", e));
            return Ok(1);
        }
    }

    let run_stats = run_pipeline(&mut store, &config).await;

    stats::print_summary(&run_stats, overall_start_time.elapsed());

    if config.verify {
        match verify::build_report(&mut store, config::VERIFY_SAMPLE_LIMIT) {
            Ok(report) => verify::print_report(&report),
            Err(e) => log(LogLevel::Error, &format!("Verification failed: {}", e)),
        }
    }

    Ok(0)
}

/// Runs every phase in order against `store` and returns the merged counters.
/// Failures are counted and logged; nothing here aborts the run.
pub async fn run_pipeline<S: StarStore + ?Sized>(
    store: &mut S,
    config: &PipelineConfig,
) -> RunStats {
    let mut run_stats = RunStats::default();
    let mut phase = Phase::Idle;

    loop {
        phase = phase.next();
        let Some((root, kind)) = phase.source(config) else {
            break;
        };
        let phase_stats = run_phase(store, config, phase, root, kind).await;
        run_stats.merge(&phase_stats);
        stats::log_running_totals(&run_stats);
    }

    log(LogLevel::Debug, &format!("Orchestrator reached {}", phase));
    run_stats
}

async fn run_phase<S: StarStore + ?Sized>(
    store: &mut S,
    config: &PipelineConfig,
    phase: Phase,
    root: &Path,
    kind: SourceKind,
) -> RunStats {
    let phase_start_time = Instant::now();
    log(LogLevel::Step, &format!("--- Phase: {} Load ---", phase));

    let mut phase_stats = RunStats::default();

    let files = match io::discover_data_files(root, &config.extension).await {
        Ok(discovery) => {
            // Each unreadable entry costs one error; its readable siblings still load.
            phase_stats.parse_errors += discovery.skipped.len();
            discovery.files
        }
        Err(e) => {
            log(
                LogLevel::Error,
                &format!("Cannot scan {} source '{}': {}", phase, root.display(), e),
            );
            phase_stats.parse_errors += 1;
            log_phase_completion(&phase.to_string(), &phase_stats, phase_start_time.elapsed());
            return phase_stats;
        }
    };

    let total_files = files.len();
    phase_stats.files_discovered = total_files;
    if total_files == 0 {
        log(
            LogLevel::Warning,
            &format!("No .{} files found under '{}'.", config.extension, root.display()),
        );
    } else {
        log(
            LogLevel::Info,
            &format!("{} file(s) found in '{}'", total_files, root.display()),
        );
    }

    let mut engine = LoadEngine::new(store, config.user_policy);
    let mut current = 0usize;

    let decoded = stream::iter(files)
        .map(|path| async move {
            let result = load_source_file(path.clone(), kind).await;
            (path, result)
        })
        .buffered(config.read_ahead.max(1));

    decoded
        .for_each(|(path, result)| {
            current += 1;
            match result {
                Ok(SourceFile::Song(record)) => {
                    process_song_record(&mut engine, &record, &mut phase_stats);
                    phase_stats.files_processed += 1;
                }
                Ok(SourceFile::Log(events)) => {
                    process_log_events(
                        &mut engine,
                        &events,
                        config.user_policy,
                        &mut phase_stats,
                    );
                    phase_stats.files_processed += 1;
                }
                Err(e) => {
                    log(LogLevel::Warning, &format!("Skipping file: {}", e));
                    phase_stats.parse_errors += 1;
                }
            }
            log(
                LogLevel::Info,
                &format!(
                    "{} complete: {}/{} files processed",
                    path.display(),
                    current,
                    total_files
                ),
            );
            futures::future::ready(())
        })
        .await;

    log_phase_completion(&phase.to_string(), &phase_stats, phase_start_time.elapsed());
    phase_stats
}

/// Loads the song and artist rows of one metadata record.
pub fn process_song_record<S: StarStore + ?Sized>(
    engine: &mut LoadEngine<'_, S>,
    record: &SongRecord,
    stats: &mut RunStats,
) {
    match song_dimensions(record) {
        Ok((song, artist)) => {
            engine.insert(StarRow::Song(&song), stats);
            engine.insert(StarRow::Artist(&artist), stats);
        }
        Err(e) => {
            log(LogLevel::Warning, &format!("Skipping song record: {}", e));
            stats.transform_errors += 1;
        }
    }
}

/// Loads the time, user and songplay rows of one log file, in that order.
pub fn process_log_events<S: StarStore + ?Sized>(
    engine: &mut LoadEngine<'_, S>,
    events: &[LogEvent],
    user_policy: UserPolicy,
    stats: &mut RunStats,
) {
    let playbacks = filter_next_song(events);
    log(
        LogLevel::Debug,
        &format!("{} of {} row(s) are playbacks", playbacks.len(), events.len()),
    );

    for row in time_rows(events) {
        match row {
            Ok(time) => {
                engine.insert(StarRow::Time(&time), stats);
            }
            Err(e) => {
                log(LogLevel::Warning, &format!("Skipping time row: {}", e));
                stats.transform_errors += 1;
            }
        }
    }

    for row in user_rows(&playbacks, user_policy) {
        match row {
            Ok(user) => {
                engine.insert(StarRow::User(&user), stats);
            }
            Err(e) => {
                log(LogLevel::Warning, &format!("Skipping user row: {}", e));
                stats.transform_errors += 1;
            }
        }
    }

    for event in playbacks {
        match resolve_songplay(engine.store(), event) {
            Ok(resolution) => {
                if resolution.hit {
                    stats.lookup_hits += 1;
                } else {
                    stats.lookup_misses += 1;
                    log(
                        LogLevel::Debug,
                        &format!(
                            "No song match for '{}' by '{}' ({}s)",
                            event.song.as_deref().unwrap_or("-"),
                            event.artist.as_deref().unwrap_or("-"),
                            event
                                .length
                                .map(|l| l.to_string())
                                .unwrap_or_else(|| "-".to_string())
                        ),
                    );
                }
                engine.insert(StarRow::Songplay(&resolution.row), stats);
            }
            Err(AppError::Store(e)) => {
                log(LogLevel::Error, &format!("Song lookup failed: {}", e));
                stats.store_errors += 1;
            }
            Err(e) => {
                log(LogLevel::Warning, &format!("Skipping songplay row: {}", e));
                stats.transform_errors += 1;
            }
        }
    }
}
