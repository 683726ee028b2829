use crate::logging::{log, LogLevel};
use crate::store::TableKind;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStats {
    pub attempted: usize,
    pub saved: usize,
    pub duplicate: usize,
}

impl TableStats {
    fn merge(&mut self, other: &TableStats) {
        self.attempted += other.attempted;
        self.saved += other.saved;
        self.duplicate += other.duplicate;
    }
}

/// Counters of one file, one phase, or a whole run. Values are produced
/// per unit of work and merged upward by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub tables: BTreeMap<TableKind, TableStats>,
    pub files_discovered: usize,
    pub files_processed: usize,
    pub parse_errors: usize,
    pub transform_errors: usize,
    pub store_errors: usize,
    pub lookup_hits: usize,
    pub lookup_misses: usize,
}

impl RunStats {
    pub fn table(&self, table: TableKind) -> TableStats {
        self.tables.get(&table).cloned().unwrap_or_default()
    }

    pub fn table_mut(&mut self, table: TableKind) -> &mut TableStats {
        self.tables.entry(table).or_default()
    }

    /// Every failure that was caught and skipped: unreadable files, rows that
    /// could not be mapped, and non-duplicate store failures.
    pub fn handled_errors(&self) -> usize {
        self.parse_errors + self.transform_errors + self.store_errors
    }

    pub fn merge(&mut self, other: &RunStats) {
        for (table, counts) in &other.tables {
            self.table_mut(*table).merge(counts);
        }
        self.files_discovered += other.files_discovered;
        self.files_processed += other.files_processed;
        self.parse_errors += other.parse_errors;
        self.transform_errors += other.transform_errors;
        self.store_errors += other.store_errors;
        self.lookup_hits += other.lookup_hits;
        self.lookup_misses += other.lookup_misses;
    }

    pub fn is_empty(&self) -> bool {
        *self == RunStats::default()
    }
}

pub fn print_summary(stats: &RunStats, duration: Duration) {
    let sep = "=".repeat(60);
    println!("\n{}\n{:^60}\n{}", sep, "Load Summary", sep);
    println!("Total Run Time:    {:.3?}", duration);
    println!(
        "Files:             {} processed / {} discovered",
        stats.files_processed, stats.files_discovered
    );
    println!("{}", "-".repeat(60));

    println!(
        "{:<17} {:<10} {:<10} {:<10}",
        "Table", "Saved", "Duplicate", "Attempted"
    );
    println!("{}", "-".repeat(60));

    for table in TableKind::ALL {
        let s = stats.table(table);
        println!(
            "{:<17} {:<10} {:<10} {:<10}",
            table.table_name(),
            s.saved,
            s.duplicate,
            s.attempted
        );
    }

    println!("{}", "-".repeat(60));
    println!(
        "Song lookups:      {} found, {} not found",
        stats.lookup_hits, stats.lookup_misses
    );
    println!(
        "Handled errors:    {} (parse {}, transform {}, store {})",
        stats.handled_errors(),
        stats.parse_errors,
        stats.transform_errors,
        stats.store_errors
    );
    println!("{}", sep);

    log_overall_status(stats);

    let end_ts_str = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    log(
        LogLevel::Step,
        &format!("--- Run Finished at {} ---", end_ts_str),
    );
}

fn log_overall_status(stats: &RunStats) {
    if stats.files_discovered == 0 {
        log(
            LogLevel::Warning,
            "Run completed, but no data files were found in either source directory.",
        );
    } else if stats.handled_errors() > 0 {
        log(
            LogLevel::Warning,
            &format!(
                "Run completed with {} handled error(s). Check logs.",
                stats.handled_errors()
            ),
        );
    } else {
        log(LogLevel::Success, "Run completed successfully.");
    }
}

pub fn log_phase_completion(phase: &str, stats: &RunStats, elapsed: Duration) {
    let level = if stats.handled_errors() > 0 {
        LogLevel::Warning
    } else {
        LogLevel::Success
    };

    let tables = table_counts(stats);

    log(
        level,
        &format!(
            "--- {} Phase complete ({}/{} files, saved/dup: [{}], {} error(s)) | Elapsed: {:?} ---",
            phase,
            stats.files_processed,
            stats.files_discovered,
            tables,
            stats.handled_errors(),
            elapsed
        ),
    );
}

fn table_counts(stats: &RunStats) -> String {
    stats
        .tables
        .iter()
        .map(|(table, s)| format!("{} {}/{}", table, s.saved, s.duplicate))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line view of the counters merged so far across phases.
pub fn running_totals_line(totals: &RunStats) -> String {
    format!(
        "Running totals: {}/{} files, saved/dup: [{}], lookups {} hit / {} miss, {} error(s)",
        totals.files_processed,
        totals.files_discovered,
        table_counts(totals),
        totals.lookup_hits,
        totals.lookup_misses,
        totals.handled_errors()
    )
}

pub fn log_running_totals(totals: &RunStats) {
    log(LogLevel::Info, &running_totals_line(totals));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_every_counter() {
        let mut total = RunStats::default();
        let mut file = RunStats {
            files_processed: 1,
            parse_errors: 1,
            lookup_misses: 2,
            ..Default::default()
        };
        file.table_mut(TableKind::Songs).saved = 1;
        file.table_mut(TableKind::Songs).attempted = 1;

        total.merge(&file);
        total.merge(&file);

        assert_eq!(total.files_processed, 2);
        assert_eq!(total.handled_errors(), 2);
        assert_eq!(total.lookup_misses, 4);
        assert_eq!(total.table(TableKind::Songs).saved, 2);
        assert_eq!(total.table(TableKind::Users), TableStats::default());
    }

    #[test]
    fn running_totals_include_every_merged_phase() {
        let mut songs_phase = RunStats {
            files_discovered: 2,
            files_processed: 2,
            ..Default::default()
        };
        songs_phase.table_mut(TableKind::Songs).saved = 2;
        let mut logs_phase = RunStats {
            files_discovered: 1,
            files_processed: 0,
            parse_errors: 1,
            ..Default::default()
        };
        logs_phase.table_mut(TableKind::Songs).duplicate = 1;

        let mut totals = RunStats::default();
        totals.merge(&songs_phase);
        totals.merge(&logs_phase);
        let line = running_totals_line(&totals);

        assert!(line.contains("2/3 files"), "{}", line);
        assert!(line.contains("songs 2/1"), "{}", line);
        assert!(line.contains("1 error(s)"), "{}", line);
    }

    #[test]
    fn default_stats_are_empty() {
        assert!(RunStats::default().is_empty());
    }
}
