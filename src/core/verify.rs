use crate::error::StoreError;
use crate::logging::{log, LogLevel};
use crate::store::{SongplaySample, StarStore, TableKind};

/// Row counts of every table plus a few fact rows that resolved a song.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub counts: Vec<(TableKind, i64)>,
    pub samples: Vec<SongplaySample>,
}

impl VerifyReport {
    pub fn count(&self, table: TableKind) -> Option<i64> {
        self.counts
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
    }
}

pub fn build_report<S: StarStore + ?Sized>(
    store: &mut S,
    sample_limit: usize,
) -> Result<VerifyReport, StoreError> {
    let counts = TableKind::ALL
        .into_iter()
        .map(|table| store.count_rows(table).map(|n| (table, n)))
        .collect::<Result<Vec<_>, _>>()?;
    let samples = store.sample_resolved_songplays(sample_limit)?;
    Ok(VerifyReport { counts, samples })
}

pub fn print_report(report: &VerifyReport) {
    let sep = "=".repeat(60);
    println!("\n{}\n{:^60}\n{}", sep, "Store Verification", sep);
    for (table, n) in &report.counts {
        println!("{:<17} {} row(s)", table.table_name(), n);
    }
    println!("{}", "-".repeat(60));

    if report.samples.is_empty() {
        log(
            LogLevel::Warning,
            "No songplays row references a known song.",
        );
    } else {
        println!("Resolved songplays (first {}):", report.samples.len());
        for s in &report.samples {
            println!(
                "  #{:<6} {}  user {:<5} song {}  artist {}",
                s.songplay_id,
                s.start_time,
                s.user_id,
                s.song_id.as_deref().unwrap_or("-"),
                s.artist_id.as_deref().unwrap_or("-")
            );
        }
    }
    println!("{}", sep);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactPolicy;
    use crate::model::star::{SongArtistKeys, SongplayRow};
    use crate::store::{SqliteStore, StarRow};

    fn play(ts: &str, keys: Option<SongArtistKeys>) -> SongplayRow {
        SongplayRow {
            start_time: ts.to_string(),
            user_id: 8,
            level: Some("free".to_string()),
            keys,
            session_id: 139,
            location: None,
            user_agent: None,
        }
    }

    #[test]
    fn report_counts_tables_and_samples_only_resolved_rows() {
        let mut store = SqliteStore::in_memory(FactPolicy::Append).unwrap();
        let keys = SongArtistKeys {
            song_id: "SOX1".to_string(),
            artist_id: "ARX1".to_string(),
        };
        store
            .insert(StarRow::Songplay(&play("2018-11-01 21:01:46.796", None)))
            .unwrap();
        store
            .insert(StarRow::Songplay(&play("2018-11-01 21:05:52.796", Some(keys))))
            .unwrap();

        let report = build_report(&mut store, 5).unwrap();
        assert_eq!(report.count(TableKind::Songplays), Some(2));
        assert_eq!(report.count(TableKind::Songs), Some(0));
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.samples[0].song_id.as_deref(), Some("SOX1"));
    }
}
