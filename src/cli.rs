use crate::config::{self, FactPolicy, PipelineConfig, UserPolicy};
use crate::error::{AppError, AppResult};
use crate::extract::SourceKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectKind {
    Song,
    Log,
}

impl From<InspectKind> for SourceKind {
    fn from(kind: InspectKind) -> Self {
        match kind {
            InspectKind::Song => SourceKind::Song,
            InspectKind::Log => SourceKind::Log,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Loads song metadata and activity logs into a songplays star schema.",
    long_about = None
)]
pub struct CliArgs {
    #[arg(
        long,
        default_value = config::DEFAULT_SONG_DATA_DIR,
        value_name = "DIR_PATH",
        help = "Root directory of song metadata files"
    )]
    song_data: String,

    #[arg(
        long,
        default_value = config::DEFAULT_LOG_DATA_DIR,
        value_name = "DIR_PATH",
        help = "Root directory of activity log files"
    )]
    log_data: String,

    #[arg(
        long,
        default_value = config::DEFAULT_DATABASE_PATH,
        value_name = "FILE_PATH",
        help = "SQLite database file"
    )]
    database: String,

    #[arg(
        long,
        default_value = config::DATA_FILE_EXTENSION,
        value_name = "EXT",
        help = "Extension of data files to pick up"
    )]
    extension: String,

    #[arg(long, value_enum, default_value_t = FactPolicy::Append)]
    fact_policy: FactPolicy,

    #[arg(long, value_enum, default_value_t = UserPolicy::LastSeen)]
    user_policy: UserPolicy,

    #[arg(
        long,
        value_name = "N",
        help = "Files decoded ahead of the loader [default: number of CPUs]"
    )]
    read_ahead: Option<usize>,

    #[arg(long, help = "Drop and recreate all tables before loading")]
    reset: bool,

    #[arg(long, help = "Print row counts and sample songplays after loading")]
    verify: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,

    #[arg(
        long,
        value_name = "FILE_PATH",
        help = "Transform a single data file without a database and write the rows as JSON",
        conflicts_with_all = ["reset", "verify"]
    )]
    inspect_file: Option<String>,

    #[arg(
        long,
        value_enum,
        default_value_t = InspectKind::Log,
        requires = "inspect_file",
        help = "Record shape of the inspected file"
    )]
    inspect_kind: InspectKind,

    #[arg(
        long,
        default_value = "inspect_output.json",
        value_name = "OUTPUT_FILE",
        requires = "inspect_file",
        help = "Output file for inspection mode"
    )]
    inspect_output: String,
}

impl CliArgs {
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn get_inspect_file(&self) -> Option<PathBuf> {
        self.inspect_file.as_deref().map(PathBuf::from)
    }

    pub fn get_inspect_kind(&self) -> SourceKind {
        self.inspect_kind.into()
    }

    pub fn get_inspect_output(&self) -> PathBuf {
        PathBuf::from(&self.inspect_output)
    }

    pub fn get_user_policy(&self) -> UserPolicy {
        self.user_policy
    }

    pub fn to_config(&self) -> AppResult<PipelineConfig> {
        let extension = self.extension.trim().trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(AppError::Argument(
                "File extension must not be empty (e.g. 'json').".into(),
            ));
        }

        let read_ahead = match self.read_ahead {
            Some(0) => {
                return Err(AppError::Argument(
                    "--read-ahead must be at least 1.".into(),
                ))
            }
            Some(n) => n.min(config::MAX_READ_AHEAD),
            None => config::default_read_ahead(),
        };

        Ok(PipelineConfig {
            song_data_dir: PathBuf::from(&self.song_data),
            log_data_dir: PathBuf::from(&self.log_data),
            database_path: PathBuf::from(&self.database),
            extension,
            fact_policy: self.fact_policy,
            user_policy: self.user_policy,
            read_ahead,
            reset: self.reset,
            verify: self.verify,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_config() {
        let args = CliArgs::try_parse_from(["songplay-etl"]).unwrap();
        let cfg = args.to_config().unwrap();
        assert_eq!(cfg.song_data_dir, PathBuf::from(config::DEFAULT_SONG_DATA_DIR));
        assert_eq!(cfg.database_path, PathBuf::from(config::DEFAULT_DATABASE_PATH));
        assert_eq!(cfg.extension, "json");
        assert_eq!(cfg.fact_policy, FactPolicy::Append);
        assert_eq!(cfg.user_policy, UserPolicy::LastSeen);
        assert!(cfg.read_ahead >= 1);
        assert!(args.get_inspect_file().is_none());
    }

    #[test]
    fn parses_policies_and_flags() {
        let args = CliArgs::try_parse_from([
            "songplay-etl",
            "--fact-policy",
            "dedupe",
            "--user-policy",
            "first-seen",
            "--extension",
            ".JSON",
            "--read-ahead",
            "4",
            "--reset",
            "--verify",
        ])
        .unwrap();
        let cfg = args.to_config().unwrap();
        assert_eq!(cfg.fact_policy, FactPolicy::Dedupe);
        assert_eq!(cfg.user_policy, UserPolicy::FirstSeen);
        assert_eq!(cfg.extension, "JSON");
        assert_eq!(cfg.read_ahead, 4);
        assert!(cfg.reset && cfg.verify);
    }

    #[test]
    fn rejects_zero_read_ahead() {
        let args = CliArgs::try_parse_from(["songplay-etl", "--read-ahead", "0"]).unwrap();
        assert!(matches!(args.to_config(), Err(AppError::Argument(_))));
    }

    #[test]
    fn inspect_options_require_a_file() {
        assert!(CliArgs::try_parse_from(["songplay-etl", "--inspect-kind", "song"]).is_err());

        let args = CliArgs::try_parse_from([
            "songplay-etl",
            "--inspect-file",
            "a.json",
            "--inspect-kind",
            "song",
        ])
        .unwrap();
        assert_eq!(args.get_inspect_file(), Some(PathBuf::from("a.json")));
        assert_eq!(args.get_inspect_kind(), SourceKind::Song);
        assert_eq!(args.get_inspect_output(), PathBuf::from("inspect_output.json"));
    }
}
