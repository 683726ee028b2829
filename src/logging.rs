use colored::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Step,
    Info,
    Success,
    Warning,
    Error,
    Debug,
}

static LOG_LEVEL_CONFIG: Lazy<HashMap<LogLevel, (&'static str, Color)>> = Lazy::new(|| {
    HashMap::from([
        (LogLevel::Step, ("STEP", Color::Magenta)),
        (LogLevel::Info, ("INFO", Color::Cyan)),
        (LogLevel::Success, ("SUCCESS", Color::Green)),
        (LogLevel::Warning, ("WARNING", Color::Yellow)),
        (LogLevel::Error, ("ERROR", Color::Red)),
        (LogLevel::Debug, ("DEBUG", Color::White)),
    ])
});

static MAX_LEVEL_LEN: Lazy<usize> = Lazy::new(|| {
    LOG_LEVEL_CONFIG
        .values()
        .map(|(s, _)| s.len())
        .max()
        .unwrap_or(7)
});

const MIN_PADDING_AFTER_BRACKET: usize = 1;

// "[ LEVEL ]" plus padding, so messages line up regardless of level width.
static TARGET_TOTAL_PREFIX_WIDTH: Lazy<usize> =
    Lazy::new(|| *MAX_LEVEL_LEN + 4 + MIN_PADDING_AFTER_BRACKET);

static LOG_PREFIXES: Lazy<HashMap<LogLevel, String>> = Lazy::new(|| {
    colored::control::set_override(true);

    LOG_LEVEL_CONFIG
        .iter()
        .map(|(level, (level_str, color))| {
            let current_visual_width = level_str.len() + 4;
            let padding_count = TARGET_TOTAL_PREFIX_WIDTH.saturating_sub(current_visual_width);
            let level_part_colored = format!(" {} ", level_str).color(*color).bold();
            (
                *level,
                format!("[{}]{}", level_part_colored, " ".repeat(padding_count)),
            )
        })
        .collect()
});

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`.
pub fn setup_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let format = tracing_subscriber::fmt::format()
        .without_time()
        .with_level(false)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::fmt()
        .event_format(format)
        .with_ansi(true)
        .with_env_filter(filter)
        .try_init();
}

pub fn log(level: LogLevel, message: &str) {
    let prefix = LOG_PREFIXES
        .get(&level)
        .cloned()
        .unwrap_or_else(|| format!("[{:<7}] ", format!("{:?}", level)));

    match level {
        LogLevel::Step => tracing::info!(target: "step", "{}{}", prefix, message),
        LogLevel::Info | LogLevel::Success => tracing::info!("{}{}", prefix, message),
        LogLevel::Warning => tracing::warn!("{}{}", prefix, message),
        LogLevel::Error => tracing::error!("{}{}", prefix, message),
        LogLevel::Debug => tracing::debug!("{}{}", prefix, message),
    }
}
