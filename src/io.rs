use crate::error::{AppError, AppResult};
use crate::logging::{log, LogLevel};
use crate::utils;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

pub(crate) fn map_io_error(error: std::io::Error, path: &Path) -> AppError {
    AppError::Io(format!("I/O error at path '{}': {}", path.display(), error))
}

/// Files found under a root, plus the entries that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// Recursively collects every file under `root` whose extension matches
/// `extension` (case-insensitive). The result is sorted by path.
///
/// Only an unreadable or non-directory `root` is an error. Unreadable
/// entries below it are reported in `skipped` and the walk continues.
pub async fn discover_data_files(root: &Path, extension: &str) -> AppResult<Discovery> {
    let metadata = fs::metadata(root)
        .await
        .map_err(|e| map_io_error(e, root))?;
    if !metadata.is_dir() {
        return Err(AppError::Io(format!(
            "Data root '{}' is not a directory",
            root.display()
        )));
    }

    let root = root.to_path_buf();
    let extension = extension.to_string();
    utils::run_blocking(move || Ok(walk_root(&root, &extension))).await
}

fn walk_root(root: &Path, extension: &str) -> Discovery {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                    discovery.files.push(entry.into_path());
                }
            }
            Err(e) => {
                let at = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                log(
                    LogLevel::Warning,
                    &format!("Cannot read entry '{}': {}", at, e),
                );
                discovery.skipped.push(format!("'{}': {}", at, e));
            }
        }
    }

    discovery.files.sort();
    discovery
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

async fn write_file_async(fpath: &Path, data: &[u8]) -> AppResult<()> {
    let mut file = File::create(fpath)
        .await
        .map_err(|e| map_io_error(e, fpath))?;
    file.write_all(data)
        .await
        .map_err(|e| map_io_error(e, fpath))?;

    Ok(())
}

pub async fn save_json<T>(fpath: PathBuf, data: T, log_ctx: String) -> AppResult<()>
where
    T: Serialize + Send + Sync + 'static,
{
    let json_string =
        utils::run_blocking(move || serde_json::to_string_pretty(&data).map_err(AppError::from))
            .await
            .inspect_err(|e| {
                log(
                    LogLevel::Error,
                    &format!(
                        "Save JSON ({}) FAIL - Serialize/Task Error: {}. File: '{}'",
                        log_ctx,
                        e,
                        fpath.display()
                    ),
                )
            })?;

    if let Err(e) = write_file_async(&fpath, json_string.as_bytes()).await {
        log(
            LogLevel::Error,
            &format!(
                "Save JSON ({}) FAIL - Write Error: {}. File: '{}'",
                log_ctx,
                e,
                fpath.display()
            ),
        );

        if fs::try_exists(&fpath).await.unwrap_or(false) {
            let _ = fs::remove_file(&fpath).await;
        }
        return Err(e);
    }
    Ok(())
}
