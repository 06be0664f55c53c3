//! Diagnostics folder lifecycle.
//!
//! Each process run writes into its own folder `<base>/<prefix>-<H>h<M>m<S>s`.
//! At startup, run folders older than the retention window are deleted, then a
//! fresh, uniquely named folder is created for the current run.
//!
//! Deleting an old folder is best-effort: failures are logged and collected in
//! the [`SweepReport`] while the sweep continues. Failing to list the base folder
//! or to create the new run folder is an error, since no sink could be opened.

use crate::models::DiagnosticsConfig;
use crate::services::error::DiagnosticsError;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local, TimeZone, Timelike};
use std::fs;
use std::io;
use std::time::{Duration, SystemTime};

/// Result of the expiration sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Folders that were deleted
    pub deleted: Vec<Utf8PathBuf>,

    /// Folders that were expired but could not be deleted
    pub failed: Vec<Utf8PathBuf>,

    /// Matching folders still inside the retention window
    pub retained: usize,
}

/// Run folder prepared for this process
#[derive(Debug, Clone)]
pub struct PreparedFolder {
    pub path: Utf8PathBuf,
    pub sweep: SweepReport,
}

/// Resolve the base folder holding all diagnostics runs, creating it if needed.
///
/// Uses `config.data_folder` when set, otherwise `<OS data dir>/<app_name>`.
pub fn user_data_folder_path(config: &DiagnosticsConfig) -> Result<Utf8PathBuf, DiagnosticsError> {
    let path = match &config.data_folder {
        Some(path) => path.clone(),
        None => {
            let data_dir = dirs::data_dir().ok_or(DiagnosticsError::DataFolderUnavailable)?;
            let data_dir = Utf8PathBuf::try_from(data_dir)
                .map_err(|_| DiagnosticsError::DataFolderUnavailable)?;
            data_dir.join(&config.app_name)
        }
    };

    if !path.exists() {
        fs::create_dir_all(&path).map_err(|source| DiagnosticsError::FolderCreate {
            path: path.clone(),
            source,
        })?;
    }

    Ok(path)
}

/// Name of the run folder for a given local time, e.g. `Diagnostics-9h5m30s`
pub fn run_folder_name<T: Timelike>(prefix: &str, time: &T) -> String {
    format!(
        "{}-{}h{}m{}s",
        prefix,
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Return `path` if nothing exists there, otherwise the first free `<path>-N`.
pub fn generate_unique_path(path: &Utf8Path) -> Utf8PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let mut suffix = 1u32;
    loop {
        let candidate = Utf8PathBuf::from(format!("{path}-{suffix}"));
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}

/// Delete `<prefix>-*` directories in `base` whose age at `now` exceeds `retention`.
pub fn sweep_expired(
    base: &Utf8Path,
    prefix: &str,
    now: SystemTime,
    retention: Duration,
) -> Result<SweepReport, DiagnosticsError> {
    let expiration = now.checked_sub(retention).unwrap_or(SystemTime::UNIX_EPOCH);
    let pattern = format!("{prefix}-");
    let mut report = SweepReport::default();

    let entries = base
        .read_dir_utf8()
        .map_err(|source| DiagnosticsError::FolderScan {
            path: base.to_path_buf(),
            source,
        })?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", base, e);
                continue;
            }
        };
        if !entry.file_name().starts_with(&pattern) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) if metadata.is_dir() => metadata,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Failed to read metadata of {}: {}", entry.path(), e);
                continue;
            }
        };

        // Not every filesystem records creation time
        let Ok(created) = metadata.created().or_else(|_| metadata.modified()) else {
            tracing::warn!("No timestamp available for {}, keeping it", entry.path());
            report.retained += 1;
            continue;
        };

        if created >= expiration {
            report.retained += 1;
            continue;
        }

        match fs::remove_dir_all(entry.path()) {
            Ok(()) => {
                tracing::info!("Deleted expired diagnostics folder {}", entry.path());
                report.deleted.push(entry.path().to_path_buf());
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to delete expired diagnostics folder {}: {}",
                    entry.path(),
                    e
                );
                report.failed.push(entry.path().to_path_buf());
            }
        }
    }

    Ok(report)
}

/// Create this run's folder under `base`, named after `now`.
///
/// The folder is created exclusively: if another process claims the chosen name
/// between the existence check and creation, the next free name is tried.
pub fn create_run_folder<Tz: TimeZone>(
    base: &Utf8Path,
    prefix: &str,
    now: &DateTime<Tz>,
) -> Result<Utf8PathBuf, DiagnosticsError> {
    let target = base.join(run_folder_name(prefix, now));

    loop {
        let path = generate_unique_path(&target);
        match fs::create_dir(&path) {
            Ok(()) => {
                tracing::info!("Created diagnostics folder {}", path);
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!("Diagnostics folder {} was taken, retrying", path);
            }
            Err(source) => return Err(DiagnosticsError::FolderCreate { path, source }),
        }
    }
}

/// Sweep expired runs and create the folder for this run.
pub fn prepare_diagnostics_folder(
    config: &DiagnosticsConfig,
    now: DateTime<Local>,
) -> Result<PreparedFolder, DiagnosticsError> {
    let base = user_data_folder_path(config)?;

    let sweep = sweep_expired(
        &base,
        &config.folder_prefix,
        SystemTime::from(now),
        config.retention(),
    )?;

    if !sweep.deleted.is_empty() || !sweep.failed.is_empty() {
        tracing::info!(
            "Diagnostics sweep: {} deleted, {} failed, {} retained",
            sweep.deleted.len(),
            sweep.failed.len(),
            sweep.retained
        );
    }

    let path = create_run_folder(&base, &config.folder_prefix, &now)?;
    Ok(PreparedFolder { path, sweep })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use tempfile::TempDir;

    fn temp_base() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_run_folder_name_is_unpadded() {
        let time = NaiveTime::from_hms_opt(9, 5, 30).unwrap();
        assert_eq!(run_folder_name("Diagnostics", &time), "Diagnostics-9h5m30s");
    }

    #[test]
    fn test_generate_unique_path_free_name() {
        let (_temp_dir, base) = temp_base();
        let path = base.join("Diagnostics-1h2m3s");
        assert_eq!(generate_unique_path(&path), path);
    }

    #[test]
    fn test_generate_unique_path_skips_taken_names() {
        let (_temp_dir, base) = temp_base();
        let path = base.join("Diagnostics-1h2m3s");
        fs::create_dir(&path).unwrap();
        fs::create_dir(base.join("Diagnostics-1h2m3s-1")).unwrap();

        assert_eq!(
            generate_unique_path(&path),
            base.join("Diagnostics-1h2m3s-2")
        );
    }

    #[test]
    fn test_generate_unique_path_considers_files() {
        let (_temp_dir, base) = temp_base();
        let path = base.join("Diagnostics-1h2m3s");
        fs::write(&path, "not a folder").unwrap();

        assert_eq!(
            generate_unique_path(&path),
            base.join("Diagnostics-1h2m3s-1")
        );
    }

    #[test]
    fn test_sweep_ignores_other_entries() {
        let (_temp_dir, base) = temp_base();
        fs::create_dir(base.join("Settings")).unwrap();
        fs::write(base.join("Diagnostics-file"), "file").unwrap();

        let later = SystemTime::now() + Duration::from_secs(48 * 3600);
        let report = sweep_expired(&base, "Diagnostics", later, Duration::from_secs(3600)).unwrap();

        assert!(report.deleted.is_empty());
        assert!(base.join("Settings").exists());
        assert!(base.join("Diagnostics-file").exists());
    }

    #[test]
    fn test_sweep_missing_base_is_an_error() {
        let (_temp_dir, base) = temp_base();
        let missing = base.join("missing");

        let result = sweep_expired(
            &missing,
            "Diagnostics",
            SystemTime::now(),
            Duration::from_secs(3600),
        );
        assert!(matches!(result, Err(DiagnosticsError::FolderScan { .. })));
    }

    #[test]
    fn test_create_run_folder() {
        let (_temp_dir, base) = temp_base();
        let now = Local::now();

        let path = create_run_folder(&base, "Diagnostics", &now).unwrap();

        assert!(path.is_dir());
        assert!(path.file_name().unwrap().starts_with("Diagnostics-"));
    }

    #[test]
    fn test_create_run_folder_twice_is_unique() {
        let (_temp_dir, base) = temp_base();
        let now = Local::now();

        let first = create_run_folder(&base, "Diagnostics", &now).unwrap();
        let second = create_run_folder(&base, "Diagnostics", &now).unwrap();

        assert_ne!(first, second);
        assert!(second.as_str().ends_with("-1"));
    }

    #[test]
    fn test_concurrent_runs_never_share_a_folder() {
        let (_temp_dir, base) = temp_base();
        let now = Local::now();

        let mut paths: Vec<Utf8PathBuf> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| create_run_folder(&base, "Diagnostics", &now).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        paths.sort();
        paths.dedup();

        assert_eq!(paths.len(), 8);
        assert!(paths.iter().all(|path| path.is_dir()));
    }

    #[test]
    fn test_create_run_folder_in_missing_base_is_an_error() {
        let (_temp_dir, base) = temp_base();
        let missing = base.join("missing");

        let result = create_run_folder(&missing, "Diagnostics", &Local::now());

        assert!(matches!(result, Err(DiagnosticsError::FolderCreate { .. })));
    }

    #[test]
    fn test_user_data_folder_override_is_created() {
        let (_temp_dir, base) = temp_base();
        let config = DiagnosticsConfig::with_data_folder(base.join("nested/data"));

        let path = user_data_folder_path(&config).unwrap();

        assert_eq!(path, base.join("nested/data"));
        assert!(path.is_dir());
    }
}
