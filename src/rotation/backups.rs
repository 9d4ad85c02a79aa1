use crate::error::{Result, RotologError};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timestamp layout embedded in backup file names
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Extension appended to compressed backups
pub const COMPRESS_SUFFIX: &str = ".gz";

/// A rotated-out file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    /// Rotation time parsed from the file name
    pub time: NaiveDateTime,
    pub compressed: bool,
}

/// Naming convention for backups of one active file:
/// `app.log` rotates to `app-2024-03-09T08-05-07.042.log[.gz]`
#[derive(Debug, Clone)]
pub struct BackupNaming {
    directory: PathBuf,
    stem: String,
    extension: String,
    pattern: Regex,
}

impl BackupNaming {
    pub fn new(directory: &Path, file_name: &str) -> Result<Self> {
        let (stem, extension) = match file_name.rfind('.') {
            Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
            _ => (file_name, ""),
        };

        let pattern = Regex::new(&format!(
            r"^{}-(\d{{4}}-\d{{2}}-\d{{2}}T\d{{2}}-\d{{2}}-\d{{2}}\.\d{{3}}){}({})?$",
            regex::escape(stem),
            regex::escape(extension),
            regex::escape(COMPRESS_SUFFIX),
        ))
        .map_err(|e| RotologError::LogRotationError(format!("Invalid backup pattern: {}", e)))?;

        Ok(Self {
            directory: directory.to_path_buf(),
            stem: stem.to_string(),
            extension: extension.to_string(),
            pattern,
        })
    }

    /// Backup path for a rotation at `time`
    pub fn backup_path(&self, time: &DateTime<FixedOffset>) -> PathBuf {
        self.directory.join(format!(
            "{}-{}{}",
            self.stem,
            time.format(BACKUP_TIME_FORMAT),
            self.extension
        ))
    }

    /// First backup path at or after `time` not already taken by a plain or
    /// compressed backup, together with the timestamp it encodes
    pub fn next_free_backup_path(
        &self,
        time: DateTime<FixedOffset>,
    ) -> (PathBuf, DateTime<FixedOffset>) {
        let mut time = time;
        loop {
            let candidate = self.backup_path(&time);
            if !candidate.exists() && !compressed_path(&candidate).exists() {
                return (candidate, time);
            }
            time += chrono::Duration::milliseconds(1);
        }
    }

    /// Parse a file name as a backup of this log, if it is one
    pub fn parse(&self, file_name: &str) -> Option<(NaiveDateTime, bool)> {
        let caps = self.pattern.captures(file_name)?;
        let time = NaiveDateTime::parse_from_str(caps.get(1)?.as_str(), BACKUP_TIME_FORMAT).ok()?;
        Some((time, caps.get(2).is_some()))
    }

    /// List backups in the directory, newest first
    pub fn list(&self) -> Result<Vec<Backup>> {
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            RotologError::LogRotationError(format!(
                "Failed to read log directory '{}': {}",
                self.directory.display(),
                e
            ))
        })?;

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Some((time, compressed)) = self.parse(name) {
                    backups.push(Backup {
                        path: entry.path(),
                        time,
                        compressed,
                    });
                }
            }
        }

        backups.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| b.path.cmp(&a.path)));
        Ok(backups)
    }

    /// Remove backups older than `max_age`, then all beyond the newest `max_backups`.
    /// Zero disables the respective limit. Returns the removed paths.
    pub fn prune(
        &self,
        max_backups: usize,
        max_age: Duration,
        now: NaiveDateTime,
    ) -> Result<Vec<PathBuf>> {
        let backups = self.list()?;
        let cutoff = if max_age.is_zero() {
            None
        } else {
            chrono::Duration::from_std(max_age)
                .ok()
                .and_then(|age| now.checked_sub_signed(age))
        };

        let mut removed = Vec::new();
        let mut kept = 0;
        for backup in backups {
            let expired = cutoff.map(|cutoff| backup.time < cutoff).unwrap_or(false);
            let over_count = max_backups > 0 && kept >= max_backups;
            if expired || over_count {
                match fs::remove_file(&backup.path) {
                    Ok(()) => removed.push(backup.path),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(RotologError::Io(e)),
                }
            } else {
                kept += 1;
            }
        }

        Ok(removed)
    }
}

/// Path of the compressed form of a backup
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(COMPRESS_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, h, m, s)
            .unwrap()
    }

    #[test]
    fn test_backup_path_format() {
        let naming = BackupNaming::new(Path::new("/var/log"), "myapp.log").unwrap();
        assert_eq!(
            naming.backup_path(&at(8, 5, 7)),
            PathBuf::from("/var/log/myapp-2024-03-09T08-05-07.000.log")
        );
    }

    #[test]
    fn test_backup_path_without_extension() {
        let naming = BackupNaming::new(Path::new("logs"), "server").unwrap();
        assert_eq!(
            naming.backup_path(&at(0, 0, 0)),
            PathBuf::from("logs/server-2024-03-09T00-00-00.000")
        );
    }

    #[test]
    fn test_parse_recognizes_backups_only() {
        let naming = BackupNaming::new(Path::new("logs"), "myapp.log").unwrap();

        let (time, compressed) = naming.parse("myapp-2024-03-09T08-05-07.042.log").unwrap();
        assert_eq!(time.format(BACKUP_TIME_FORMAT).to_string(), "2024-03-09T08-05-07.042");
        assert!(!compressed);

        let (_, compressed) = naming.parse("myapp-2024-03-09T08-05-07.042.log.gz").unwrap();
        assert!(compressed);

        assert!(naming.parse("myapp.log").is_none());
        assert!(naming.parse("other-2024-03-09T08-05-07.042.log").is_none());
        assert!(naming.parse("myapp-2024-03-09T08-05-07.042.log.gz.tmp").is_none());
    }

    #[test]
    fn test_next_free_backup_path_skips_taken_names() {
        let temp_dir = TempDir::new().unwrap();
        let naming = BackupNaming::new(temp_dir.path(), "app.log").unwrap();

        let ms = chrono::Duration::milliseconds;
        fs::write(naming.backup_path(&at(1, 0, 0)), "x").unwrap();
        fs::write(compressed_path(&naming.backup_path(&(at(1, 0, 0) + ms(1)))), "x").unwrap();

        let (next, time) = naming.next_free_backup_path(at(1, 0, 0));
        assert_eq!(time, at(1, 0, 0) + ms(2));
        assert_eq!(next, naming.backup_path(&time));
    }

    #[test]
    fn test_list_sorts_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let naming = BackupNaming::new(temp_dir.path(), "app.log").unwrap();

        fs::write(naming.backup_path(&at(1, 0, 0)), "a").unwrap();
        fs::write(compressed_path(&naming.backup_path(&at(3, 0, 0))), "c").unwrap();
        fs::write(naming.backup_path(&at(2, 0, 0)), "b").unwrap();
        fs::write(temp_dir.path().join("app.log"), "active").unwrap();
        fs::write(temp_dir.path().join("unrelated.txt"), "?").unwrap();

        let backups = naming.list().unwrap();
        let hours: Vec<String> = backups.iter().map(|b| b.time.format("%H").to_string()).collect();
        assert_eq!(hours, vec!["03", "02", "01"]);
        assert!(backups[0].compressed);
    }

    #[test]
    fn test_prune_by_count_evicts_oldest() {
        let temp_dir = TempDir::new().unwrap();
        let naming = BackupNaming::new(temp_dir.path(), "app.log").unwrap();

        for h in 1..=4 {
            fs::write(naming.backup_path(&at(h, 0, 0)), "x").unwrap();
        }

        let removed = naming
            .prune(2, Duration::ZERO, at(5, 0, 0).naive_local())
            .unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!naming.backup_path(&at(1, 0, 0)).exists());
        assert!(!naming.backup_path(&at(2, 0, 0)).exists());
        assert!(naming.backup_path(&at(3, 0, 0)).exists());
        assert!(naming.backup_path(&at(4, 0, 0)).exists());
    }

    #[test]
    fn test_prune_by_age() {
        let temp_dir = TempDir::new().unwrap();
        let naming = BackupNaming::new(temp_dir.path(), "app.log").unwrap();

        fs::write(naming.backup_path(&at(1, 0, 0)), "old").unwrap();
        fs::write(naming.backup_path(&at(9, 0, 0)), "new").unwrap();

        let removed = naming
            .prune(0, Duration::from_secs(3600), at(9, 30, 0).naive_local())
            .unwrap();

        assert_eq!(removed, vec![naming.backup_path(&at(1, 0, 0))]);
        assert!(naming.backup_path(&at(9, 0, 0)).exists());
    }

    #[test]
    fn test_prune_without_limits_keeps_everything() {
        let temp_dir = TempDir::new().unwrap();
        let naming = BackupNaming::new(temp_dir.path(), "app.log").unwrap();

        for h in 1..=3 {
            fs::write(naming.backup_path(&at(h, 0, 0)), "x").unwrap();
        }

        let removed = naming
            .prune(0, Duration::ZERO, at(23, 0, 0).naive_local())
            .unwrap();
        assert!(removed.is_empty());
        assert_eq!(naming.list().unwrap().len(), 3);
    }
}
