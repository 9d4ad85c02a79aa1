use super::backups::{Backup, BackupNaming};
use super::compress::compress_backup;
use crate::config::LoggerConfig;
use crate::error::{Result, RotologError};
use chrono::{DateTime, FixedOffset, Local, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

/// Default maximum active file size before rotation (100MB)
pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

const MEGABYTE: u64 = 1024 * 1024;

/// Configures a [`RotatingWriter`]
#[derive(Debug, Clone)]
pub struct RotatingWriterBuilder {
    directory: PathBuf,
    file_name: String,
    max_size: u64,
    max_backups: usize,
    max_age: Duration,
    compress: bool,
    local_time: bool,
}

impl RotatingWriterBuilder {
    /// Start a builder for `directory/file_name`.
    ///
    /// Defaults: 100MB size limit, keep all backups, no age limit,
    /// no compression, local time in backup names.
    pub fn new<P: AsRef<Path>>(directory: P, file_name: &str) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            file_name: file_name.to_string(),
            max_size: DEFAULT_MAX_SIZE,
            max_backups: 0,
            max_age: Duration::ZERO,
            compress: false,
            local_time: true,
        }
    }

    /// Builder carrying the rotation settings of a logger configuration
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::new(&config.log_dir, &config.log_file)
            .max_size_mb(config.max_size_mb)
            .max_backups(config.max_backups)
            .max_age(config.max_age())
            .compress(config.compress)
            .local_time(config.local_time)
    }

    /// Size limit in bytes. Zero falls back to the 100MB default.
    pub fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size = if bytes == 0 { DEFAULT_MAX_SIZE } else { bytes };
        self
    }

    /// Size limit in megabytes. Zero falls back to the 100MB default.
    pub fn max_size_mb(self, mb: u64) -> Self {
        self.max_size_bytes(mb.saturating_mul(MEGABYTE))
    }

    /// Number of backups to retain, zero keeps all
    pub fn max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Maximum age of the active file and of retained backups, zero disables
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Gzip backups after rotation
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Use local time (rather than UTC) in backup names
    pub fn local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    /// Open (or create) the active file and return the writer
    pub fn build(self) -> Result<RotatingWriter> {
        if self.file_name.is_empty() {
            return Err(RotologError::ConfigValidationError(
                "log file name must not be empty".to_string(),
            ));
        }

        fs::create_dir_all(&self.directory).map_err(|source| RotologError::CreateLogDir {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.directory.join(&self.file_name);
        let naming = BackupNaming::new(&self.directory, &self.file_name)?;
        let state = WriterState::open_existing_or_new(&path)?;

        let writer = RotatingWriter {
            path,
            naming,
            max_size: self.max_size,
            max_backups: self.max_backups,
            max_age: self.max_age,
            compress: self.compress,
            local_time: self.local_time,
            state: Mutex::new(state),
            housekeeping: Arc::new(Mutex::new(())),
            jobs: Mutex::new(Vec::new()),
        };

        // Backups left uncompressed by an earlier run
        if writer.compress {
            let leftovers: Vec<Backup> = writer
                .naming
                .list()?
                .into_iter()
                .filter(|b| !b.compressed)
                .collect();
            for backup in leftovers {
                writer.spawn_compression(backup.path);
            }
        }

        Ok(writer)
    }
}

struct WriterState {
    /// `None` after a failed reopen; the next write retries opening
    file: Option<File>,
    size: u64,
    opened_at: SystemTime,
    /// Timestamp of the most recent backup name, kept strictly increasing
    last_backup: Option<DateTime<FixedOffset>>,
}

impl WriterState {
    fn open_existing_or_new(path: &Path) -> Result<Self> {
        let mut state = Self {
            file: None,
            size: 0,
            opened_at: SystemTime::now(),
            last_backup: None,
        };
        state.reopen(path)?;
        Ok(state)
    }

    fn reopen(&mut self, path: &Path) -> Result<()> {
        let file = open_append(path)?;
        let metadata = file.metadata()?;
        self.opened_at = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or_else(|_| SystemTime::now());
        self.size = metadata.len();
        self.file = Some(file);
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| RotologError::LogFileError {
            path: path.to_path_buf(),
            source,
        })
}

/// File writer that rotates by size and age, prunes backups and
/// optionally gzips them in the background.
///
/// All writes and rotation decisions are serialized by one lock, so the
/// writer can be shared across threads behind an `Arc`.
pub struct RotatingWriter {
    path: PathBuf,
    naming: BackupNaming,
    max_size: u64,
    max_backups: usize,
    max_age: Duration,
    compress: bool,
    local_time: bool,
    state: Mutex<WriterState>,
    /// Held while pruning and while swapping in a compressed backup
    housekeeping: Arc<Mutex<()>>,
    jobs: Mutex<Vec<JoinHandle<()>>>,
}

impl RotatingWriter {
    pub fn builder<P: AsRef<Path>>(directory: P, file_name: &str) -> RotatingWriterBuilder {
        RotatingWriterBuilder::new(directory, file_name)
    }

    /// Append one record, rotating first when it would overflow the
    /// size limit or the active file has outlived `max_age`.
    pub fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock_state();

        if self.should_rotate(&state, buf.len() as u64) {
            self.rotate_locked(&mut state)?;
        }

        let file = self.file_mut(&mut state)?;
        let (written, result) = write_all_counted(file, buf);
        state.size += written as u64;
        result?;

        Ok(buf.len())
    }

    /// Force a rotation regardless of size or age
    pub fn rotate(&self) -> Result<()> {
        let mut state = self.lock_state();
        self.rotate_locked(&mut state)
    }

    /// Flush the active file to stable storage and wait for pending compression
    pub fn sync(&self) -> io::Result<()> {
        {
            let mut state = self.lock_state();
            if let Some(file) = state.file.as_mut() {
                file.flush()?;
                file.sync_all()?;
            }
        }
        self.wait_for_compression();
        Ok(())
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written to the active file so far
    pub fn size(&self) -> u64 {
        self.lock_state().size
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Backups currently on disk, newest first
    pub fn backups(&self) -> Result<Vec<Backup>> {
        self.naming.list()
    }

    fn lock_state(&self) -> MutexGuard<'_, WriterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> DateTime<FixedOffset> {
        if self.local_time {
            Local::now().fixed_offset()
        } else {
            Utc::now().fixed_offset()
        }
    }

    fn should_rotate(&self, state: &WriterState, incoming: u64) -> bool {
        if state.size > 0 && state.size.saturating_add(incoming) > self.max_size {
            return true;
        }

        if !self.max_age.is_zero() && state.size > 0 {
            let age = SystemTime::now()
                .duration_since(state.opened_at)
                .unwrap_or_default();
            if age >= self.max_age {
                return true;
            }
        }

        false
    }

    fn file_mut<'a>(&self, state: &'a mut WriterState) -> io::Result<&'a mut File> {
        if state.file.is_none() {
            state.reopen(&self.path)?;
        }
        state
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file is not open"))
    }

    fn rotate_locked(&self, state: &mut WriterState) -> Result<()> {
        // Close before renaming so the rename also works where open files are locked
        if let Some(mut file) = state.file.take() {
            file.flush()?;
        }

        let now = self.now();
        let stamp = match state.last_backup {
            Some(last) if last >= now => last + chrono::Duration::milliseconds(1),
            _ => now,
        };
        let (backup, stamp) = self.naming.next_free_backup_path(stamp);

        if let Err(e) = fs::rename(&self.path, &backup) {
            if e.kind() != io::ErrorKind::NotFound {
                // Keep appending to the old file rather than losing records
                let _ = state.reopen(&self.path);
                return Err(RotologError::LogRotationError(format!(
                    "Failed to rename '{}' to '{}': {}",
                    self.path.display(),
                    backup.display(),
                    e
                )));
            }
        }

        state.last_backup = Some(stamp);
        state.file = Some(open_append(&self.path)?);
        state.size = 0;
        state.opened_at = SystemTime::now();

        {
            let _guard = self.housekeeping.lock().unwrap_or_else(PoisonError::into_inner);
            let removed = self
                .naming
                .prune(self.max_backups, self.max_age, now.naive_local())?;
            for path in &removed {
                tracing::debug!("Removed expired log backup {}", path.display());
            }
        }

        if self.compress && backup.exists() {
            self.spawn_compression(backup);
        }

        Ok(())
    }

    fn spawn_compression(&self, backup: PathBuf) {
        let housekeeping = Arc::clone(&self.housekeeping);
        let handle = std::thread::spawn(move || {
            if let Err(e) = compress_backup(&backup, &housekeeping) {
                tracing::warn!("Failed to compress log backup {}: {}", backup.display(), e);
            }
        });

        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.retain(|job| !job.is_finished());
        jobs.push(handle);
    }

    fn wait_for_compression(&self) {
        let pending: Vec<JoinHandle<()>> = {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.drain(..).collect()
        };
        for job in pending {
            let _ = job.join();
        }
    }
}

/// `write_all` that also reports how many bytes reached the writer, including
/// on failure.
fn write_all_counted<W: Write>(out: &mut W, mut buf: &[u8]) -> (usize, io::Result<()>) {
    let mut written = 0;
    while !buf.is_empty() {
        match out.write(buf) {
            Ok(0) => {
                return (
                    written,
                    Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole record",
                    )),
                )
            }
            Ok(n) => {
                written += n;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (written, Err(e)),
        }
    }
    (written, Ok(()))
}

impl Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_record(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.lock_state();
        match state.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl Drop for RotatingWriter {
    fn drop(&mut self) {
        self.wait_for_compression();
    }
}
