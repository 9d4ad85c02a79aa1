// Rotation module - size/age based file rotation with retention and compression

mod backups;
mod compress;
mod writer;

pub use backups::{compressed_path, Backup, BackupNaming, BACKUP_TIME_FORMAT};
pub use compress::compress_backup;
pub use writer::{RotatingWriter, RotatingWriterBuilder, DEFAULT_MAX_SIZE};
