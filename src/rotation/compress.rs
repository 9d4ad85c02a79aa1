use super::backups::compressed_path;
use crate::error::{Result, RotologError};
use flate2::write::GzEncoder;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Gzip a rotated-out file next to itself and remove the original.
///
/// The payload is encoded into a temporary file without holding any lock.
/// Only the final swap runs under `housekeeping`, the same lock pruning takes,
/// so a backup pruned mid-compression is never resurrected as `.gz`.
/// Returns `None` when the source was pruned before the swap.
pub fn compress_backup(src: &Path, housekeeping: &Mutex<()>) -> Result<Option<PathBuf>> {
    let dst = compressed_path(src);
    let mut tmp = dst.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(source) = encode(src, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(RotologError::CompressionError {
            path: src.to_path_buf(),
            source,
        });
    }

    let _guard = housekeeping.lock().unwrap_or_else(PoisonError::into_inner);

    if !src.exists() {
        let _ = fs::remove_file(&tmp);
        return Ok(None);
    }

    fs::rename(&tmp, &dst).map_err(|source| RotologError::CompressionError {
        path: src.to_path_buf(),
        source,
    })?;
    fs::remove_file(src)?;

    Ok(Some(dst))
}

fn encode(src: &Path, dst: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(fs::File::open(src)?);
    let writer = BufWriter::new(fs::File::create(dst)?);

    let mut encoder = GzEncoder::new(writer, flate2::Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(())
}
