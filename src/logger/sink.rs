use crate::rotation::RotatingWriter;
use std::io;
use std::sync::Arc;

/// Destination for encoded record lines
pub trait LogSink: Send + Sync {
    /// Write one complete encoded record
    fn write_record(&self, buf: &[u8]) -> io::Result<usize>;

    /// Flush buffered bytes to stable storage
    fn sync(&self) -> io::Result<()>;
}

impl LogSink for RotatingWriter {
    fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write_record(self, buf)
    }

    fn sync(&self) -> io::Result<()> {
        RotatingWriter::sync(self)
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write_record(buf)
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }
}
