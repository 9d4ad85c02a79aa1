// Logger module - leveled, field-annotated records written through a rotating sink

mod encoder;
mod field;
pub mod global;
mod level;
mod sink;
mod terminator;

pub use encoder::{short_caller, Encoder, Record, TIME_FORMAT};
pub use field::{Field, Value};
pub use level::Level;
pub use sink::LogSink;
pub use terminator::{ProcessExit, Terminator};

use crate::config::LoggerConfig;
use crate::error::{Result, RotologError};
use crate::rotation::RotatingWriterBuilder;
use colored::Colorize;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Exit status used after a fatal record
pub const FATAL_EXIT_CODE: i32 = 1;

/// Structured logger: filters by level, encodes one line per record and
/// hands it to a [`LogSink`].
///
/// Cloning is cheap; clones share the sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    level: Level,
    encoder: Encoder,
    local_time: bool,
    stacktrace: bool,
    console: bool,
    context: Arc<[Field]>,
    terminator: Arc<dyn Terminator>,
}

impl Logger {
    /// Build a logger writing to `log_dir/log_file` with rotation per `config`.
    ///
    /// # Returns
    /// * `Ok(Logger)` - Directory exists and the active file is open
    /// * `Err(RotologError::CreateLogDir)` - The log directory could not be created
    pub fn new(config: &LoggerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.log_dir).map_err(|source| RotologError::CreateLogDir {
            path: config.log_dir.clone(),
            source,
        })?;

        let writer = RotatingWriterBuilder::from_config(config).build()?;

        Ok(LoggerBuilder::new(writer)
            .level(config.level())
            .local_time(config.local_time)
            .stacktrace(config.stacktrace)
            .console(config.console)
            .build())
    }

    /// Start building a logger over an arbitrary sink
    pub fn builder<S: LogSink + 'static>(sink: S) -> LoggerBuilder {
        LoggerBuilder::new(sink)
    }

    /// Minimum level that reaches the sink
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// A child logger that prepends `fields` to every record
    pub fn with(&self, fields: &[Field]) -> Logger {
        let context: Vec<Field> = self.context.iter().chain(fields.iter()).cloned().collect();
        Logger {
            context: context.into(),
            ..self.clone()
        }
    }

    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.log(Level::Debug, message, fields);
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.log(Level::Warn, message, fields);
    }

    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field]) {
        self.log(Level::Error, message, fields);
    }

    /// Write a fatal record, then terminate. See [`Logger::emit_and_terminate`].
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Field]) {
        self.emit_and_terminate(message, fields);
    }

    /// Best-effort emission. Sink errors are reported as diagnostics and
    /// never reach the caller. A `Fatal` level terminates after writing.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: &[Field]) {
        if level == Level::Fatal {
            self.emit_and_terminate(message, fields);
            return;
        }

        if let Err(e) = self.emit_at(level, Location::caller(), message, fields) {
            tracing::warn!("Failed to write log record: {}", e);
        }
    }

    /// Emission that reports sink failures. Records below the minimum
    /// level return `Ok(0)` without touching the sink.
    #[track_caller]
    pub fn try_emit(&self, level: Level, message: &str, fields: &[Field]) -> Result<usize> {
        self.emit_at(level, Location::caller(), message, fields)
    }

    /// Write a fatal record best-effort, sync, then hand over to the terminator
    #[track_caller]
    pub fn emit_and_terminate(&self, message: &str, fields: &[Field]) {
        if let Err(e) = self.emit_at(Level::Fatal, Location::caller(), message, fields) {
            tracing::warn!("Failed to write fatal log record: {}", e);
        }
        if let Err(e) = self.sync() {
            tracing::warn!("Failed to sync logs before exit: {}", e);
        }
        self.terminator.terminate(FATAL_EXIT_CODE);
    }

    /// Emit with an explicit caller location
    pub fn emit_at(
        &self,
        level: Level,
        location: &'static Location<'static>,
        message: &str,
        fields: &[Field],
    ) -> Result<usize> {
        if !self.enabled(level) {
            return Ok(0);
        }

        let mut record = Record::now(self.local_time, level, location, message);
        record.context = self.context.as_ref();
        record.fields = fields;
        if self.stacktrace && level >= Level::Error {
            record.stack = Some(Backtrace::force_capture());
        }

        let line = self.encoder.encode(&record);
        if self.console {
            self.mirror_to_console(level, &line);
        }

        Ok(self.sink.write_record(&line)?)
    }

    /// Flush buffered bytes to stable storage
    pub fn sync(&self) -> Result<()> {
        Ok(self.sink.sync()?)
    }

    fn mirror_to_console(&self, level: Level, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let tag = level.as_tag();
        let colored_tag = match level {
            Level::Debug => tag.dimmed(),
            Level::Info => tag.green(),
            Level::Warn => tag.yellow(),
            Level::Error => tag.red(),
            Level::Fatal => tag.red().bold(),
        };
        eprint!("{}", line.replacen(tag, &colored_tag.to_string(), 1));
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("local_time", &self.local_time)
            .field("stacktrace", &self.stacktrace)
            .field("console", &self.console)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Logger`] over any sink
pub struct LoggerBuilder {
    sink: Arc<dyn LogSink>,
    level: Level,
    local_time: bool,
    stacktrace: bool,
    console: bool,
    context: Vec<Field>,
    terminator: Arc<dyn Terminator>,
}

impl LoggerBuilder {
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
            level: Level::Info,
            local_time: true,
            stacktrace: true,
            console: false,
            context: Vec::new(),
            terminator: Arc::new(ProcessExit),
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub fn stacktrace(mut self, stacktrace: bool) -> Self {
        self.stacktrace = stacktrace;
        self
    }

    pub fn console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn fields(mut self, fields: &[Field]) -> Self {
        self.context.extend_from_slice(fields);
        self
    }

    pub fn terminator<T: Terminator + 'static>(mut self, terminator: T) -> Self {
        self.terminator = Arc::new(terminator);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            sink: self.sink,
            level: self.level,
            encoder: Encoder,
            local_time: self.local_time,
            stacktrace: self.stacktrace,
            console: self.console,
            context: self.context.into(),
            terminator: self.terminator,
        }
    }
}
