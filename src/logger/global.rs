//! Process-wide logger.
//!
//! Applications that can pass a [`Logger`] around should do so. This module
//! is the convenience layer on top: one shared instance, created lazily on
//! first use with the default configuration or installed explicitly with
//! [`init`]. Lazy creation happens under the write lock, so concurrent first
//! callers share a single logger and a single open file.

use super::{Field, Level, Logger};
use crate::config::LoggerConfig;
use crate::error::Result;
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL: RwLock<Option<Arc<Logger>>> = RwLock::new(None);

/// Build a logger from `config` (defaults when `None`) and install it,
/// replacing any existing instance.
///
/// # Returns
/// * `Ok(Arc<Logger>)` - The newly installed logger
/// * `Err(RotologError)` - The log directory or file could not be created;
///   the previous instance, if any, stays installed
pub fn init(config: Option<LoggerConfig>) -> Result<Arc<Logger>> {
    let config = config.unwrap_or_default();
    let logger = Logger::new(&config)?;
    Ok(install(logger))
}

/// Install an already built logger, replacing any existing instance.
///
/// The replaced logger is synced after the slot is released.
pub fn install(logger: Logger) -> Arc<Logger> {
    let logger = Arc::new(logger);
    let previous = GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(Arc::clone(&logger));

    if let Some(previous) = previous {
        if let Err(e) = previous.sync() {
            tracing::warn!("Failed to sync replaced logger: {}", e);
        }
    }
    logger
}

/// The installed logger, if any, without initializing one
pub fn current() -> Option<Arc<Logger>> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(Arc::clone)
}

/// The shared logger, initialized with the default configuration on first use.
///
/// Never returns without a usable logger: if default initialization fails
/// the error is printed to stderr and the process exits with status 1.
pub fn get_instance() -> Arc<Logger> {
    if let Some(logger) = current() {
        return logger;
    }

    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(logger) = slot.as_ref() {
        return Arc::clone(logger);
    }

    match Logger::new(&LoggerConfig::default()) {
        Ok(logger) => {
            let logger = Arc::new(logger);
            *slot = Some(Arc::clone(&logger));
            logger
        }
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
            std::process::exit(1);
        }
    }
}

/// Flush the shared logger. A no-op when nothing has been installed yet.
pub fn sync() -> Result<()> {
    match current() {
        Some(logger) => logger.sync(),
        None => Ok(()),
    }
}

/// Guard that syncs the shared logger when dropped, for use at the top of `main`
#[must_use = "the logger is synced when the guard is dropped"]
pub struct SyncGuard {
    _private: (),
}

/// Defer [`sync`] to the end of the current scope
pub fn sync_on_drop() -> SyncGuard {
    SyncGuard { _private: () }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        if let Err(e) = sync() {
            eprintln!("Failed to sync logs: {}", e);
        }
    }
}

#[track_caller]
pub fn debug(message: &str, fields: &[Field]) {
    get_instance().log(Level::Debug, message, fields);
}

#[track_caller]
pub fn info(message: &str, fields: &[Field]) {
    get_instance().log(Level::Info, message, fields);
}

#[track_caller]
pub fn warn(message: &str, fields: &[Field]) {
    get_instance().log(Level::Warn, message, fields);
}

#[track_caller]
pub fn error(message: &str, fields: &[Field]) {
    get_instance().log(Level::Error, message, fields);
}

/// Write a fatal record through the shared logger, then terminate
#[track_caller]
pub fn fatal(message: &str, fields: &[Field]) {
    get_instance().emit_and_terminate(message, fields);
}
