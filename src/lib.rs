// Library exports for the rotolog structured logger

mod macros;

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod rotation;

pub use config::LoggerConfig;
pub use error::{Result, RotologError};
pub use logger::{Field, Level, LogSink, Logger, LoggerBuilder, Terminator, Value};
pub use rotation::{RotatingWriter, RotatingWriterBuilder};
