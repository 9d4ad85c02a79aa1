// CLI module - demo and maintenance commands for the rotolog logger

mod output;

use crate::config::LoggerConfig;
use crate::error::{Result, RotologError};
use crate::logger::{global, Field, Level};
use crate::rotation::RotatingWriterBuilder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// rotolog - structured logging with rotating files
#[derive(Parser)]
#[command(name = "rotolog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Logger configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the log directory
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Override the minimum level (debug, info, warn, error, fatal)
    #[arg(short, long, global = true)]
    level: Option<String>,

    /// Mirror records to stderr
    #[arg(long, global = true)]
    console: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a series of sample records
    Demo {
        /// Number of work items to log
        #[arg(short = 'n', long, default_value = "3")]
        count: u32,

        /// Delay between work items in milliseconds
        #[arg(long, default_value = "100")]
        delay_ms: u64,
    },

    /// Emit a single record
    Emit {
        /// Severity of the record
        severity: String,

        /// Message text
        message: String,

        /// Fields in KEY=VALUE format
        #[arg(short, long)]
        field: Vec<String>,
    },

    /// Rotate the active log file now
    Rotate,

    /// List rotated backups of the active log file
    Backups,
}

impl Cli {
    /// Run the CLI application
    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        cli.execute()
    }

    /// Resolve the configuration from file and command-line overrides
    fn resolve_config(&self) -> Result<LoggerConfig> {
        let mut config = match &self.config {
            Some(path) => LoggerConfig::from_file(path)?,
            None => LoggerConfig::default(),
        };

        if let Some(dir) = &self.dir {
            config.log_dir = dir.clone();
        }
        if let Some(level) = &self.level {
            config.log_level = level.clone();
        }
        if self.console {
            config.console = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Execute the parsed command
    fn execute(&self) -> Result<()> {
        let config = self.resolve_config()?;

        match &self.command {
            Commands::Demo { count, delay_ms } => {
                global::init(Some(config))?;
                let _sync = global::sync_on_drop();
                run_demo(*count, Duration::from_millis(*delay_ms));
                Ok(())
            }

            Commands::Emit {
                severity,
                message,
                field,
            } => {
                let level: Level = severity.parse()?;
                let fields = parse_fields(field)?;

                let logger = global::init(Some(config))?;
                let _sync = global::sync_on_drop();
                if level == Level::Fatal {
                    logger.emit_and_terminate(message, &fields);
                } else {
                    logger.try_emit(level, message, &fields)?;
                }
                Ok(())
            }

            Commands::Rotate => {
                let writer = RotatingWriterBuilder::from_config(&config).build()?;
                writer.rotate()?;
                writer.sync()?;
                output::print_rotated(writer.path());
                Ok(())
            }

            Commands::Backups => {
                let writer = RotatingWriterBuilder::from_config(&config).build()?;
                output::print_backups(writer.path(), &writer.backups()?);
                Ok(())
            }
        }
    }
}

fn run_demo(count: u32, delay: Duration) {
    crate::info!(
        "Application started",
        version = env!("CARGO_PKG_VERSION"),
        start_time = chrono::Local::now(),
    );

    crate::debug!("This is a debug message");
    crate::info!("This is an info message");
    crate::warn!("This is a warning message");
    crate::error!("This is an error message");

    for item_id in 1..=count {
        crate::info!("Processing item", item_id = item_id);
        std::thread::sleep(delay);
    }

    crate::info!("Demo finished", items = count);
}

/// Parse record fields from KEY=VALUE format. Integer, float and boolean
/// values keep their type; anything else is a string.
fn parse_fields(fields: &[String]) -> Result<Vec<Field>> {
    fields
        .iter()
        .map(|raw| {
            let (key, value) = raw.split_once('=').ok_or_else(|| {
                RotologError::ConfigError(format!(
                    "Invalid field format: '{}'. Expected KEY=VALUE",
                    raw
                ))
            })?;

            let field = if let Ok(v) = value.parse::<i64>() {
                Field::int(key, v)
            } else if let Ok(v) = value.parse::<f64>() {
                Field::float(key, v)
            } else if let Ok(v) = value.parse::<bool>() {
                Field::bool(key, v)
            } else {
                Field::str(key, value)
            };
            Ok(field)
        })
        .collect()
}
