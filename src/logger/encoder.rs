use super::field::Field;
use super::level::Level;
use chrono::{DateTime, FixedOffset, Local, Utc};
use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::panic::Location;

/// Timestamp layout of every record line, millisecond precision
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A single emission, borrowed for the duration of encoding
pub struct Record<'a> {
    pub time: DateTime<FixedOffset>,
    pub level: Level,
    pub location: &'static Location<'static>,
    pub message: &'a str,
    /// Fields preset on the logger, written before `fields`
    pub context: &'a [Field],
    pub fields: &'a [Field],
    pub stack: Option<Backtrace>,
}

impl<'a> Record<'a> {
    pub fn now(
        local_time: bool,
        level: Level,
        location: &'static Location<'static>,
        message: &'a str,
    ) -> Self {
        let time = if local_time {
            Local::now().fixed_offset()
        } else {
            Utc::now().fixed_offset()
        };

        Self {
            time,
            level,
            location,
            message,
            context: &[],
            fields: &[],
            stack: None,
        }
    }
}

/// Console-style line encoder:
/// `time<TAB>LEVEL<TAB>dir/file.rs:line<TAB>message[<TAB>k=v k=v]`
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder;

impl Encoder {
    pub fn encode(&self, record: &Record<'_>) -> Vec<u8> {
        let mut line = String::with_capacity(96 + record.message.len());

        let _ = write!(line, "{}", record.time.format(TIME_FORMAT));
        line.push('\t');
        line.push_str(record.level.as_tag());
        line.push('\t');
        line.push_str(&short_caller(record.location));
        line.push('\t');
        line.push_str(record.message);

        let mut fields = record.context.iter().chain(record.fields.iter()).peekable();
        if fields.peek().is_some() {
            line.push('\t');
            for (i, field) in fields.enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                let _ = write!(line, "{}", field);
            }
        }

        if let Some(stack) = &record.stack {
            line.push('\n');
            let _ = write!(line, "{}", stack);
            while line.ends_with('\n') {
                line.pop();
            }
        }

        line.push('\n');
        line.into_bytes()
    }
}

/// Trims a caller location down to its last directory and file name
pub fn short_caller(location: &Location<'_>) -> String {
    let file = location.file();
    let mut cut = None;
    let mut seen = 0;
    for (idx, c) in file.char_indices().rev() {
        if c == '/' || c == '\\' {
            seen += 1;
            if seen == 2 {
                cut = Some(idx + 1);
                break;
            }
        }
    }

    let short = match cut {
        Some(idx) => &file[idx..],
        None => file,
    };
    format!("{}:{}", short, location.line())
}
