use crate::error::RotologError;
use std::fmt;
use std::str::FromStr;

/// Severity of a record, ordered from least to most severe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Resolve a configured level name. Only the exact lowercase names are
    /// recognized; anything else is `Info`.
    pub fn from_config_str(s: &str) -> Level {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .unwrap_or(Level::Info)
    }

    /// Uppercase tag written into each record line
    pub fn as_tag(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Lowercase name as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

/// Lenient parse for command-line input: case-insensitive, accepts `warning`
impl FromStr for Level {
    type Err = RotologError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(RotologError::UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_parse_known_levels() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" error ".parse::<Level>().unwrap(), Level::Error);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert!(matches!(
            "trace".parse::<Level>(),
            Err(RotologError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_config_parse_falls_back_to_info() {
        assert_eq!(Level::from_config_str(""), Level::Info);
        assert_eq!(Level::from_config_str("loud"), Level::Info);
        assert_eq!(Level::from_config_str("debug"), Level::Debug);
        assert_eq!(Level::from_config_str("fatal"), Level::Fatal);
    }

    #[test]
    fn test_config_parse_is_exact() {
        for raw in ["DEBUG", "Warn", "warning", " error ", "Fatal"] {
            assert_eq!(Level::from_config_str(raw), Level::Info, "{:?}", raw);
        }
    }

    #[test]
    fn test_tags() {
        assert_eq!(Level::Error.to_string(), "ERROR");
        assert_eq!(Level::Fatal.as_tag(), "FATAL");
    }
}
