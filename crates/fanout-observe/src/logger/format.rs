use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::logger::error::LoggerError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerFormat {
    #[default]
    Text,
    Json,
    Journald,
}

impl LoggerFormat {
    /// Whether this build can actually emit the format.
    pub fn is_available(self) -> bool {
        match self {
            LoggerFormat::Text | LoggerFormat::Json => true,
            LoggerFormat::Journald => cfg!(all(target_os = "linux", feature = "journald")),
        }
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = [LoggerFormat::Text, LoggerFormat::Json, LoggerFormat::Journald]
            .into_iter()
            .find(|f| s.trim().eq_ignore_ascii_case(&f.to_string()))
            .ok_or_else(|| LoggerError::InvalidFormat(s.to_string()))?;

        if format.is_available() {
            Ok(format)
        } else {
            Err(LoggerError::JournaldNotSupported)
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        })
    }
}
