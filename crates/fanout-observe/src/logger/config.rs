use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use serde::{Deserialize, Serialize};

use crate::logger::{error::LoggerError, format::LoggerFormat};

/// Filter directives, e.g. `info` or `info,fanout.core=debug`.
pub const ENV_LOG: &str = "FANOUT_LOG";
/// One of `text`, `json`, `journald`.
pub const ENV_LOG_FORMAT: &str = "FANOUT_LOG_FORMAT";

/// HTTP client internals that drown out task logs at `debug`; kept at `warn` unless the level
/// names them explicitly.
const QUIET_TARGETS: &[&str] = &["reqwest", "hyper_util", "hyper"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: String,
    pub with_targets: bool,
    /// Print the OS thread name, which tells pool workers and runtime carriers apart.
    pub with_thread_names: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            with_thread_names: true,
            use_color,
        }
    }
}

impl LoggerConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        self.format = format;
        self
    }

    /// Filter directives actually installed: `level` plus `warn` for noisy HTTP internals.
    pub fn directives(&self) -> String {
        let level = self.level.trim();
        let mut out = if level.is_empty() { "info".to_string() } else { level.to_string() };
        for target in QUIET_TARGETS {
            let named = level.split(',').any(|d| {
                let t = d.trim().split(['=', '[']).next().unwrap_or_default();
                t == *target || t.starts_with(&format!("{target}::"))
            });
            if !named {
                out.push_str(&format!(",{target}=warn"));
            }
        }
        out
    }

    pub(crate) fn filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(self.directives()).map_err(|_| LoggerError::InvalidLogLevel(self.level.clone()))
    }

    /// Defaults overridden by [`ENV_LOG`] and [`ENV_LOG_FORMAT`] when set.
    pub fn from_env() -> Result<Self, LoggerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, LoggerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(level) = lookup(ENV_LOG).filter(|s| !s.trim().is_empty()) {
            cfg.level = level.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT).filter(|s| !s.trim().is_empty()) {
            cfg.format = raw.parse()?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn env_overrides_defaults() {
        let cfg = LoggerConfig::from_lookup(lookup(&[
            (ENV_LOG, "debug,fanout.exec=trace"),
            (ENV_LOG_FORMAT, "json"),
        ]))
        .unwrap();
        assert_eq!(cfg.level, "debug,fanout.exec=trace");
        assert_eq!(cfg.format, LoggerFormat::Json);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let cfg = LoggerConfig::from_lookup(lookup(&[(ENV_LOG, "  "), (ENV_LOG_FORMAT, "")])).unwrap();
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.format, LoggerFormat::Text);
    }

    #[test]
    fn bad_format_is_an_error() {
        let err = LoggerConfig::from_lookup(lookup(&[(ENV_LOG_FORMAT, "xml")])).unwrap_err();
        assert_eq!(err, LoggerError::InvalidFormat("xml".into()));
    }

    #[test]
    fn http_internals_are_quiet_unless_named() {
        let cfg = LoggerConfig::default().with_level("debug");
        assert_eq!(cfg.directives(), "debug,reqwest=warn,hyper_util=warn,hyper=warn");

        let cfg = LoggerConfig::default().with_level("debug,hyper=trace");
        assert_eq!(cfg.directives(), "debug,hyper=trace,reqwest=warn,hyper_util=warn");

        assert_eq!(LoggerConfig::default().with_level(" ").directives().split(',').next(), Some("info"));
    }

    #[test]
    fn invalid_directive_is_rejected() {
        let err = LoggerConfig::default().with_level("fanout=loud").filter().unwrap_err();
        assert_eq!(err, LoggerError::InvalidLogLevel("fanout=loud".into()));
        assert!(LoggerConfig::default().with_level("warn,fanout.core=debug").filter().is_ok());
    }

    #[test]
    fn deserializes_partial_documents() {
        let cfg: LoggerConfig = serde_json::from_str(r#"{"format":"json","withTargets":false}"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert!(!cfg.with_targets);
        assert!(cfg.with_thread_names);
        assert_eq!(cfg.level, "info");
    }
}
