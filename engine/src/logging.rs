//! Scoped log filtering on top of `tracing`.
//!
//! A single env var carries a global level plus per-scope overrides, e.g.
//! `SCENEVR_LOG=warn,session=debug,walk=trace`. Frontends call
//! [`init_logging`] once at startup with their own variable name.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use once_cell::sync::Lazy;
pub use tracing::{debug, error, info, trace, warn, Level};

static LOG_CONFIG: OnceLock<LogConfig> = OnceLock::new();
static DEFAULT_CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::default);

#[derive(Debug, Clone)]
pub struct LogConfig {
    global_level: Level,
    scope_levels: HashMap<String, Level>,
}

impl LogConfig {
    pub fn new() -> LogConfig {
        LogConfig {
            global_level: Level::WARN,
            scope_levels: HashMap::new(),
        }
    }

    pub fn from_env(env_var_name: &str) -> LogConfig {
        match std::env::var(env_var_name) {
            Ok(filter) => Self::parse(&filter),
            Err(_) => Self::new(),
        }
    }

    /// Parse `level[,scope=level]...`; unknown level names are skipped.
    fn parse(filter: &str) -> LogConfig {
        let mut config = Self::new();
        for entry in filter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((scope, level)) => {
                    if let Ok(level) = Level::from_str(level.trim()) {
                        config.scope_levels.insert(scope.trim().to_string(), level);
                    }
                }
                None => {
                    if let Ok(level) = Level::from_str(entry) {
                        config.global_level = level;
                    }
                }
            }
        }
        config
    }

    pub fn should_log(&self, scope: &str, level: Level) -> bool {
        let threshold = self.scope_levels.get(scope).unwrap_or(&self.global_level);
        level <= *threshold
    }

    pub fn set_global_level(&mut self, level: Level) {
        self.global_level = level;
    }

    pub fn set_scope_level(&mut self, scope: String, level: Level) {
        self.scope_levels.insert(scope, level);
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_log_config() -> &'static LogConfig {
    LOG_CONFIG.get().unwrap_or(&DEFAULT_CONFIG)
}

/// Install the tracing subscriber and load the scoped config from
/// `env_var_name`. Safe to call more than once; later calls keep the
/// first subscriber.
pub fn init_logging(env_var_name: &str) -> LogConfig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = LogConfig::from_env(env_var_name);
    LOG_CONFIG.set(config.clone()).ok();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_level() {
        let config = LogConfig::parse("debug");
        assert_eq!(config.global_level, Level::DEBUG);
    }

    #[test]
    fn test_parse_scope_levels() {
        let config = LogConfig::parse("warn, session=debug ,teleport=trace");
        assert_eq!(config.global_level, Level::WARN);
        assert_eq!(config.scope_levels.get("session"), Some(&Level::DEBUG));
        assert_eq!(config.scope_levels.get("teleport"), Some(&Level::TRACE));
    }

    #[test]
    fn test_garbage_entries_are_skipped() {
        let config = LogConfig::parse("bogus,walk=nope,info");
        assert_eq!(config.global_level, Level::INFO);
        assert!(config.scope_levels.is_empty());
    }

    #[test]
    fn test_should_log() {
        let mut config = LogConfig::new();
        config.set_global_level(Level::WARN);
        config.set_scope_level("session".to_string(), Level::DEBUG);

        assert!(config.should_log("other", Level::ERROR));
        assert!(!config.should_log("other", Level::INFO));
        assert!(config.should_log("session", Level::DEBUG));
        assert!(!config.should_log("session", Level::TRACE));
    }
}
