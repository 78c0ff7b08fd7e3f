//! Configuration file support
//!
//! Loads settings from ~/.hlbuffer.conf (or %USERPROFILE%\.hlbuffer.conf on Windows)
//!
//! Format: simple key=value pairs, one per line
//! Lines starting with # are comments
//!
//! Example:
//! ```text
//! # hlbuffer configuration
//! max-dynamic-contexts = 1024
//! dynamic-reset-delay-ms = 30000
//! tab-width = 4
//! fold-lookahead = 0
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Initial limit on live dynamic contexts before a buffer asks for a reset
pub const DEFAULT_MAX_DYNAMIC_CONTEXTS: usize = 512;

/// Minimum time between two global dynamic-context resets
pub const DEFAULT_DYNAMIC_RESET_DELAY: Duration = Duration::from_secs(30);

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Starting value of a buffer's dynamic context limit
    pub max_dynamic_contexts: usize,
    /// Resets requested sooner than this after the last one are refused
    pub dynamic_reset_delay: Duration,
    /// Tab width, only relevant for indentation based folding
    pub tab_width: usize,
    /// Extra lines highlighted ahead of each line the folding scan visits
    pub fold_lookahead: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dynamic_contexts: DEFAULT_MAX_DYNAMIC_CONTEXTS,
            dynamic_reset_delay: DEFAULT_DYNAMIC_RESET_DELAY,
            tab_width: 8,
            fold_lookahead: 0,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".hlbuffer.conf"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".hlbuffer.conf"))
        }
    }

    /// Load configuration from file, falling back to defaults on any problem
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };

        let Ok(contents) = fs::read_to_string(&path) else {
            return Config::default();
        };

        match Self::from_contents(&contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring config file");
                Config::default()
            }
        }
    }

    /// Build a configuration from config file contents
    pub fn from_contents(contents: &str) -> Result<Self> {
        let mut config = Config::default();
        config.apply(&Self::parse(contents))?;
        Ok(config)
    }

    /// Parse config file contents into key-value pairs
    fn parse(contents: &str) -> HashMap<String, String> {
        let mut settings = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim().to_string();
                settings.insert(key, value);
            }
        }

        settings
    }

    /// Apply settings from parsed config
    fn apply(&mut self, settings: &HashMap<String, String>) -> Result<()> {
        if let Some(value) = settings.get("max-dynamic-contexts") {
            self.max_dynamic_contexts = parse_number("max-dynamic-contexts", value)?.max(1);
        }

        if let Some(value) = settings.get("dynamic-reset-delay-ms") {
            let ms = parse_number("dynamic-reset-delay-ms", value)?;
            self.dynamic_reset_delay = Duration::from_millis(ms as u64);
        }

        if let Some(value) = settings.get("tab-width") {
            self.tab_width = parse_number("tab-width", value)?.clamp(1, 16);
        }

        if let Some(value) = settings.get("fold-lookahead") {
            self.fold_lookahead = parse_number("fold-lookahead", value)?;
        }

        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| Error::Config {
        key: key.to_string(),
        value: value.to_string(),
    })
}
