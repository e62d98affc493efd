use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::network::{DEFAULT_PORT, DEFAULT_SEND_TIMEOUT_SECS};
use crate::constants::transport::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_QUEUE_CAPACITY};
use crate::export::default_backup_path;
use crate::transport::TransportConfig;

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Loopback port of the companion listener
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bound on one connect + write + close
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Deliveries allowed in flight at once
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Payloads buffered while all delivery slots are busy
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Rewrite the backup text file after every event
    #[serde(default = "default_export_on_event")]
    pub export_on_event: bool,

    /// Backup file location; `None` uses the platform data dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_path: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_send_timeout_secs() -> u64 {
    DEFAULT_SEND_TIMEOUT_SECS
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_export_on_event() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port(),
            send_timeout_secs: default_send_timeout_secs(),
            max_in_flight: default_max_in_flight(),
            queue_capacity: default_queue_capacity(),
            export_on_event: default_export_on_event(),
            export_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Missing file means defaults; a file that does not parse is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON from {:?}", path))?;

        settings.validate_and_clamp();
        info!(path = %path.display(), port = settings.port, "Loaded config");
        Ok(settings)
    }

    /// Correct out-of-range values in place
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if self.port == 0 {
            warn!(using = default_port(), "port 0 is not a valid endpoint, using default");
            self.port = default_port();
        }

        if self.send_timeout_secs == 0 {
            warn!(using = default_send_timeout_secs(), "send_timeout_secs is 0, using default");
            self.send_timeout_secs = default_send_timeout_secs();
        } else if self.send_timeout_secs > MAX_SEND_TIMEOUT_SECS {
            warn!(send_timeout_secs = self.send_timeout_secs, max = MAX_SEND_TIMEOUT_SECS, "send_timeout_secs exceeds maximum, clamping");
            self.send_timeout_secs = MAX_SEND_TIMEOUT_SECS;
        }

        if self.max_in_flight == 0 {
            warn!("max_in_flight is 0, allowing one delivery at a time");
            self.max_in_flight = 1;
        } else if self.max_in_flight > MAX_IN_FLIGHT {
            warn!(max_in_flight = self.max_in_flight, max = MAX_IN_FLIGHT, "max_in_flight exceeds maximum, clamping");
            self.max_in_flight = MAX_IN_FLIGHT;
        }

        if self.queue_capacity == 0 {
            warn!("queue_capacity is 0, buffering one payload");
            self.queue_capacity = 1;
        } else if self.queue_capacity > MAX_QUEUE_CAPACITY {
            warn!(queue_capacity = self.queue_capacity, max = MAX_QUEUE_CAPACITY, "queue_capacity exceeds maximum, clamping");
            self.queue_capacity = MAX_QUEUE_CAPACITY;
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            port: self.port,
            send_timeout: Duration::from_secs(self.send_timeout_secs),
            max_in_flight: self.max_in_flight,
            queue_capacity: self.queue_capacity,
        }
    }

    /// Backup file path if exporting on events is enabled
    pub fn event_export_path(&self) -> Option<PathBuf> {
        self.export_on_event.then(|| self.backup_path())
    }

    pub fn backup_path(&self) -> PathBuf {
        self.export_path.clone().unwrap_or_else(default_backup_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::validation::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.port, 5173);
        assert_eq!(settings.send_timeout_secs, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "port": 6000, "export_on_event": false }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.port, 6000);
        assert!(!settings.export_on_event);
        assert_eq!(settings.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        assert_eq!(settings.event_export_path(), None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ port: ").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config JSON"));
    }

    #[test]
    fn test_validate_and_clamp_zero_values() {
        let mut settings = Settings {
            port: 0,
            send_timeout_secs: 0,
            max_in_flight: 0,
            queue_capacity: 0,
            ..Settings::default()
        };
        settings.validate_and_clamp();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.send_timeout_secs, DEFAULT_SEND_TIMEOUT_SECS);
        assert_eq!(settings.max_in_flight, 1);
        assert_eq!(settings.queue_capacity, 1);
    }

    #[test]
    fn test_validate_and_clamp_upper_bounds() {
        let mut settings = Settings {
            send_timeout_secs: 3600,
            max_in_flight: 10_000,
            queue_capacity: 1_000_000,
            ..Settings::default()
        };
        settings.validate_and_clamp();
        assert_eq!(settings.send_timeout_secs, MAX_SEND_TIMEOUT_SECS);
        assert_eq!(settings.max_in_flight, MAX_IN_FLIGHT);
        assert_eq!(settings.queue_capacity, MAX_QUEUE_CAPACITY);
    }

    #[test]
    fn test_transport_config_and_export_path() {
        let settings = Settings {
            port: 7000,
            send_timeout_secs: 2,
            export_path: Some(PathBuf::from("/tmp/lights.txt")),
            ..Settings::default()
        };
        let transport = settings.transport_config();
        assert_eq!(transport.port, 7000);
        assert_eq!(transport.send_timeout, Duration::from_secs(2));
        assert_eq!(transport.endpoint().to_string(), "127.0.0.1:7000");
        assert_eq!(settings.event_export_path(), Some(PathBuf::from("/tmp/lights.txt")));
    }
}
