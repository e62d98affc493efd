//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Delivery endpoint constants
pub mod network {
    use std::net::Ipv4Addr;

    /// Listeners are always local; the port is the only configurable part
    pub const LOOPBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;

    /// Default port the companion listener accepts snapshots on
    pub const DEFAULT_PORT: u16 = 5173;

    /// Bounded time for one connect + write + close
    pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 5;

    /// How long the receiver waits on a silent sender before dropping it
    pub const RECEIVER_READ_TIMEOUT_SECS: u64 = 10;

    /// Largest payload the receiver will buffer (1 MB)
    pub const MAX_PAYLOAD_SIZE: u64 = 1024 * 1024;
}

/// Delivery worker limits
pub mod transport {
    /// Maximum deliveries in flight at once
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

    /// Payloads waiting for a free delivery slot before new ones are dropped
    pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

    /// Name of the background delivery thread
    pub const WORKER_THREAD_NAME: &str = "light-sync-transport";
}

/// Wire format precision
pub mod wire {
    /// Decimal places for location components (meters)
    pub const LOCATION_PRECISION: usize = 6;

    /// Decimal places for rotation angles (degrees)
    pub const ROTATION_PRECISION: usize = 3;

    /// Decimal places for intensity
    pub const INTENSITY_PRECISION: usize = 6;

    /// Decimal places for spot cone angles (degrees)
    pub const SPOT_ANGLE_PRECISION: usize = 3;
}

/// Backup export file constants
pub mod export {
    /// Directory under the platform data dir holding the backup file
    pub const APP_DIR: &str = "light-sync";

    /// Backup file name
    pub const FILENAME: &str = "Lights.txt";

    /// First header line of the backup file
    pub const HEADER_TITLE: &str = "# LightSync Export File";

    /// Second header line describing the line format
    pub const HEADER_FORMAT: &str =
        "# Format: <Type> <Location> <Rotation> <Intensity> <Color> [InnerAngle OuterAngle]";
}

/// Configuration file constants
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "light-sync";

    /// Config file name
    pub const FILENAME: &str = "config.json";

    /// Environment variable overriding the configured log level
    pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
}

/// Config validation limits
pub mod validation {
    /// Upper bound for the send timeout (seconds)
    pub const MAX_SEND_TIMEOUT_SECS: u64 = 60;

    /// Upper bound for concurrent deliveries
    pub const MAX_IN_FLIGHT: usize = 64;

    /// Upper bound for queued payloads
    pub const MAX_QUEUE_CAPACITY: usize = 1024;
}
