//! Configuration management for LightSync
//!
//! A single JSON settings file under the platform config dir; every field is
//! optional and falls back to the built-in default.

pub mod settings;

pub use settings::Settings;
