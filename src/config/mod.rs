//! Configuration management for ovt.
//!
//! Handles loading and saving application configuration from a TOML file in
//! the user's config directory, plus the well-known filesystem locations the
//! rest of the application reads from.

pub mod file;

pub use file::{config_path, data_dir, AudioConfig, OvtConfig, TranslationSettings};
