//! Application command handlers for ovt.
//!
//! One submodule per command.
//!
//! # Commands
//! - `record`: Interactive translation session (default)
//! - `retry`: Re-translate a previous recording
//! - `replay`: Play back the synthesized speech of a previous session
//! - `history`: Translation history browser
//! - `languages`: List supported target languages
//! - `config`: Open configuration file in the user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod history;
pub mod languages;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod replay;
pub mod retry;

pub use config::handle_config;
pub use history::handle_history;
pub use languages::handle_languages;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use replay::handle_replay;
pub use retry::handle_retry;
