//! Audio recording feature for ovt.
//!
//! Provides microphone capture, WAV encoding, the session screen, and the
//! per-session record store used by retry and replay.

pub mod audio;
pub mod store;
pub mod ui;

pub use audio::AudioRecorder;
pub use store::{SessionRecord, SessionStore};
pub use ui::{SessionScreen, UiCommand};
