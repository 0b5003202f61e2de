//! Translation history.
//!
//! Persistent storage of completed translations and the interactive viewer
//! over them.

pub mod storage;
pub mod ui;

pub use storage::{HistoryManager, TranslationEntry};
pub use ui::HistoryViewer;
