//! Translation history browser command.

use crate::clipboard::copy_to_clipboard;
use crate::config;
use crate::history::{HistoryManager, HistoryViewer};

/// Opens the interactive translation history viewer. A selected entry's
/// translated text is copied to the clipboard.
pub async fn handle_history() -> Result<(), anyhow::Error> {
    tracing::info!("=== ovt History Command ===");

    let data_dir = config::data_dir()?;
    let mut manager = HistoryManager::new(&data_dir)?;
    let entries = manager.get_all_translations()?;

    if entries.is_empty() {
        println!("No translations yet. Run 'ovt' to record one.");
        return Ok(());
    }

    let mut viewer = HistoryViewer::new(entries)?;
    if let Some(text) = viewer.run()? {
        copy_to_clipboard(&text)?;
        tracing::info!("History entry copied to clipboard");
    }

    Ok(())
}
