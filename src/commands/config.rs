//! Configuration file editor command.
//!
//! Opens the ovt configuration file in the user's preferred editor.

use crate::config::config_path;
use std::process::Command;

/// Opens the configuration file in $EDITOR, falling back to nano then vi.
///
/// # Errors
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config_path()?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Finds the best available editor: $EDITOR, then nano, then vi.
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        let available = Command::new("which")
            .arg(editor)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);
        if available {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}
