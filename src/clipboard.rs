//! Clipboard integration.
//!
//! Copies translated text to the system clipboard via pbcopy (macOS),
//! wl-copy (Wayland), or xclip (X11). Clipboard failure is never fatal; the
//! translation already rendered.

use std::io::Write;
use std::process::{Command, Stdio};

/// Copies text to the system clipboard through the first available tool.
///
/// # Errors
/// Never returns an error for a missing clipboard tool; that is logged as a
/// warning so the session outcome is unaffected.
pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    let tools: &[(&str, &[&str])] = &[("pbcopy", &[])];
    #[cfg(not(target_os = "macos"))]
    let tools: &[(&str, &[&str])] = &[
        ("wl-copy", &["--type", "text/plain", "--trim-newline"]),
        ("xclip", &["-selection", "clipboard", "-in", "-quiet"]),
    ];

    for (tool, args) in tools {
        if pipe_to(tool, args, text) {
            tracing::debug!("Translated text copied to clipboard via {tool}");
            return Ok(());
        }
    }

    tracing::warn!("No clipboard tool available");
    Ok(())
}

/// Spawns the tool and writes `text` to its stdin. Returns false when the
/// tool is missing or the write fails.
fn pipe_to(tool: &str, args: &[&str], text: &str) -> bool {
    let child = Command::new(tool).args(args).stdin(Stdio::piped()).spawn();

    let Ok(mut child) = child else {
        tracing::debug!("{tool} not found or not executable");
        return false;
    };

    let Some(mut stdin) = child.stdin.take() else {
        return false;
    };

    match write!(stdin, "{text}") {
        Ok(()) => {
            drop(stdin);
            // Give the tool a moment to take ownership of the selection
            std::thread::sleep(std::time::Duration::from_millis(100));
            true
        }
        Err(e) => {
            tracing::warn!("Failed to write to {tool} stdin: {e}");
            false
        }
    }
}
