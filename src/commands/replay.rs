//! Replay the synthesized speech of a previous session.

use crate::config;
use crate::playback::{AudioPlayer, SystemPlayer};
use crate::recording::SessionStore;
use anyhow::anyhow;

/// Plays back the synthesized speech of a previous session through the
/// system audio player.
///
/// # Arguments
/// * `recording_index` - 1 = most recent, 2 = second most recent, etc.
pub async fn handle_replay(recording_index: Option<usize>) -> Result<(), anyhow::Error> {
    tracing::info!("=== ovt Replay Command ===");

    let data_dir = config::data_dir()?;
    let store = SessionStore::new(&data_dir)?;
    let records = store.all()?;

    if records.is_empty() {
        return Err(anyhow!("No recordings found in history"));
    }

    let index = recording_index.unwrap_or(1);
    if index < 1 || index > records.len() {
        return Err(anyhow!(
            "Recording index out of range. Available recordings: 1-{}",
            records.len()
        ));
    }

    let record = &records[index - 1];
    let speech_path = record.speech_path.as_ref().ok_or_else(|| {
        anyhow!(
            "Recording #{index} has no synthesized speech yet. Run 'ovt retry {index}' to translate it first."
        )
    })?;

    if !speech_path.exists() {
        return Err(anyhow!(
            "Speech file not found: {}",
            speech_path.display()
        ));
    }

    tracing::info!(
        "Playing speech of session #{} from {}",
        index,
        record.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    SystemPlayer::blocking().play(speech_path)?;

    tracing::info!("Playback finished for session #{}", index);
    Ok(())
}
