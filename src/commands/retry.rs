//! Re-translate a previous recording without re-recording audio.
//!
//! Useful when the endpoint was down, or to translate the same recording
//! into a different target language.

use crate::clipboard::copy_to_clipboard;
use crate::config::{self, OvtConfig};
use crate::history::HistoryManager;
use crate::playback::{save_speech, AudioPlayer, SystemPlayer};
use crate::recording::SessionStore;
use crate::translation::{language, TranslatorClient};
use anyhow::anyhow;

/// Retries translation of a previous recording.
///
/// # Arguments
/// * `recording_index` - 1 = most recent, 2 = second most recent, etc.
/// * `lang` - Target language override; defaults to the configured one
/// * `copy` - Copy the translated text to the clipboard
pub async fn handle_retry(
    recording_index: Option<usize>,
    lang: Option<String>,
    copy: bool,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== ovt Retry Command ===");

    let config_data = OvtConfig::load()?;

    let target_code = lang.unwrap_or_else(|| config_data.translation.target_lang.clone());
    let target = language::find(&target_code).ok_or_else(|| {
        anyhow!("unsupported target language '{target_code}'. Run 'ovt languages' for the supported codes.")
    })?;

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

    let mut record = records[index - 1].clone();

    if !record.audio_path.exists() {
        return Err(anyhow!(
            "Audio file not found: {}",
            record.audio_path.display()
        ));
    }

    tracing::info!(
        "Retrying translation of recording #{} to {}",
        index,
        target.code
    );

    let wav = std::fs::read(&record.audio_path)?;
    println!("Translating recording #{index} to {}...", target.name);

    let client = TranslatorClient::new(config_data.translation.endpoint.clone());
    let translation = client.translate(wav, target.code).await?;

    let speech_path = save_speech(&data_dir, &record.id, &translation.speech)?;
    record.speech_path = Some(speech_path.clone());
    record.target_lang = target.code.to_string();
    if let Err(e) = store.update(&record) {
        tracing::warn!("Failed to update session record: {e}");
    }

    let mut history = HistoryManager::new(&data_dir)?;
    if let Err(e) = history.save_translation(
        &translation.original_text,
        &translation.translated_text,
        target.code,
    ) {
        tracing::warn!("Failed to save translation to history: {e}");
    }

    println!();
    println!("Original:   {}", translation.original_text);
    println!("Translated: {}", translation.translated_text);

    if copy {
        if let Err(e) = copy_to_clipboard(&translation.translated_text) {
            tracing::warn!("Failed to copy to clipboard: {e}");
        }
    }

    if let Err(e) = SystemPlayer::blocking().play(&speech_path) {
        tracing::warn!("Speech playback failed: {e}");
        eprintln!("Warning: could not play synthesized speech: {e}");
    }

    Ok(())
}
