//! Interactive translation session.
//!
//! Runs the session screen: Space toggles recording, stopping ships the
//! audio to the translation endpoint while a spinner runs, and the result is
//! rendered and spoken. The session can also be toggled externally via
//! SIGUSR1. Each failure is terminal for its attempt; the user records again.

use crate::clipboard::copy_to_clipboard;
use crate::config::{self, OvtConfig};
use crate::history::HistoryManager;
use crate::playback::{save_speech, SystemPlayer};
use crate::recording::{audio, AudioRecorder, SessionRecord, SessionScreen, SessionStore, UiCommand};
use crate::session::{CapturedAudio, CompletedTranslation, Session, ToggleOutcome};
use crate::translation::{language, TranslatorClient};
use crate::ui::ErrorScreen;
use anyhow::anyhow;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs the interactive translation session.
///
/// # Errors
/// - If configuration cannot be loaded
/// - If the terminal UI cannot be initialized
pub async fn handle_record(copy: bool) -> Result<(), anyhow::Error> {
    tracing::info!("=== ovt Translation Session Started ===");

    let config_data = match OvtConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/ovt/ovt.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, endpoint={}, target_lang={}",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.translation.endpoint,
        config_data.translation.target_lang
    );

    let target_lang = language::find(&config_data.translation.target_lang)
        .ok_or_else(|| anyhow!("unsupported target language in config"))?;

    let data_dir = config::data_dir()?;
    let store = SessionStore::new(&data_dir)?;

    let recorder = AudioRecorder::new(
        config_data.audio.sample_rate,
        config_data.audio.device.clone(),
    );
    let mut session = Session::new(
        Box::new(recorder),
        Box::new(SystemPlayer::detached()),
        target_lang,
    );

    let mut screen =
        SessionScreen::new().map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    // SIGUSR1 acts as an external record toggle
    let external_toggle = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&external_toggle))
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let copy_enabled = copy || config_data.translation.copy_to_clipboard;
    let endpoint = config_data.translation.endpoint.clone();

    tracing::debug!("Entering session loop. Space toggles recording, 'q' quits.");

    loop {
        screen
            .render(&session)
            .map_err(|e| anyhow!("Render failed: {e}"))?;

        let mut command = screen.handle_input()?;
        if external_toggle.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: toggling recording");
            command = UiCommand::Toggle;
        }

        match command {
            UiCommand::Continue => {}
            UiCommand::Quit => {
                // Make sure a live microphone stream never outlives the loop
                session.abort_recording();
                break;
            }
            UiCommand::CycleLanguage => {
                session.set_target_lang(language::next_after(session.target_lang()));
            }
            UiCommand::Replay => {
                session.replay();
            }
            UiCommand::Toggle => {
                if let ToggleOutcome::Stopped(captured) = session.toggle() {
                    run_translation(
                        &mut session,
                        &mut screen,
                        &endpoint,
                        &store,
                        &data_dir,
                        captured,
                        copy_enabled,
                    )
                    .await?;
                }
            }
        }
    }

    screen
        .cleanup()
        .map_err(|e| anyhow!("Cleanup failed: {e}"))?;

    tracing::info!("=== ovt Translation Session Exited ===");
    Ok(())
}

/// Ships one recording to the endpoint and applies the outcome to the session.
///
/// The WAV is persisted before the request so `ovt retry` works even when the
/// endpoint is down. While the request is in flight the spinner keeps running
/// and input keeps flowing through the state machine, which ignores toggles
/// until the outcome lands.
async fn run_translation(
    session: &mut Session,
    screen: &mut SessionScreen,
    endpoint: &str,
    store: &SessionStore,
    data_dir: &Path,
    captured: CapturedAudio,
    copy_enabled: bool,
) -> Result<(), anyhow::Error> {
    // The language is fixed at request time; changing the selector mid-flight
    // only affects the next session.
    let lang_code = session.target_lang().code;

    let wav = match audio::encode_wav(&captured.samples, captured.sample_rate) {
        Ok(wav) => wav,
        Err(e) => {
            session.finish(Err(e));
            return Ok(());
        }
    };

    let recordings_dir = data_dir.join("recordings");
    std::fs::create_dir_all(&recordings_dir)?;
    let mut record = SessionRecord::new(&recordings_dir, lang_code);

    if let Err(e) = audio::write_wav(&record.audio_path, &wav) {
        // The upload still has the bytes; only retry is lost
        tracing::warn!("Failed to persist recording: {e}");
    } else if let Err(e) = store.save(&record) {
        tracing::warn!("Failed to save session record: {e}");
    }

    let task_endpoint = endpoint.to_string();
    let task_lang = lang_code.to_string();
    let translation_handle = tokio::spawn(async move {
        TranslatorClient::new(task_endpoint)
            .translate(wav, &task_lang)
            .await
    });

    loop {
        screen
            .render(session)
            .map_err(|e| anyhow!("Render failed: {e}"))?;

        // Keys still dispatch; the state machine ignores toggles while
        // Processing, so no second request can start.
        match screen.handle_input()? {
            UiCommand::Toggle => {
                let _ = session.toggle();
            }
            UiCommand::CycleLanguage => {
                session.set_target_lang(language::next_after(session.target_lang()));
            }
            _ => {}
        }

        if translation_handle.is_finished() {
            break;
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    let outcome = match translation_handle.await {
        Ok(Ok(translation)) => match save_speech(data_dir, &record.id, &translation.speech) {
            Ok(speech_path) => {
                record.speech_path = Some(speech_path.clone());
                if let Err(e) = store.update(&record) {
                    tracing::warn!("Failed to update session record: {e}");
                }

                let mut history = HistoryManager::new(data_dir)?;
                if let Err(e) = history.save_translation(
                    &translation.original_text,
                    &translation.translated_text,
                    lang_code,
                ) {
                    tracing::warn!("Failed to save translation to history: {e}");
                }

                if copy_enabled {
                    if let Err(e) = copy_to_clipboard(&translation.translated_text) {
                        tracing::warn!("Failed to copy to clipboard: {e}");
                    }
                }

                Ok(CompletedTranslation {
                    original_text: translation.original_text,
                    translated_text: translation.translated_text,
                    speech_path,
                })
            }
            Err(e) => Err(anyhow!("Failed to store synthesized speech: {e}")),
        },
        Ok(Err(e)) => Err(e),
        Err(e) => Err(anyhow!("Translation task failed: {e}")),
    };

    session.finish(outcome);
    Ok(())
}
