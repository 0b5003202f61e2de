//! Translation session state machine.
//!
//! A session is one record -> stop -> translate -> render cycle. The
//! controller owns the capture source and the speech player behind traits so
//! the transitions can be exercised without a live microphone or audio output.

use crate::playback::AudioPlayer;
use crate::translation::language::Language;
use std::path::PathBuf;

/// Placeholder shown in the original-text panel when no result is displayed.
pub const ORIGINAL_PLACEHOLDER: &str = "Press Space to start recording...";
/// Placeholder shown in the translated-text panel when no result is displayed.
pub const TRANSLATED_PLACEHOLDER: &str = "Translation will appear here...";

/// The current state of a translation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to start a recording
    Idle,
    /// Actively capturing microphone audio
    Recording,
    /// Recording stopped, translation request in flight
    Processing,
}

/// Mono PCM audio handed from the capture source to the translation step.
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// Microphone capture capability.
///
/// Implementations must clear any previously captured samples on `start` and
/// must release the underlying device on `stop` as well as on drop, so the
/// stream never outlives the Recording state.
pub trait CaptureSource {
    /// Acquires the input device and begins appending samples.
    fn start(&mut self) -> anyhow::Result<()>;
    /// Stops capturing, releases the device, and returns the samples.
    fn stop(&mut self) -> anyhow::Result<CapturedAudio>;
    /// Snapshot of the samples captured so far (for visualization).
    fn samples(&self) -> Vec<i16>;
    /// The capture sample rate in Hz.
    fn sample_rate(&self) -> u32;
}

/// Result of dispatching a toggle to the session.
#[derive(Debug)]
pub enum ToggleOutcome {
    /// Capture started, the session is now Recording
    Started,
    /// Capture stopped, the samples are ready for translation
    Stopped(CapturedAudio),
    /// Capture could not be started or stopped; the status line carries the error
    Failed,
    /// The toggle is disabled while a translation is in flight
    Ignored,
}

/// Status line shown in the UI footer.
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// A finished translation ready to be applied to the session.
#[derive(Debug, Clone)]
pub struct CompletedTranslation {
    pub original_text: String,
    pub translated_text: String,
    /// Synthesized speech already decoded and written to disk
    pub speech_path: PathBuf,
}

/// Controller for one recording/translation cycle at a time.
///
/// Owns all mutable session state; handlers receive it by reference instead of
/// sharing module globals.
pub struct Session {
    state: SessionState,
    capture: Box<dyn CaptureSource>,
    player: Box<dyn AudioPlayer>,
    target_lang: &'static Language,
    status: StatusLine,
    original: String,
    translated: String,
    last_speech: Option<PathBuf>,
}

impl Session {
    pub fn new(
        capture: Box<dyn CaptureSource>,
        player: Box<dyn AudioPlayer>,
        target_lang: &'static Language,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            capture,
            player,
            target_lang,
            status: StatusLine {
                text: format!("Ready to translate to {}", target_lang.name),
                is_error: false,
            },
            original: ORIGINAL_PLACEHOLDER.to_string(),
            translated: TRANSLATED_PLACEHOLDER.to_string(),
            last_speech: None,
        }
    }

    /// Dispatches the record toggle (spacebar, or SIGUSR1 trigger).
    ///
    /// Idle -> Recording when the capture source starts; a start failure
    /// leaves the session Idle with the failure on the status line.
    /// Recording -> Processing hands back the captured samples.
    /// Processing ignores the toggle: a new recording cannot begin while a
    /// translation is in flight.
    pub fn toggle(&mut self) -> ToggleOutcome {
        match self.state {
            SessionState::Idle => match self.capture.start() {
                Ok(()) => {
                    self.state = SessionState::Recording;
                    self.set_status("Recording in progress...", false);
                    self.original = "Listening...".to_string();
                    self.translated = TRANSLATED_PLACEHOLDER.to_string();
                    tracing::info!("Session: Idle -> Recording");
                    ToggleOutcome::Started
                }
                Err(e) => {
                    tracing::warn!("Capture start failed: {e}");
                    self.set_status(
                        &format!("Microphone access denied or unavailable: {e}"),
                        true,
                    );
                    ToggleOutcome::Failed
                }
            },
            SessionState::Recording => match self.capture.stop() {
                Ok(audio) => {
                    self.state = SessionState::Processing;
                    self.set_status("Processing recording...", false);
                    self.original = "Processing...".to_string();
                    self.translated = "Translating...".to_string();
                    tracing::info!(
                        "Session: Recording -> Processing ({} samples at {}Hz)",
                        audio.samples.len(),
                        audio.sample_rate
                    );
                    ToggleOutcome::Stopped(audio)
                }
                Err(e) => {
                    tracing::error!("Capture stop failed: {e}");
                    self.state = SessionState::Idle;
                    self.set_status(&format!("Recording error: {e}"), true);
                    self.reset_panels();
                    ToggleOutcome::Failed
                }
            },
            SessionState::Processing => {
                tracing::debug!("Toggle ignored: translation in flight");
                ToggleOutcome::Ignored
            }
        }
    }

    /// Applies the outcome of the translate call. Processing -> Idle on both
    /// success and error; there is no automatic retry.
    ///
    /// On success the text panels show the result and the synthesized speech
    /// plays once. On error the status line carries the message (for a
    /// service error, the exact string the endpoint returned) and both panels
    /// reset to their placeholders.
    pub fn finish(&mut self, outcome: anyhow::Result<CompletedTranslation>) {
        if self.state != SessionState::Processing {
            tracing::warn!("finish() outside Processing state: {:?}", self.state);
        }
        match outcome {
            Ok(done) => {
                tracing::info!("Translation complete: {}", done.translated_text);
                self.original = done.original_text;
                self.translated = done.translated_text;
                self.set_status("Translation complete", false);
                if let Err(e) = self.player.play(&done.speech_path) {
                    tracing::warn!("Speech playback failed: {e}");
                }
                self.last_speech = Some(done.speech_path);
            }
            Err(e) => {
                tracing::warn!("Translation failed: {e}");
                self.set_status(&e.to_string(), true);
                self.reset_panels();
            }
        }
        self.state = SessionState::Idle;
    }

    /// Replays the last synthesized speech, if any (the speaker affordance).
    pub fn replay(&mut self) {
        if let Some(path) = &self.last_speech {
            tracing::debug!("Replaying {}", path.display());
            if let Err(e) = self.player.play(path) {
                tracing::warn!("Replay failed: {e}");
            }
        }
    }

    /// Changes the target language. Only the status text is touched; the
    /// session state and any in-flight request are unaffected.
    pub fn set_target_lang(&mut self, lang: &'static Language) {
        self.target_lang = lang;
        self.set_status(&format!("Ready to translate to {}", lang.name), false);
        tracing::debug!("Target language changed to {}", lang.code);
    }

    /// Releases the capture device if a recording is in progress. Called on
    /// every exit path out of the session loop.
    pub fn abort_recording(&mut self) {
        if self.state == SessionState::Recording {
            if let Err(e) = self.capture.stop() {
                tracing::warn!("Capture release on exit failed: {e}");
            }
            self.state = SessionState::Idle;
        }
    }

    fn reset_panels(&mut self) {
        self.original = ORIGINAL_PLACEHOLDER.to_string();
        self.translated = TRANSLATED_PLACEHOLDER.to_string();
    }

    fn set_status(&mut self, text: &str, is_error: bool) {
        self.status = StatusLine {
            text: text.to_string(),
            is_error,
        };
    }

    // Accessors for rendering

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn original_text(&self) -> &str {
        &self.original
    }

    pub fn translated_text(&self) -> &str {
        &self.translated
    }

    pub fn target_lang(&self) -> &'static Language {
        self.target_lang
    }

    pub fn has_speech(&self) -> bool {
        self.last_speech.is_some()
    }

    pub fn capture_samples(&self) -> Vec<i16> {
        self.capture.samples()
    }

    pub fn capture_sample_rate(&self) -> u32 {
        self.capture.sample_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::language;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    struct FakeCapture {
        fail_start: bool,
        started: bool,
        samples: Vec<i16>,
    }

    impl FakeCapture {
        fn new(fail_start: bool) -> Self {
            Self {
                fail_start,
                started: false,
                samples: Vec::new(),
            }
        }
    }

    impl CaptureSource for FakeCapture {
        fn start(&mut self) -> anyhow::Result<()> {
            if self.fail_start {
                return Err(anyhow!("device busy"));
            }
            self.samples.clear();
            self.started = true;
            self.samples.extend_from_slice(&[1, 2, 3]);
            Ok(())
        }

        fn stop(&mut self) -> anyhow::Result<CapturedAudio> {
            self.started = false;
            Ok(CapturedAudio {
                samples: self.samples.clone(),
                sample_rate: 16000,
            })
        }

        fn samples(&self) -> Vec<i16> {
            self.samples.clone()
        }

        fn sample_rate(&self) -> u32 {
            16000
        }
    }

    #[derive(Clone)]
    struct FakePlayer {
        plays: Rc<RefCell<Vec<std::path::PathBuf>>>,
    }

    impl FakePlayer {
        fn new() -> Self {
            Self {
                plays: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl AudioPlayer for FakePlayer {
        fn play(&self, path: &Path) -> anyhow::Result<()> {
            self.plays.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn session_with(fail_start: bool) -> (Session, FakePlayer) {
        let player = FakePlayer::new();
        let session = Session::new(
            Box::new(FakeCapture::new(fail_start)),
            Box::new(player.clone()),
            language::find("es").unwrap(),
        );
        (session, player)
    }

    fn completed() -> CompletedTranslation {
        CompletedTranslation {
            original_text: "Hola".to_string(),
            translated_text: "Hello".to_string(),
            speech_path: std::path::PathBuf::from("/tmp/speech.mp3"),
        }
    }

    #[test]
    fn toggle_from_idle_starts_recording() {
        let (mut session, _) = session_with(false);
        assert!(matches!(session.toggle(), ToggleOutcome::Started));
        assert_eq!(session.state(), SessionState::Recording);
        assert!(!session.status().is_error);
    }

    #[test]
    fn start_failure_stays_idle_and_reports_error() {
        let (mut session, _) = session_with(true);
        assert!(matches!(session.toggle(), ToggleOutcome::Failed));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.status().is_error);
        assert!(session.status().text.contains("Microphone access denied"));
    }

    #[test]
    fn stop_moves_to_processing_and_hands_back_samples() {
        let (mut session, _) = session_with(false);
        session.toggle();
        match session.toggle() {
            ToggleOutcome::Stopped(audio) => {
                assert_eq!(audio.samples, vec![1, 2, 3]);
                assert_eq!(audio.sample_rate, 16000);
            }
            other => panic!("expected Stopped, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Processing);
    }

    #[test]
    fn toggle_during_processing_is_ignored() {
        let (mut session, _) = session_with(false);
        session.toggle();
        session.toggle();
        assert!(matches!(session.toggle(), ToggleOutcome::Ignored));
        assert_eq!(session.state(), SessionState::Processing);
    }

    #[test]
    fn successful_translation_renders_and_plays_once() {
        let (mut session, player) = session_with(false);
        session.toggle();
        session.toggle();
        session.finish(Ok(completed()));

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.original_text(), "Hola");
        assert_eq!(session.translated_text(), "Hello");
        assert_eq!(session.status().text, "Translation complete");
        assert_eq!(player.plays.borrow().len(), 1);
    }

    #[test]
    fn service_error_resets_panels_and_shows_message() {
        let (mut session, player) = session_with(false);
        session.toggle();
        session.toggle();
        session.finish(Err(anyhow!("no speech detected")));

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.status().is_error);
        assert_eq!(session.status().text, "no speech detected");
        assert_eq!(session.original_text(), ORIGINAL_PLACEHOLDER);
        assert_eq!(session.translated_text(), TRANSLATED_PLACEHOLDER);
        assert!(player.plays.borrow().is_empty());
    }

    #[test]
    fn replay_plays_last_speech_again() {
        let (mut session, player) = session_with(false);
        session.toggle();
        session.toggle();
        session.finish(Ok(completed()));
        session.replay();
        assert_eq!(player.plays.borrow().len(), 2);
    }

    #[test]
    fn replay_without_speech_is_a_no_op() {
        let (mut session, player) = session_with(false);
        session.replay();
        assert!(player.plays.borrow().is_empty());
    }

    #[test]
    fn language_change_updates_only_the_status() {
        let (mut session, _) = session_with(false);
        session.set_target_lang(language::find("fr").unwrap());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.status().text, "Ready to translate to French");
        assert_eq!(session.target_lang().code, "fr");
        assert_eq!(session.original_text(), ORIGINAL_PLACEHOLDER);
    }

    #[test]
    fn new_recording_replaces_previous_samples() {
        let (mut session, _) = session_with(false);
        session.toggle();
        session.toggle();
        session.finish(Err(anyhow!("transport failure")));
        session.toggle();
        assert_eq!(session.capture_samples(), vec![1, 2, 3]);
        assert_eq!(session.state(), SessionState::Recording);
    }
}
