//! Terminal UI for the translation session.
//!
//! Renders the live waveform while recording, a spinner while the translation
//! request is in flight, and the original/translated text panels, with the
//! status line in the footer. Input handling maps keys to session commands;
//! the mapping is a pure function so the spacebar-toggle contract is testable.

use crate::session::{Session, SessionState};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Sparkline, Wrap},
};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

/// dBFS treated as 100% on the volume meter.
const REFERENCE_LEVEL_DB: f32 = -20.0;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const STATUS_OK: Color = Color::Rgb(52, 168, 83);
const STATUS_ERR: Color = Color::Rgb(217, 48, 37);
const HINT_FG: Color = Color::Rgb(100, 100, 100);
const WAVE_FG: Color = Color::Rgb(206, 224, 220);

/// Session command produced by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// No actionable key
    Continue,
    /// Start or stop recording (spacebar / microphone control)
    Toggle,
    /// Cycle the target language
    CycleLanguage,
    /// Replay the last synthesized speech (speaker control)
    Replay,
    /// Leave the session loop
    Quit,
}

/// Maps a key event to a session command.
///
/// Only the initial key-down counts: repeats and releases map to `Continue`,
/// so holding the spacebar does not bounce the recording state.
pub fn map_key(key: KeyEvent) -> UiCommand {
    if key.kind != KeyEventKind::Press {
        return UiCommand::Continue;
    }
    match key.code {
        KeyCode::Char(' ') => UiCommand::Toggle,
        KeyCode::Char('l') => UiCommand::CycleLanguage,
        KeyCode::Char('r') => UiCommand::Replay,
        KeyCode::Char('q') | KeyCode::Esc => UiCommand::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => UiCommand::Quit,
        _ => UiCommand::Continue,
    }
}

/// Full-screen session view.
pub struct SessionScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    volume_history: Vec<u64>,
    last_sample_time: Instant,
    sample_interval: Duration,
    terminal_width: usize,
    last_state: SessionState,
    recording_start: Instant,
    spinner_index: usize,
}

impl SessionScreen {
    /// Enters the alternate screen and raw mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend)?;
        let terminal_width = terminal.size()?.width as usize;

        Ok(Self {
            terminal,
            volume_history: vec![0; terminal_width],
            last_sample_time: Instant::now(),
            sample_interval: Duration::from_millis(50),
            terminal_width,
            last_state: SessionState::Idle,
            recording_start: Instant::now(),
            spinner_index: 0,
        })
    }

    /// Polls for input and maps it to a session command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<UiCommand> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                let command = map_key(key);
                if command != UiCommand::Continue {
                    tracing::debug!("Key {:?} -> {:?}", key.code, command);
                }
                return Ok(command);
            }
        }
        Ok(UiCommand::Continue)
    }

    /// Renders one frame of the session view.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, session: &Session) -> Result<()> {
        let state = session.state();

        if state == SessionState::Recording {
            if self.last_state != SessionState::Recording {
                self.recording_start = Instant::now();
                self.volume_history = vec![0; self.terminal_width];
            }
            if self.last_sample_time.elapsed() >= self.sample_interval {
                let samples = session.capture_samples();
                let volume = calculate_volume(&samples, session.capture_sample_rate());
                self.volume_history.push(volume as u64);
                if self.volume_history.len() > self.terminal_width {
                    self.volume_history.remove(0);
                }
                self.last_sample_time = Instant::now();
            }
        }
        self.last_state = state;
        self.spinner_index = (self.spinner_index + 1) % SPINNER_FRAMES.len();

        let width = self.terminal.size()?.width as usize;
        if width != self.terminal_width {
            self.terminal_width = width;
            self.volume_history.resize(width, 0);
        }

        let status = session.status().clone();
        let original = session.original_text().to_string();
        let translated = session.translated_text().to_string();
        let lang_name = session.target_lang().name;
        let has_speech = session.has_speech();
        let duration = self.recording_start.elapsed();
        let spinner = SPINNER_FRAMES[self.spinner_index];
        let history = self.volume_history.clone();

        self.terminal.draw(|frame| {
            let area = frame.area();
            let [wave_area, original_area, translated_area, footer_area] = Layout::vertical([
                Constraint::Min(4),
                Constraint::Length(5),
                Constraint::Length(5),
                Constraint::Length(1),
            ])
            .areas(area);

            match state {
                SessionState::Processing => {
                    let spin_line = Line::from(vec![
                        Span::styled(spinner, Style::default().fg(WAVE_FG)),
                        Span::raw(format!(" Translating to {lang_name}...")),
                    ]);
                    let spin = Paragraph::new(spin_line).alignment(Alignment::Center);
                    let centered = Rect {
                        x: wave_area.x,
                        y: wave_area.y + wave_area.height / 2,
                        width: wave_area.width,
                        height: 1,
                    };
                    frame.render_widget(spin, centered);
                }
                _ => {
                    let sparkline = Sparkline::default()
                        .data(&history)
                        .max(100)
                        .style(Style::default().bg(Color::Rgb(0, 0, 0)).fg(WAVE_FG));
                    frame.render_widget(sparkline, wave_area);
                }
            }

            let original_panel = Paragraph::new(original)
                .wrap(Wrap { trim: true })
                .block(Block::default().title(" Original ").borders(Borders::ALL));
            frame.render_widget(original_panel, original_area);

            let translated_panel = Paragraph::new(translated)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(format!(" Translated · {lang_name} "))
                        .borders(Borders::ALL),
                );
            frame.render_widget(translated_panel, translated_area);

            let status_style = if status.is_error {
                Style::default().fg(STATUS_ERR)
            } else {
                Style::default().fg(STATUS_OK)
            };

            let mut footer_spans = Vec::new();
            if state == SessionState::Recording {
                let secs = duration.as_secs();
                footer_spans.push(Span::styled("● ", Style::default().fg(Color::Red)));
                footer_spans.push(Span::raw(format!("{}:{:02} ", secs / 60, secs % 60)));
            }
            footer_spans.push(Span::styled(status.text, status_style));
            let mut hints = String::from("  ··  space record · l language");
            if has_speech {
                hints.push_str(" · r replay");
            }
            hints.push_str(" · q quit");
            footer_spans.push(Span::styled(hints, Style::default().fg(HINT_FG)));

            let footer = Paragraph::new(Line::from(footer_spans));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Leaves the alternate screen and restores the terminal.
    ///
    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for SessionScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Converts the most recent ~50ms of samples to a 0-100 volume percentage
/// via RMS and dBFS against the reference level.
fn calculate_volume(samples: &[i16], sample_rate: u32) -> u8 {
    if samples.is_empty() {
        return 0;
    }

    let window = std::cmp::min(sample_rate / 20, samples.len() as u32) as usize;
    let recent = &samples[samples.len() - window..];

    let sum_of_squares: i64 = recent.iter().map(|&x| (x as i64).pow(2)).sum();
    let mean_square = sum_of_squares / recent.len() as i64;
    let rms = (mean_square as f32).sqrt();

    let db_fs = if rms > 0.0 {
        20.0 * (rms / 32767.0).log10()
    } else {
        -160.0
    };

    let min_db = REFERENCE_LEVEL_DB - 40.0;
    ((db_fs - min_db) / 40.0 * 100.0).clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn space_press_toggles_recording() {
        assert_eq!(map_key(press(KeyCode::Char(' '))), UiCommand::Toggle);
    }

    #[test]
    fn space_repeat_is_ignored() {
        let repeat = KeyEvent::new_with_kind(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Repeat,
        );
        assert_eq!(map_key(repeat), UiCommand::Continue);
    }

    #[test]
    fn space_release_is_ignored() {
        let release = KeyEvent::new_with_kind(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(map_key(release), UiCommand::Continue);
    }

    #[test]
    fn quit_keys() {
        assert_eq!(map_key(press(KeyCode::Char('q'))), UiCommand::Quit);
        assert_eq!(map_key(press(KeyCode::Esc)), UiCommand::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), UiCommand::Quit);
    }

    #[test]
    fn language_and_replay_keys() {
        assert_eq!(map_key(press(KeyCode::Char('l'))), UiCommand::CycleLanguage);
        assert_eq!(map_key(press(KeyCode::Char('r'))), UiCommand::Replay);
    }

    #[test]
    fn other_keys_do_nothing() {
        assert_eq!(map_key(press(KeyCode::Char('x'))), UiCommand::Continue);
        assert_eq!(map_key(press(KeyCode::Enter)), UiCommand::Continue);
    }

    #[test]
    fn silence_is_zero_volume() {
        assert_eq!(calculate_volume(&[0; 1600], 16000), 0);
    }

    #[test]
    fn full_scale_is_loud() {
        assert!(calculate_volume(&[i16::MAX; 1600], 16000) >= 99);
    }
}
