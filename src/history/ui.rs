//! Interactive terminal UI for browsing translation history.
//!
//! Scrollable list of past translations with keyboard and mouse-wheel
//! navigation; Enter copies the selected translation to the clipboard.

use crate::history::TranslationEntry;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph},
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const TIMESTAMP_FG: Color = Color::Rgb(100, 100, 100);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const HELP_FG: Color = Color::Rgb(100, 100, 100);

/// Interactive viewer over translation history entries.
pub struct HistoryViewer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entries: Vec<TranslationEntry>,
    list_state: ListState,
    notification: Option<(String, Instant)>,
}

impl HistoryViewer {
    /// Creates a viewer and enters the alternate screen.
    pub fn new(entries: Vec<TranslationEntry>) -> Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend)?;

        let mut list_state = ListState::default();
        if !entries.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            terminal,
            entries,
            list_state,
            notification: None,
        })
    }

    /// Runs the viewer loop. Returns the translation the user selected for
    /// copying, if any.
    pub fn run(&mut self) -> Result<Option<String>> {
        if self.entries.is_empty() {
            self.cleanup()?;
            return Ok(None);
        }

        tracing::debug!("History viewer started with {} entries", self.entries.len());

        let mut selected_text: Option<String> = None;

        loop {
            self.draw()?;

            // Leave once the copy notification has been visible for a moment
            if let Some((_, shown_at)) = self.notification {
                if shown_at.elapsed() >= Duration::from_millis(500) {
                    self.notification = None;
                    if selected_text.is_some() {
                        break;
                    }
                }
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Up => self.list_state.select_previous(),
                        KeyCode::Down => self.list_state.select_next(),
                        KeyCode::Enter => {
                            if let Some(idx) = self.list_state.selected() {
                                selected_text =
                                    Some(self.entries[idx].translated_text.clone());
                                self.notification = Some((
                                    "Copied to clipboard!".to_string(),
                                    Instant::now(),
                                ));
                            }
                        }
                        _ => {}
                    },
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        self.cleanup()?;
        Ok(selected_text)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.list_state.select_previous(),
            MouseEventKind::ScrollDown => self.list_state.select_next(),
            _ => {}
        }
    }

    fn draw(&mut self) -> Result<()> {
        let notification = self.notification.clone();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let main_block = Block::default().style(Style::default().fg(FG).bg(BG));
            frame.render_widget(&main_block, area);
            let inner_area = main_block.inner(area);

            let [list_area, footer_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner_area);

            let items: Vec<ListItem> = self
                .entries
                .iter()
                .map(|entry| {
                    let header = Line::from(vec![
                        Span::styled(
                            entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                            Style::default().fg(TIMESTAMP_FG),
                        ),
                        Span::styled(
                            format!("  [{}]", entry.target_lang),
                            Style::default().fg(TIMESTAMP_FG),
                        ),
                    ]);
                    let original =
                        Line::styled(entry.original_text.clone(), Style::default().fg(FG));
                    let translated = Line::styled(
                        format!("  {}", entry.translated_text),
                        Style::default().fg(FG).add_modifier(Modifier::BOLD),
                    );
                    ListItem::new(vec![header, original, translated])
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(" Translation History ")
                        .borders(Borders::ALL),
                )
                .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                .highlight_symbol("> ")
                .highlight_spacing(HighlightSpacing::Always);

            frame.render_stateful_widget(list, list_area, &mut self.list_state);

            let help = Paragraph::new("↑↓ select, ↵ copy translation, esc/q exit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(HELP_FG));
            frame.render_widget(help, footer_area);

            if let Some((message, _)) = notification {
                Self::render_notification(frame, area, &message);
            }
        })?;

        Ok(())
    }

    /// Renders a centered notification modal.
    fn render_notification(frame: &mut Frame, screen_area: Rect, message: &str) {
        let modal_width = (message.len() as u16).saturating_add(4);
        let modal_height = 3;

        let modal_area = Rect {
            x: screen_area.x + (screen_area.width.saturating_sub(modal_width)) / 2,
            y: screen_area.y + (screen_area.height.saturating_sub(modal_height)) / 2,
            width: modal_width.min(screen_area.width),
            height: modal_height,
        };

        let modal_block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Green).fg(Color::Black));
        frame.render_widget(&modal_block, modal_area);

        let inner_area = modal_block.inner(modal_area);
        let text = Paragraph::new(message)
            .style(Style::default().bg(Color::Green).fg(Color::Black))
            .alignment(Alignment::Center);
        frame.render_widget(text, inner_area);
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for HistoryViewer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
