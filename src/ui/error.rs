//! Full-screen error display.
//!
//! Used for failures outside the session loop (bad configuration, command
//! errors) where the normal status line is not on screen. Shows the message
//! centered on a red background and waits for a key press.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{self, Stdout};

const ERROR_BG: Color = Color::Rgb(217, 48, 37);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Error screen for human-readable error messages.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Enters the alternate screen in raw mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Displays the message until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();

                let backdrop = ratatui::widgets::Block::default()
                    .style(Style::default().bg(ERROR_BG));
                frame.render_widget(backdrop, area);

                let text_width = (area.width * 80) / 100;
                let centered_area = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height / 2,
                    width: text_width,
                    height: area.height / 2,
                };

                let paragraph = Paragraph::new(Line::styled(
                    error_message,
                    Style::default().fg(ERROR_FG).bg(ERROR_BG),
                ))
                .alignment(Alignment::Center)
                .wrap(ratatui::widgets::Wrap { trim: true });

                frame.render_widget(paragraph, centered_area);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
