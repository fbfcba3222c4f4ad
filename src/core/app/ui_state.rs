use std::time::Instant;

use ratatui::style::Style;
use tui_textarea::{CursorMove, TextArea};

use crate::core::config::Config;
use crate::ui::theme::Theme;

/// Presentation state that is not part of the persisted model.
pub struct UiState {
    pub theme: Theme,
    pub markdown_enabled: bool,
    /// Selected card on the dashboard. Index 0 is the "create" card.
    pub dashboard_cursor: usize,
    /// Lines scrolled up from the bottom of the chat transcript.
    pub chat_scroll: u16,
    pub exit_requested: bool,
    pub pulse_start: Instant,
    textarea: TextArea<'static>,
}

impl UiState {
    pub fn new(theme: Theme, markdown_enabled: bool) -> Self {
        let mut ui = Self {
            theme,
            markdown_enabled,
            dashboard_cursor: 0,
            chat_scroll: 0,
            exit_requested: false,
            pulse_start: Instant::now(),
            textarea: TextArea::default(),
        };
        ui.configure_textarea();
        ui
    }

    pub(crate) fn from_config(config: &Config) -> Self {
        Self::new(Theme::from_choice(config.theme()), config.markdown_enabled())
    }

    pub(crate) fn configure_textarea(&mut self) {
        let textarea_style = self
            .theme
            .input_text_style
            .patch(Style::default().bg(self.theme.background_color));
        self.textarea.set_style(textarea_style);
        self.textarea.set_cursor_style(self.theme.input_cursor_style);
        self.textarea.set_cursor_line_style(self.theme.input_cursor_line_style);
        self.textarea.set_placeholder_text("Type a message...");
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn textarea_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.textarea
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_input_text(&mut self, text: &str) {
        let lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
        self.configure_textarea();
    }

    /// Return the composed message and empty the input.
    pub fn take_input(&mut self) -> String {
        let text = self.input_text();
        self.set_input_text("");
        text
    }

    pub fn input_line_count(&self) -> usize {
        self.textarea.lines().len().max(1)
    }
}
