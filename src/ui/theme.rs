use crate::core::config::ThemeChoice;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,
    pub error_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub border_style: Style,
    pub streaming_indicator_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Sidebar and dashboard
    pub category_heading_style: Style,
    pub selection_style: Style,
    pub muted_text_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,

    // Markdown
    pub md_h1: Style,
    pub md_h2: Style,
    pub md_h3: Style,
    pub md_code: Style,
    pub md_blockquote: Style,
    pub md_list_marker: Style,
    pub md_rule: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            system_text_style: Style::default().fg(Color::DarkGray),
            error_text_style: Style::default().fg(Color::LightRed),

            title_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            border_style: Style::default().fg(Color::DarkGray),
            streaming_indicator_style: Style::default().fg(Color::White),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),

            category_heading_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            selection_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            muted_text_style: Style::default().fg(Color::Gray),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),

            md_h1: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            md_h2: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            md_h3: Style::default().add_modifier(Modifier::BOLD),
            md_code: Style::default().fg(Color::Yellow),
            md_blockquote: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            md_list_marker: Style::default().fg(Color::Cyan),
            md_rule: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_prefix_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            system_text_style: Style::default().fg(Color::Gray),
            error_text_style: Style::default().fg(Color::Red),

            title_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            border_style: Style::default().fg(Color::Gray),
            streaming_indicator_style: Style::default().fg(Color::Black),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),

            category_heading_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            selection_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            muted_text_style: Style::default().fg(Color::DarkGray),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),

            md_h1: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            md_h2: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            md_h3: Style::default().add_modifier(Modifier::BOLD),
            md_code: Style::default().fg(Color::Red),
            md_blockquote: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            md_list_marker: Style::default().fg(Color::Blue),
            md_rule: Style::default().fg(Color::Gray),
        }
    }

    pub fn from_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Dark => Self::dark_default(),
            ThemeChoice::Light => Self::light(),
        }
    }

    pub fn md_heading_style(&self, level: u8) -> Style {
        match level {
            1 => self.md_h1,
            2 => self.md_h2,
            _ => self.md_h3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_maps_to_background() {
        assert_eq!(
            Theme::from_choice(ThemeChoice::Light).background_color,
            Color::White
        );
        assert_eq!(
            Theme::from_choice(ThemeChoice::Dark).background_color,
            Color::Black
        );
    }

    #[test]
    fn deep_headings_share_the_h3_style() {
        let theme = Theme::dark_default();
        assert_eq!(theme.md_heading_style(5), theme.md_h3);
        assert_ne!(theme.md_heading_style(1), theme.md_h3);
    }
}
