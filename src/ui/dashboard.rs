use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::core::app::App;
use crate::core::persona::Persona;
use crate::ui::theme::Theme;

const CREATE_CARD_TITLE: &str = "+ Create Custom Persona";

fn persona_card(persona: &Persona, theme: &Theme) -> ListItem<'static> {
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(persona.name.clone(), theme.title_style),
            Span::styled(format!("  [{}]", persona.category), theme.muted_text_style),
        ]),
        Line::from(Span::styled(
            persona.description.clone(),
            theme.assistant_text_style,
        )),
        Line::default(),
    ])
}

/// One card per dashboard entry, the create card first.
pub fn dashboard_items(app: &App) -> Vec<ListItem<'static>> {
    let theme = &app.ui.theme;
    let mut items = vec![ListItem::new(vec![
        Line::from(Span::styled(CREATE_CARD_TITLE, theme.title_style)),
        Line::from(Span::styled(
            "Design your own AI companion",
            theme.muted_text_style,
        )),
        Line::default(),
    ])];
    items.extend(
        app.personas
            .list()
            .iter()
            .map(|persona| persona_card(persona, theme)),
    );
    items
}

pub fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.ui.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled("Choose your companion", theme.md_h1)),
        Line::from(Span::styled(
            "Select a persona to start chatting, or create your own.",
            theme.muted_text_style,
        )),
    ]);
    f.render_widget(header, chunks[0]);

    let list = List::new(dashboard_items(app))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(theme.border_style),
        )
        .highlight_style(theme.selection_style)
        .highlight_symbol("▌ ");
    let mut state = ListState::default().with_selected(Some(app.ui.dashboard_cursor));
    f.render_stateful_widget(list, chunks[1], &mut state);

    let hints = Paragraph::new(Line::from(Span::styled(
        "↑/↓ choose · Enter open · Ctrl+N new persona · Ctrl+C quit",
        theme.system_text_style,
    )))
    .style(Style::default().bg(theme.background_color));
    f.render_widget(hints, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn create_card_comes_first() {
        let app = create_test_app();
        let items = dashboard_items(&app);
        assert_eq!(items.len(), app.dashboard_len());
        assert_eq!(items[0].height(), 3);
    }
}
