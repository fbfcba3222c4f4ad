use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::app::{App, View};
use crate::ui::layout::truncate_to_width;

/// Sidebar contents: home, personas grouped by category, and the create
/// entry. The current screen (or open persona) is highlighted.
pub fn sidebar_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    let inner = usize::from(width);
    let view = app.router.view();
    let active = app.router.active_persona_id();

    let entry = |label: String, selected: bool| -> Line<'static> {
        let style = if selected {
            theme.selection_style
        } else {
            theme.muted_text_style
        };
        Line::from(Span::styled(truncate_to_width(&label, inner), style))
    };

    let mut lines = vec![
        entry("⌂ Home".to_string(), view == View::Dashboard),
        Line::default(),
    ];

    for (category, members) in app.personas.grouped_by_category() {
        lines.push(Line::from(Span::styled(
            category.as_str().to_uppercase(),
            theme.category_heading_style,
        )));
        for persona in members {
            let selected = active == Some(persona.id.as_str());
            lines.push(entry(format!("  {}", persona.name), selected));
        }
        lines.push(Line::default());
    }

    lines.push(entry("+ New Persona".to_string(), view == View::Create));
    lines
}

pub fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(app.ui.theme.border_style)
        .title(Span::styled(" Persona Chat ", app.ui.theme.title_style));
    let inner = block.inner(area);
    let lines = sidebar_lines(app, inner.width);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(app.ui.theme.background_color));
    f.render_widget(paragraph, area);
}
