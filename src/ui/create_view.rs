use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::app::{App, CreationForm, FormField};
use crate::ui::theme::Theme;

fn field_block(field: FormField, form: &CreationForm, theme: &Theme) -> Block<'static> {
    let focused = form.focus() == field;
    let missing = form
        .error()
        .is_some_and(|err| err.missing.contains(&field));
    let border_style = if focused {
        theme.input_border_style.patch(theme.title_style)
    } else if missing {
        theme.error_text_style
    } else {
        theme.border_style
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", field.label()), theme.input_title_style))
}

fn category_line(form: &CreationForm, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled("◀ ", theme.md_list_marker),
        Span::styled(form.category.as_str(), theme.input_text_style),
        Span::styled(" ▶", theme.md_list_marker),
    ])
}

pub fn render_create_form(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.ui.theme;
    let form = &app.form;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled("Create New Persona", theme.md_h1))),
        chunks[0],
    );

    let field_areas = [
        (FormField::Name, chunks[1]),
        (FormField::Category, chunks[2]),
        (FormField::Description, chunks[3]),
        (FormField::Instruction, chunks[4]),
    ];
    for (field, field_area) in field_areas {
        let block = field_block(field, form, theme);
        let paragraph = match form.field_text(field) {
            Some(text) => Paragraph::new(text.to_string())
                .style(theme.input_text_style)
                .wrap(Wrap { trim: false }),
            None => Paragraph::new(category_line(form, theme)),
        };
        f.render_widget(paragraph.block(block), field_area);
    }

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Avatar: ", theme.muted_text_style),
            Span::styled(form.avatar_url.clone(), theme.system_text_style),
        ])),
        chunks[5],
    );

    if let Some(err) = form.error() {
        f.render_widget(
            Paragraph::new(Span::styled(err.to_string(), theme.error_text_style)),
            chunks[6],
        );
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            "Tab next field · ←/→ category · Ctrl+R new avatar · Ctrl+S create · Esc cancel",
            theme.system_text_style,
        )),
        chunks[7],
    );

    // Single-line fields show a cursor after the text.
    let cursor_target = match form.focus() {
        FormField::Name => Some((&form.name, chunks[1])),
        FormField::Description => Some((&form.description, chunks[3])),
        FormField::Category | FormField::Instruction => None,
    };
    if let Some((text, field_area)) = cursor_target {
        let max_x = field_area.width.saturating_sub(2);
        let x = u16::try_from(UnicodeWidthStr::width(text.as_str()))
            .unwrap_or(u16::MAX)
            .min(max_x);
        f.set_cursor_position((field_area.x + 1 + x, field_area.y + 1));
    }
}
