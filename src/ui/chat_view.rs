use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::app::{App, TranscriptController};
use crate::core::message::TurnRole;
use crate::ui::layout::prewrap_lines;
use crate::ui::markdown::{render_markdown, render_plain};
use crate::ui::theme::Theme;

const THINKING: &str = "Thinking...";
const MAX_INPUT_LINES: usize = 6;

/// Pulsing glyph shown while a reply is pending, two cycles per second.
pub fn pulse_symbol(elapsed: Duration) -> &'static str {
    let phase = (elapsed.as_millis() % 500) as f32 / 500.0;
    let intensity = if phase < 0.5 { phase * 2.0 } else { 2.0 - phase * 2.0 };
    if intensity < 0.33 {
        "○"
    } else if intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

fn body_lines(text: &str, style: Style, markdown: bool, theme: &Theme) -> Vec<Line<'static>> {
    if markdown {
        render_markdown(text, style, theme)
    } else {
        render_plain(text, style)
    }
}

/// Rendered transcript including the reply being streamed.
pub fn transcript_lines(
    chat: &TranscriptController,
    theme: &Theme,
    markdown: bool,
    pulse: &str,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let persona_name = chat.persona_name().to_string();

    for turn in chat.turns() {
        match turn.role {
            TurnRole::User => {
                lines.push(Line::from(Span::styled("You", theme.user_prefix_style)));
                lines.extend(render_plain(&turn.text, theme.user_text_style));
            }
            TurnRole::Model => {
                lines.push(Line::from(Span::styled(
                    persona_name.clone(),
                    theme.assistant_prefix_style,
                )));
                lines.extend(body_lines(
                    &turn.text,
                    theme.assistant_text_style,
                    markdown,
                    theme,
                ));
            }
        }
        lines.push(Line::default());
    }

    if chat.is_awaiting_reply() {
        lines.push(Line::from(Span::styled(
            persona_name,
            theme.assistant_prefix_style,
        )));
        if chat.buffer().is_empty() {
            lines.push(Line::from(vec![
                Span::styled(format!("{pulse} "), theme.streaming_indicator_style),
                Span::styled(THINKING, theme.system_text_style),
            ]));
        } else {
            lines.extend(body_lines(
                chat.buffer(),
                theme.assistant_text_style,
                markdown,
                theme,
            ));
        }
    }

    lines
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.ui.theme;
    let Some(persona) = app
        .router
        .active_persona_id()
        .and_then(|id| app.personas.find(id))
    else {
        return;
    };
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(persona.name.clone(), theme.md_h1),
            Span::styled(format!("  [{}]", persona.category), theme.muted_text_style),
        ]),
        Line::from(Span::styled(
            persona.description.clone(),
            theme.muted_text_style,
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme.border_style),
    );
    f.render_widget(header, area);
}

pub fn render_chat(f: &mut Frame, area: Rect, app: &mut App) {
    let input_lines = app.ui.input_line_count().min(MAX_INPUT_LINES) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(input_lines + 2),
        ])
        .split(area);

    render_header(f, chunks[0], app);

    let Some(chat) = app.chat.as_ref() else {
        return;
    };
    let theme = app.ui.theme.clone();
    let pulse = pulse_symbol(app.ui.pulse_start.elapsed());
    let lines = transcript_lines(chat, &theme, app.ui.markdown_enabled, pulse);
    let awaiting = chat.is_awaiting_reply();
    let persona_name = chat.persona_name().to_string();

    let transcript_area = chunks[1];
    let lines = prewrap_lines(&lines, transcript_area.width);
    let total = lines.len();
    let visible = usize::from(transcript_area.height);
    let max_scroll = total.saturating_sub(visible);
    let scrolled_up = usize::from(app.ui.chat_scroll).min(max_scroll);
    app.ui.chat_scroll = scrolled_up as u16;
    let offset = u16::try_from(max_scroll - scrolled_up).unwrap_or(u16::MAX);

    let transcript = Paragraph::new(lines).scroll((offset, 0));
    f.render_widget(transcript, transcript_area);

    let title = if awaiting {
        format!(" Waiting for {persona_name}... (Esc home · Ctrl+L clear) ")
    } else {
        format!(" Message {persona_name} (Enter send · Alt+Enter newline · Ctrl+L clear · Esc home) ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .title(Span::styled(title, theme.input_title_style));
    app.ui.textarea_mut().set_block(block);
    f.render_widget(app.ui.textarea(), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Turn;
    use crate::core::persona::{Persona, PersonaCategory};

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn zen_guide() -> Persona {
        Persona {
            id: "2".to_string(),
            name: "Zen Guide".to_string(),
            description: "Mindfulness".to_string(),
            category: PersonaCategory::Wellness,
            system_instruction: "Be calm.".to_string(),
            avatar_url: String::new(),
            is_default: true,
        }
    }

    #[test]
    fn pending_reply_shows_thinking_until_first_fragment() {
        let theme = Theme::dark_default();
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        let params = chat.submit("I feel stressed.", 1).expect("params");

        let lines = texts(&transcript_lines(&chat, &theme, true, "●"));
        assert_eq!(
            lines,
            vec!["You", "I feel stressed.", "", "Zen Guide", "● Thinking..."]
        );

        chat.append_fragment(params.stream_id, "Breathe **deeply**");
        let lines = texts(&transcript_lines(&chat, &theme, true, "●"));
        assert_eq!(lines.last().map(String::as_str), Some("Breathe deeply"));
    }

    #[test]
    fn model_turns_render_markdown_only_when_enabled() {
        let theme = Theme::dark_default();
        let stored = vec![Turn::user("hi"), Turn::model("# Hello")];
        let chat = TranscriptController::new(&zen_guide(), &stored);

        let rendered = texts(&transcript_lines(&chat, &theme, true, "●"));
        assert_eq!(rendered[3], "Zen Guide");
        assert_eq!(rendered[4], "Hello");

        let plain = texts(&transcript_lines(&chat, &theme, false, "●"));
        assert_eq!(plain[4], "# Hello");
    }

    #[test]
    fn pulse_cycles_through_symbols() {
        assert_eq!(pulse_symbol(Duration::from_millis(0)), "○");
        assert_eq!(pulse_symbol(Duration::from_millis(250)), "●");
    }
}
