use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::core::app::{App, View};
use crate::ui::chat_view::render_chat;
use crate::ui::create_view::render_create_form;
use crate::ui::dashboard::render_dashboard;
use crate::ui::layout::SIDEBAR_WIDTH;
use crate::ui::sidebar::render_sidebar;

pub fn ui(f: &mut Frame, app: &mut App) {
    f.render_widget(
        Block::default().style(Style::default().bg(app.ui.theme.background_color)),
        f.area(),
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(f.area());

    render_sidebar(f, columns[0], app);

    let main = columns[1].inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 0,
    });
    match app.router.view() {
        View::Dashboard => render_dashboard(f, main, app),
        View::Create => render_create_form(f, main, app),
        View::Chat => render_chat(f, main, app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn every_view_draws() {
        let mut app = create_test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");

        terminal.draw(|f| ui(f, &mut app)).expect("dashboard");
        assert!(screen_text(&terminal).contains("Create Custom Persona"));

        app.open_create_form();
        terminal.draw(|f| ui(f, &mut app)).expect("create");
        assert!(screen_text(&terminal).contains("Create New Persona"));

        app.select_persona("2");
        let params = app.submit_message("I feel stressed.").expect("stream");
        terminal.draw(|f| ui(f, &mut app)).expect("chat");
        let text = screen_text(&terminal);
        assert!(text.contains("I feel stressed."));
        assert!(text.contains("Thinking..."));

        app.complete_response(params.stream_id, "Breathe deeply.").expect("persist");
        terminal.draw(|f| ui(f, &mut app)).expect("chat");
        assert!(screen_text(&terminal).contains("Breathe deeply."));
    }

    #[test]
    fn long_reply_scrolls_to_its_last_word() {
        let mut app = create_test_app();
        app.ui.markdown_enabled = false;
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).expect("terminal");

        app.select_persona("2");
        let params = app.submit_message("Tell me more.").expect("stream");
        let mut reply: String = (0..60)
            .map(|i| format!("abcdefgh{i} xyzuvwxyzuvw "))
            .collect();
        reply.push_str("ENDMARK");
        app.complete_response(params.stream_id, &reply).expect("persist");

        terminal.draw(|f| ui(f, &mut app)).expect("chat");
        assert!(screen_text(&terminal).contains("ENDMARK"));
    }

    #[test]
    fn streaming_buffer_stays_in_view() {
        let mut app = create_test_app();
        app.ui.markdown_enabled = false;
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).expect("terminal");

        app.select_persona("2");
        let params = app.submit_message("Go on.").expect("stream");
        let partial: String = (0..40)
            .map(|i| format!("breath{i} in and out "))
            .collect();
        app.append_response_chunk(params.stream_id, &format!("{partial}LATEST"));

        terminal.draw(|f| ui(f, &mut app)).expect("chat");
        assert!(screen_text(&terminal).contains("LATEST"));
    }
}
