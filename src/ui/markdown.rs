//! Markdown to styled terminal lines.
//!
//! Replies are re-rendered on every fragment, so the renderer must accept
//! incomplete input (an unterminated code fence, a half-written list) and
//! still produce sensible lines.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

const RULE_WIDTH: usize = 24;
const CODE_INDENT: &str = "  ";

#[derive(Clone, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct MarkdownRenderer<'a> {
    theme: &'a Theme,
    base: Style,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    quote_depth: usize,
    code_block: Option<String>,
}

impl<'a> MarkdownRenderer<'a> {
    fn new(theme: &'a Theme, base: Style) -> Self {
        Self {
            theme,
            base,
            lines: Vec::new(),
            spans: Vec::new(),
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            quote_depth: 0,
            code_block: None,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.current_style().patch(patch);
        self.style_stack.push(style);
    }

    fn push_text(&mut self, text: &str, style: Style) {
        if !text.is_empty() {
            self.spans.push(Span::styled(text.replace('\t', "    "), style));
        }
    }

    fn quote_prefix(&self) -> Option<Span<'static>> {
        (self.quote_depth > 0)
            .then(|| Span::styled("│ ".repeat(self.quote_depth), self.theme.md_blockquote))
    }

    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.spans.len() + 1);
        spans.extend(self.quote_prefix());
        spans.append(&mut self.spans);
        self.lines.push(Line::from(spans));
    }

    /// Separate blocks with one blank line. Tight list items stay together.
    fn end_block(&mut self) {
        self.flush();
        if self.list_stack.is_empty()
            && self.lines.last().is_some_and(|line| line.width() > 0)
        {
            self.lines.push(Line::default());
        }
    }

    fn start_item(&mut self) {
        self.flush();
        let depth = self.list_stack.len().saturating_sub(1);
        let marker = match self.list_stack.last_mut() {
            Some(ListKind::Ordered(next)) => {
                let marker = format!("{next}. ");
                *next += 1;
                marker
            }
            Some(ListKind::Unordered) | None => "• ".to_string(),
        };
        self.spans.push(Span::raw("  ".repeat(depth)));
        self.spans
            .push(Span::styled(marker, self.theme.md_list_marker));
    }

    fn finish_code_block(&mut self) {
        let Some(code) = self.code_block.take() else {
            return;
        };
        for line in code.trim_end_matches('\n').split('\n') {
            let mut spans = Vec::with_capacity(2);
            spans.extend(self.quote_prefix());
            spans.push(Span::styled(
                format!("{CODE_INDENT}{}", line.replace('\t', "    ")),
                self.theme.md_code,
            ));
            self.lines.push(Line::from(spans));
        }
        self.end_block();
    }

    fn render(mut self, text: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(text, options) {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Paragraph => {}
                    Tag::Heading { level, .. } => {
                        self.flush();
                        let style = self.theme.md_heading_style(level as u8);
                        self.push_style(style);
                    }
                    Tag::BlockQuote(_) => {
                        self.flush();
                        self.quote_depth += 1;
                        self.push_style(self.theme.md_blockquote);
                    }
                    Tag::List(start) => {
                        self.flush();
                        self.list_stack.push(match start {
                            Some(n) => ListKind::Ordered(n),
                            None => ListKind::Unordered,
                        });
                    }
                    Tag::Item => self.start_item(),
                    Tag::CodeBlock(kind) => {
                        self.flush();
                        if let CodeBlockKind::Fenced(lang) = kind {
                            if !lang.is_empty() {
                                self.lines.push(Line::from(Span::styled(
                                    lang.to_string(),
                                    self.theme.system_text_style,
                                )));
                            }
                        }
                        self.code_block = Some(String::new());
                    }
                    Tag::Emphasis => {
                        self.push_style(Style::default().add_modifier(Modifier::ITALIC))
                    }
                    Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
                    Tag::Strikethrough => {
                        self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
                    }
                    Tag::Link { .. } => {
                        self.push_style(Style::default().add_modifier(Modifier::UNDERLINED))
                    }
                    _ => {}
                },
                Event::End(tag_end) => match tag_end {
                    TagEnd::Paragraph => self.end_block(),
                    TagEnd::Heading(_) => {
                        self.style_stack.pop();
                        self.end_block();
                    }
                    TagEnd::BlockQuote(_) => {
                        self.flush();
                        self.style_stack.pop();
                        self.quote_depth = self.quote_depth.saturating_sub(1);
                        self.end_block();
                    }
                    TagEnd::List(_) => {
                        self.flush();
                        self.list_stack.pop();
                        self.end_block();
                    }
                    TagEnd::Item => self.flush(),
                    TagEnd::CodeBlock => self.finish_code_block(),
                    TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                        self.style_stack.pop();
                    }
                    _ => {}
                },
                Event::Text(text) => {
                    if let Some(code) = self.code_block.as_mut() {
                        code.push_str(&text);
                    } else {
                        let style = self.current_style();
                        self.push_text(&text, style);
                    }
                }
                Event::Code(code) => {
                    let style = self.current_style().patch(self.theme.md_code);
                    self.push_text(&code, style);
                }
                Event::SoftBreak => self.push_text(" ", self.current_style()),
                Event::HardBreak => self.flush(),
                Event::Rule => {
                    self.flush();
                    self.lines.push(Line::from(Span::styled(
                        "─".repeat(RULE_WIDTH),
                        self.theme.md_rule,
                    )));
                    self.end_block();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.spans
                        .push(Span::styled(marker, self.theme.md_list_marker));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    self.push_text(html.trim_end_matches('\n'), self.current_style());
                }
                _ => {}
            }
        }

        // Unterminated fences still show what has streamed in so far.
        self.finish_code_block();
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render `text` as markdown, using `base` for unstyled prose.
pub fn render_markdown(text: &str, base: Style, theme: &Theme) -> Vec<Line<'static>> {
    MarkdownRenderer::new(theme, base).render(text)
}

/// Render `text` verbatim, one terminal line per source line.
pub fn render_plain(text: &str, style: Style) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| Line::from(Span::styled(line.replace('\t', "    "), style)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn paragraphs_join_soft_breaks_and_separate_blocks() {
        let theme = Theme::dark_default();
        let lines = render_markdown(
            "Breathe\ndeeply.\n\nThis moment is enough.",
            Style::default(),
            &theme,
        );
        assert_eq!(
            texts(&lines),
            vec!["Breathe deeply.", "", "This moment is enough."]
        );
    }

    #[test]
    fn headings_use_heading_style() {
        let theme = Theme::dark_default();
        let lines = render_markdown("# Plan", Style::default(), &theme);
        assert_eq!(texts(&lines), vec!["Plan"]);
        assert_eq!(lines[0].spans[0].style, theme.md_h1);
    }

    #[test]
    fn lists_get_markers_and_nesting() {
        let theme = Theme::dark_default();
        let lines = render_markdown("1. one\n2. two\n   - inner", Style::default(), &theme);
        assert_eq!(texts(&lines), vec!["1. one", "2. two", "  • inner"]);
    }

    #[test]
    fn code_blocks_are_indented_and_keep_lines() {
        let theme = Theme::dark_default();
        let lines = render_markdown(
            "```rust\nfn main() {\n\tok();\n}\n```",
            Style::default(),
            &theme,
        );
        assert_eq!(
            texts(&lines),
            vec!["rust", "  fn main() {", "      ok();", "  }"]
        );
        assert_eq!(lines[1].spans[0].style, theme.md_code);
    }

    #[test]
    fn unterminated_fence_renders_partial_code() {
        let theme = Theme::dark_default();
        let lines = render_markdown("Try this:\n\n```\nlet x = 1;", Style::default(), &theme);
        assert_eq!(texts(&lines), vec!["Try this:", "", "  let x = 1;"]);
    }

    #[test]
    fn blockquotes_are_prefixed() {
        let theme = Theme::dark_default();
        let lines = render_markdown("> be here now", Style::default(), &theme);
        assert_eq!(texts(&lines), vec!["│ be here now"]);
    }

    #[test]
    fn emphasis_patches_the_base_style() {
        let theme = Theme::dark_default();
        let lines = render_markdown("a **b**", theme.assistant_text_style, &theme);
        let bold = &lines[0].spans[1];
        assert_eq!(bold.content, "b");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(bold.style.fg, theme.assistant_text_style.fg);
    }

    #[test]
    fn plain_rendering_keeps_markup() {
        let lines = render_plain("**raw**\nline", Style::default());
        assert_eq!(texts(&lines), vec!["**raw**", "line"]);
    }
}
