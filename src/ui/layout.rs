use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width of the persona sidebar, borders included.
pub const SIDEBAR_WIDTH: u16 = 30;

/// Truncate `text` to at most `max_width` terminal columns, marking the cut
/// with an ellipsis.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Word-wrap `lines` to `width` columns.
///
/// Each returned line fits in one terminal row, so the row count is
/// `result.len()` and the result can be drawn without further wrapping.
/// Words wider than a row are split across rows.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let mut row = RowBuilder::new(line.style, width);
        let mut word: Vec<(char, Style)> = Vec::new();
        for span in &line.spans {
            for ch in span.content.chars() {
                if ch == ' ' {
                    row.place_word(&mut word, &mut out);
                    row.place_space(span.style, &mut out);
                } else {
                    word.push((ch, span.style));
                }
            }
        }
        row.place_word(&mut word, &mut out);
        row.finish(&mut out);
    }
    out
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Accumulates styled characters for the row being filled.
struct RowBuilder {
    line_style: Style,
    width: usize,
    spans: Vec<Span<'static>>,
    used: usize,
    emitted: bool,
}

impl RowBuilder {
    fn new(line_style: Style, width: usize) -> Self {
        Self {
            line_style,
            width,
            spans: Vec::new(),
            used: 0,
            emitted: false,
        }
    }

    fn push_char(&mut self, ch: char, style: Style) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push(ch),
            _ => self.spans.push(Span::styled(ch.to_string(), style)),
        }
        self.used += char_width(ch);
    }

    fn break_row(&mut self, out: &mut Vec<Line<'static>>) {
        out.push(Line::from(std::mem::take(&mut self.spans)).style(self.line_style));
        self.used = 0;
        self.emitted = true;
    }

    fn place_word(&mut self, word: &mut Vec<(char, Style)>, out: &mut Vec<Line<'static>>) {
        if word.is_empty() {
            return;
        }
        let word_width: usize = word.iter().map(|(ch, _)| char_width(*ch)).sum();
        if self.used > 0 && self.used + word_width > self.width {
            self.break_row(out);
        }
        for (ch, style) in word.drain(..) {
            if self.used > 0 && self.used + char_width(ch) > self.width {
                self.break_row(out);
            }
            self.push_char(ch, style);
        }
    }

    /// A space that does not fit ends the row and is dropped.
    fn place_space(&mut self, style: Style, out: &mut Vec<Line<'static>>) {
        if self.used < self.width {
            self.push_char(' ', style);
        } else {
            self.break_row(out);
        }
    }

    fn finish(mut self, out: &mut Vec<Line<'static>>) {
        if !self.spans.is_empty() || !self.emitted {
            self.break_row(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Zen Guide", 20), "Zen Guide");
    }

    #[test]
    fn long_text_gets_an_ellipsis() {
        assert_eq!(truncate_to_width("Task Master", 6), "Task …");
        assert_eq!(truncate_to_width("Task Master", 0), "");
    }

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(truncate_to_width("禅禅禅禅", 5), "禅禅…");
    }

    fn rows(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn words_move_to_the_next_row_whole() {
        let wrapped = prewrap_lines(&[Line::from("abcdefgh1 xyzuvwxyzuvw end")], 12);
        assert_eq!(rows(&wrapped), vec!["abcdefgh1 ", "xyzuvwxyzuvw", "end"]);
    }

    #[test]
    fn overlong_words_are_split_and_blank_lines_kept() {
        let lines = vec![Line::from("abcdefghij"), Line::from(""), Line::from("abc")];
        assert_eq!(rows(&prewrap_lines(&lines, 4)), vec!["abcd", "efgh", "ij", "", "abc"]);
    }

    #[test]
    fn styles_survive_wrapping() {
        let bold = Style::default().add_modifier(ratatui::style::Modifier::BOLD);
        let line = Line::from(vec![Span::raw("calm "), Span::styled("breathing", bold)]);
        let wrapped = prewrap_lines(&[line], 6);
        assert_eq!(rows(&wrapped), vec!["calm ", "breath", "ing"]);
        assert_eq!(wrapped[1].spans[0].style, bold);
    }
}
