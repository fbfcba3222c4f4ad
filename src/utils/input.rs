//! Text sanitization for pasted and typed input.

/// Sanitize text input to prevent TUI corruption
///
/// Tabs become 4 spaces, carriage returns become newlines and other control
/// characters are dropped.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => sanitized.push('\n'),
            '\n' => sanitized.push(c),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}

/// Like [`sanitize_text_input`], but folds line breaks into spaces for
/// single-line form fields.
pub fn sanitize_single_line(text: &str) -> String {
    sanitize_text_input(text).replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_input_mixed_control_chars() {
        let input = "hello\x07\tworld\r\ntest";
        assert_eq!(sanitize_text_input(input), "hello    world\n\ntest");
    }

    #[test]
    fn test_sanitize_text_input_preserves_newlines_and_unicode() {
        let input = "line1\nzen 🌿\nline3";
        assert_eq!(sanitize_text_input(input), input);
    }

    #[test]
    fn test_sanitize_single_line_folds_breaks() {
        assert_eq!(sanitize_single_line("Code\r\nNinja\x01"), "Code  Ninja");
    }
}
