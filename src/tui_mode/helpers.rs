use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::expr_engine::is_function;

/// Word-wraps to a display width, hard-breaking words wider than a
/// whole line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    let flush = |current: &mut String, current_width: &mut usize, lines: &mut Vec<String>| {
        if !current.is_empty() {
            lines.push(std::mem::take(current));
            *current_width = 0;
        }
    };

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            flush(&mut current, &mut current_width, &mut lines);
            let mut chunk = String::new();
            let mut chunk_width = 0;
            for c in word.chars() {
                let w = UnicodeWidthChar::width_cjk(c).unwrap_or(1);
                if chunk_width + w > width {
                    lines.push(std::mem::take(&mut chunk));
                    chunk_width = 0;
                }
                chunk.push(c);
                chunk_width += w;
            }
            if !chunk.is_empty() {
                lines.push(chunk);
            }
            continue;
        }

        if current_width + word_width + usize::from(!current.is_empty()) > width {
            flush(&mut current, &mut current_width, &mut lines);
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    flush(&mut current, &mut current_width, &mut lines);
    lines
}

pub fn format_number(x: f64) -> String {
    if x.abs() > 1e10 || (x.abs() < 1e-5 && x != 0.0) {
        format!("{:.6e}", x)
    } else {
        let s = format!("{:.6}", x);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Re-spaces an expression for display: binary operators get one space
/// on each side, everything else is packed tight.
pub fn format_with_spaces(expr: &str) -> String {
    let mut result = String::new();
    let mut last_char = '\0';

    for c in expr.chars() {
        if c.is_whitespace() {
            continue;
        }
        match c {
            '+' | '-' | '*' | '/' | '^' => {
                if last_char != ' ' && last_char != '\0' && last_char != '(' {
                    result.push(' ');
                }
                result.push(c);
                // a minus opening a value sticks to it
                if last_char != '\0' && last_char != '(' {
                    result.push(' ');
                }
            }
            ';' => {
                result.push_str("; ");
            }
            _ => result.push(c),
        }
        last_char = c;
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Colors an input line by token class: known function names, the free
/// variable, operators, and number literals.
pub fn highlight_expression(expr: &str, base_style: Style) -> Vec<Span<'static>> {
    let function_style = Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD);
    let variable_style = Style::default()
        .fg(Color::LightCyan)
        .add_modifier(Modifier::ITALIC);
    let operator_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let number_style = Style::default().fg(Color::LightGreen);

    let mut spans = Vec::new();
    let mut word = String::new();
    let mut number = String::new();

    let flush_word = |word: &mut String, spans: &mut Vec<Span<'static>>| {
        if word.is_empty() {
            return;
        }
        let style = if is_function(word) {
            function_style
        } else if word == "x" {
            variable_style
        } else {
            base_style
        };
        spans.push(Span::styled(std::mem::take(word), style));
    };
    let flush_number = |number: &mut String, spans: &mut Vec<Span<'static>>| {
        if !number.is_empty() {
            spans.push(Span::styled(std::mem::take(number), number_style));
        }
    };

    for c in expr.chars() {
        if c.is_ascii_alphabetic() || c == '_' || (!word.is_empty() && c.is_ascii_digit()) {
            flush_number(&mut number, &mut spans);
            word.push(c);
        } else if c.is_ascii_digit() || c == '.' {
            flush_word(&mut word, &mut spans);
            number.push(c);
        } else {
            flush_word(&mut word, &mut spans);
            flush_number(&mut number, &mut spans);
            match c {
                '+' | '-' | '*' | '/' | '^' => {
                    spans.push(Span::styled(c.to_string(), operator_style));
                }
                _ => spans.push(Span::styled(c.to_string(), base_style)),
            }
        }
    }
    flush_word(&mut word, &mut spans);
    flush_number(&mut number, &mut spans);

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_text("one two three", 7);
        assert_eq!(lines, vec!["one two", "three"]);
    }

    #[test]
    fn hard_breaks_overlong_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn zero_width_never_panics() {
        assert_eq!(wrap_text("anything", 0), vec![String::new()]);
    }

    #[test]
    fn format_number_trims_trailing_zeros() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-2.5), "-2.5");
    }

    #[test]
    fn format_number_switches_to_exponent() {
        assert_eq!(format_number(1e12), "1.000000e12");
        assert!(format_number(1e-7).contains('e'));
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn spaces_binary_operators() {
        assert_eq!(format_with_spaces("2+3*4"), "2 + 3 * 4");
        assert_eq!(format_with_spaces("sin(x)^2"), "sin(x) ^ 2");
        assert_eq!(format_with_spaces("(-x)"), "(-x)");
    }

    #[test]
    fn highlight_classifies_tokens() {
        let spans = highlight_expression("sin(x)+2", Style::default());
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["sin", "(", "x", ")", "+", "2"]);
    }

    #[test]
    fn highlight_keeps_every_character() {
        let input = "log(x)*-1.5; x^2";
        let spans = highlight_expression(input, Style::default());
        let joined: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(joined, input);
    }
}
