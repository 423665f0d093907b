#[cfg(feature = "line")]
use crate::expr_engine::evaluate_named;
#[cfg(feature = "line")]
use std::io::{stdin, stdout, Stdout, Write};
#[cfg(feature = "line")]
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::{DetectCursorPos, Goto},
    event::Key,
    input::TermRead,
    raw::{IntoRawMode, RawTerminal},
};

#[cfg(feature = "line")]
fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or_else(|| s.len())
}

/// Splits `expr @ x` into the expression and its binding; a line
/// without `@` binds x = 0.
#[cfg(feature = "line")]
fn split_binding(input: &str) -> Result<(&str, f64), String> {
    match input.rsplit_once('@') {
        Some((expr, binding)) => {
            let binding = binding.trim();
            match binding.parse::<f64>() {
                Ok(value) => Ok((expr.trim(), value)),
                Err(_) => Err(format!("not a number after '@': '{}'", binding)),
            }
        }
        None => Ok((input, 0.0)),
    }
}

#[cfg(feature = "line")]
fn read_line_raw(
    stdout: &mut RawTerminal<Stdout>,
    history: &[String],
    history_index: &mut usize,
) -> String {
    let mut line = String::new();
    let mut cursor_pos = 0;
    let (_, row) = stdout.cursor_pos().unwrap();

    let stdin = stdin();
    let mut keys = stdin.keys();

    loop {
        write!(stdout, "{}{}f(x): {}", Goto(1, row), ClearLine, line).unwrap();
        let byte_pos = char_index_to_byte_index(&line, cursor_pos);
        write!(stdout, "{}", Goto((7 + byte_pos) as u16, row)).unwrap();
        stdout.flush().unwrap();

        match keys.next().unwrap().unwrap() {
            Key::Char('\n') => break,
            Key::Char(c) => {
                let byte_idx = char_index_to_byte_index(&line, cursor_pos);
                line.insert(byte_idx, c);
                cursor_pos += 1;
            }
            Key::Backspace if cursor_pos > 0 => {
                cursor_pos -= 1;
                remove_char_at(&mut line, cursor_pos);
            }
            Key::Delete if cursor_pos < line.chars().count() => {
                remove_char_at(&mut line, cursor_pos);
            }
            Key::Left if cursor_pos > 0 => cursor_pos -= 1,
            Key::Right if cursor_pos < line.chars().count() => cursor_pos += 1,
            Key::Home => cursor_pos = 0,
            Key::End => cursor_pos = line.chars().count(),
            Key::Up => {
                if *history_index > 0 {
                    *history_index -= 1;
                    line = history[*history_index].clone();
                    cursor_pos = line.chars().count();
                }
            }
            Key::Down => {
                if *history_index < history.len().saturating_sub(1) {
                    *history_index += 1;
                    line = history[*history_index].clone();
                } else {
                    *history_index = history.len();
                    line.clear();
                }
                cursor_pos = line.chars().count();
            }
            _ => {}
        }
    }

    line
}

#[cfg(feature = "line")]
fn remove_char_at(line: &mut String, char_index: usize) {
    let byte_idx = char_index_to_byte_index(line, char_index);
    if let Some(c) = line[byte_idx..].chars().next() {
        line.drain(byte_idx..byte_idx + c.len_utf8());
    }
}

#[cfg(feature = "line")]
pub fn run_line() {
    println!("plotcalc line mode");
    println!("Expressions in one variable x: + - * / ^ (or **), sin cos tan sqrt ln log exp abs");
    println!("Evaluate at a point with '<expr> @ <x>'; without '@' the binding is x = 0");
    println!("Navigation: Left/Right, Backspace/Delete, Home/End, Up/Down for history");
    println!("Commands: 'quit' to exit, 'clear' to reset history\n");

    let mut stdout = stdout().into_raw_mode().unwrap();
    let mut history: Vec<String> = Vec::new();
    let mut history_index = 0;

    loop {
        let line = read_line_raw(&mut stdout, &history, &mut history_index);
        let input = line.trim();
        if input.is_empty() {
            write!(stdout, "\r\n").unwrap();
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("\r\nGoodbye!");
                return;
            }
            "clear" | "reset" => {
                history.clear();
                history_index = 0;
                println!("\r\nHistory cleared\n");
                continue;
            }
            _ => {}
        }

        history.push(input.to_string());
        history_index = history.len();

        match split_binding(input) {
            Ok((expr, x)) => match evaluate_named(expr, x, "x") {
                Ok(value) => {
                    print!("\r\n  {} = {}  (x = {})\n", expr, value, x);
                }
                Err(e) => {
                    print!("\r\n  Error: {}\n", e);
                }
            },
            Err(message) => {
                print!("\r\n  Error: {}\n", message);
            }
        }
        stdout.flush().unwrap();
    }
}

#[cfg(all(test, feature = "line"))]
mod tests {
    use super::split_binding;

    #[test]
    fn binding_defaults_to_zero() {
        assert_eq!(split_binding("x+1"), Ok(("x+1", 0.0)));
    }

    #[test]
    fn at_sign_binds_the_variable() {
        assert_eq!(split_binding("sin(x) @ 1.5"), Ok(("sin(x)", 1.5)));
        assert_eq!(split_binding("x@-2"), Ok(("x", -2.0)));
    }

    #[test]
    fn garbage_binding_is_rejected() {
        assert!(split_binding("x @ two").is_err());
    }
}
