use std::time::{Duration, Instant};

use crate::expr_engine::{compile, evaluate_named, CompiledExpression};

use super::helpers::format_number;

pub const DEFAULT_DOMAIN: (f64, f64) = (-10.0, 10.0);
pub const SAMPLES_PER_CURVE: usize = 240;

pub enum Outcome {
    Value(f64),
    Plotted(usize),
    Info(String),
    Failed(String),
}

pub struct HistoryEntry {
    pub input: String,
    pub outcome: Outcome,
    pub duration: Duration,
}

pub struct Curve {
    pub compiled: CompiledExpression,
    pub points: Vec<(f64, f64)>,
}

/// The highlighted evaluation point: its x position plus one chart
/// point per curve that is defined and finite there.
pub struct Marker {
    pub x: f64,
    pub points: Vec<(f64, f64)>,
}

pub struct PlotState {
    pub curves: Vec<Curve>,
    pub y_range: (f64, f64),
    pub marker: Option<Marker>,
}

impl PlotState {
    pub fn new(exprs: Vec<CompiledExpression>, domain: (f64, f64), point: f64) -> Self {
        let curves = exprs
            .into_iter()
            .map(|compiled| {
                let points = sample_curve(&compiled, domain, SAMPLES_PER_CURVE);
                Curve { compiled, points }
            })
            .collect::<Vec<_>>();
        let y_range = y_bounds(&curves);
        let mut plot = PlotState {
            curves,
            y_range,
            marker: None,
        };
        plot.place_marker(point);
        plot
    }

    pub fn resample(&mut self, domain: (f64, f64)) {
        for curve in &mut self.curves {
            curve.points = sample_curve(&curve.compiled, domain, SAMPLES_PER_CURVE);
        }
        self.y_range = y_bounds(&self.curves);
        if let Some(x) = self.marker.as_ref().map(|m| m.x) {
            self.place_marker(x);
        }
    }

    pub fn place_marker(&mut self, x: f64) {
        let points = self
            .curves
            .iter()
            .filter_map(|curve| {
                curve
                    .compiled
                    .eval(x)
                    .ok()
                    .filter(|y| y.is_finite())
                    .map(|y| (x, y))
            })
            .collect();
        self.marker = Some(Marker { x, points });
    }
}

/// Samples a compiled expression at evenly spaced x positions over the
/// domain. Samples that fail to evaluate or come back non-finite are
/// dropped, so curves like `ln(x)` stay drawable on a domain that
/// leaves their support.
pub fn sample_curve(
    compiled: &CompiledExpression,
    (lo, hi): (f64, f64),
    samples: usize,
) -> Vec<(f64, f64)> {
    let last = samples.saturating_sub(1).max(1) as f64;
    (0..samples)
        .filter_map(|i| {
            let x = lo + (hi - lo) * (i as f64 / last);
            compiled
                .eval(x)
                .ok()
                .filter(|y| y.is_finite())
                .map(|y| (x, y))
        })
        .collect()
}

fn y_bounds(curves: &[Curve]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for curve in curves {
        for &(_, y) in &curve.points {
            lo = lo.min(y);
            hi = hi.max(y);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    if hi - lo < f64::EPSILON {
        // flat curve
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

pub struct App {
    pub input: String,
    pub cursor_position: usize,
    pub input_scroll: usize,
    pub history: Vec<HistoryEntry>,
    pub cursor_history: usize,
    pub plot: Option<PlotState>,
    pub domain: (f64, f64),
    pub point: f64,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub list_height: usize,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
}

impl App {
    pub fn new() -> Self {
        App {
            input: String::new(),
            cursor_position: 0,
            input_scroll: 0,
            history: Vec::new(),
            cursor_history: 0,
            plot: None,
            domain: DEFAULT_DOMAIN,
            point: 0.0,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            list_height: 5,
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
        }
    }

    pub fn adjust_input_scroll(&mut self, visible_width: usize) {
        let total_chars = self.input.chars().count();
        let cursor_pos = self.cursor_position;

        if cursor_pos < self.input_scroll {
            self.input_scroll = cursor_pos;
        } else if cursor_pos >= self.input_scroll + visible_width {
            self.input_scroll = cursor_pos - visible_width + 1;
        }

        if self.input_scroll > total_chars.saturating_sub(visible_width) {
            self.input_scroll = total_chars.saturating_sub(visible_width);
        }
    }

    pub fn submit(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            return;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                self.should_quit = true;
                return;
            }
            "clear" | "reset" => {
                self.history.clear();
                self.cursor_history = 0;
                self.plot = None;
                self.domain = DEFAULT_DOMAIN;
                self.point = 0.0;
                self.history_scroll = 0;
                self.clear_input();
                return;
            }
            "help" => {
                self.show_help = true;
                self.clear_input();
                return;
            }
            _ => {}
        }

        let started = Instant::now();
        let outcome = self.execute(&input);
        let duration = started.elapsed();

        self.history.push(HistoryEntry {
            input,
            outcome,
            duration,
        });
        self.cursor_history = self.history.len().saturating_sub(1);
        self.clear_input();
        self.scroll_to_bottom = true;
    }

    fn execute(&mut self, input: &str) -> Outcome {
        if let Some(args) = strip_command(input, "plot") {
            return self.plot_command(args);
        }
        if let Some(args) = strip_command(input, "domain") {
            return self.domain_command(args);
        }
        if let Some(args) = strip_command(input, "at") {
            return self.at_command(args);
        }

        match evaluate_named(input, self.point, "x") {
            Ok(value) => Outcome::Value(value),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }

    fn plot_command(&mut self, args: &str) -> Outcome {
        let mut compiled = Vec::new();
        for piece in args.split(';') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            match compile(piece, "x") {
                Ok(expr) => compiled.push(expr),
                Err(e) => return Outcome::Failed(format!("{}: {}", piece, e)),
            }
        }
        if compiled.is_empty() {
            return Outcome::Failed("usage: plot <expr>[; <expr>...]".to_string());
        }

        let count = compiled.len();
        self.plot = Some(PlotState::new(compiled, self.domain, self.point));
        Outcome::Plotted(count)
    }

    fn domain_command(&mut self, args: &str) -> Outcome {
        let parts: Vec<&str> = args.split_whitespace().collect();
        if parts.len() != 2 {
            return Outcome::Failed("usage: domain <from> <to>".to_string());
        }
        let lo = match parts[0].parse::<f64>() {
            Ok(v) => v,
            Err(_) => return Outcome::Failed(format!("not a number: '{}'", parts[0])),
        };
        let hi = match parts[1].parse::<f64>() {
            Ok(v) => v,
            Err(_) => return Outcome::Failed(format!("not a number: '{}'", parts[1])),
        };
        if !(lo < hi) || !lo.is_finite() || !hi.is_finite() {
            return Outcome::Failed("domain start must lie below its end".to_string());
        }

        self.domain = (lo, hi);
        if let Some(plot) = &mut self.plot {
            plot.resample((lo, hi));
        }
        Outcome::Info(format!(
            "domain set to [{}, {}]",
            format_number(lo),
            format_number(hi)
        ))
    }

    fn at_command(&mut self, args: &str) -> Outcome {
        let x = match args.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => return Outcome::Failed(format!("not a number: '{}'", args)),
        };

        self.point = x;
        let plot = match &mut self.plot {
            Some(plot) => plot,
            None => {
                return Outcome::Info(format!("evaluation point set to x = {}", format_number(x)))
            }
        };
        plot.place_marker(x);

        let mut reports = Vec::new();
        for curve in &plot.curves {
            match curve.compiled.eval(x) {
                Ok(y) => reports.push(format!(
                    "{} = {}",
                    curve.compiled.source(),
                    format_number(y)
                )),
                Err(e) => reports.push(format!("{}: {}", curve.compiled.source(), e)),
            }
        }
        Outcome::Info(format!("x = {}: {}", format_number(x), reports.join("; ")))
    }

    pub fn move_cursor(&mut self, direction: i32) {
        match direction {
            -1 => self.cursor_position = self.cursor_position.saturating_sub(1),
            1 => self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count()),
            _ => {}
        }
    }

    pub fn move_cursor_by_words(&mut self, direction: i32) {
        let input_chars: Vec<char> = self.input.chars().collect();
        let mut pos = self.cursor_position;

        if direction < 0 {
            while pos > 0 && input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
            while pos > 0 && !input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
        } else {
            let len = input_chars.len();
            while pos < len && !input_chars[pos].is_whitespace() {
                pos += 1;
            }
            while pos < len && input_chars[pos].is_whitespace() {
                pos += 1;
            }
        }

        self.cursor_position = pos;
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.history.len().saturating_sub(1) {
            self.cursor_history += 1;
        }

        if self.cursor_history < self.history.len() {
            self.input = self.history[self.cursor_history].input.clone();
        } else {
            self.input.clear();
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self
                .cursor_history
                .saturating_add(step)
                .min(self.history.len().saturating_sub(1));
        }

        if self.cursor_history < self.history.len() {
            self.input = self.history[self.cursor_history].input.clone();
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
        self.input_scroll = 0;
    }

    pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
        s.char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or_else(|| s.len())
    }
}

/// Case-insensitive leading command word; returns the trimmed rest of
/// the line (possibly empty) when it matches.
fn strip_command<'a>(input: &'a str, command: &str) -> Option<&'a str> {
    let mut parts = input.trim().splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    if head.eq_ignore_ascii_case(command) {
        Some(parts.next().unwrap_or("").trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(app: &mut App, line: &str) {
        app.input = line.to_string();
        app.submit();
    }

    #[test]
    fn strip_command_matches_leading_word_only() {
        assert_eq!(strip_command("plot sin(x)", "plot"), Some("sin(x)"));
        assert_eq!(strip_command("PLOT sin(x)", "plot"), Some("sin(x)"));
        assert_eq!(strip_command("plot", "plot"), Some(""));
        assert_eq!(strip_command("plotter", "plot"), None);
        assert_eq!(strip_command("sin(plot)", "plot"), None);
    }

    #[test]
    fn plain_expression_evaluates_at_current_point() {
        let mut app = App::new();
        submit(&mut app, "2+3*4");
        assert!(matches!(app.history[0].outcome, Outcome::Value(v) if v == 14.0));

        submit(&mut app, "at 2");
        submit(&mut app, "x^2");
        assert!(matches!(app.history[2].outcome, Outcome::Value(v) if v == 4.0));
    }

    #[test]
    fn bad_expression_records_failure() {
        let mut app = App::new();
        submit(&mut app, "foo(x)");
        match &app.history[0].outcome {
            Outcome::Failed(msg) => assert!(msg.contains("unknown identifier")),
            _ => panic!("expected a failure"),
        }
    }

    #[test]
    fn plot_command_builds_curves() {
        let mut app = App::new();
        submit(&mut app, "plot sin(x); x/2");
        assert!(matches!(app.history[0].outcome, Outcome::Plotted(2)));

        let plot = app.plot.as_ref().unwrap();
        assert_eq!(plot.curves.len(), 2);
        assert_eq!(plot.curves[0].points.len(), SAMPLES_PER_CURVE);
        assert!(plot.marker.is_some());
    }

    #[test]
    fn plot_command_rejects_bad_expression() {
        let mut app = App::new();
        submit(&mut app, "plot sin(x); foo(x)");
        assert!(matches!(app.history[0].outcome, Outcome::Failed(_)));
        assert!(app.plot.is_none());
    }

    #[test]
    fn domain_command_resamples() {
        let mut app = App::new();
        submit(&mut app, "plot x^2");
        submit(&mut app, "domain 0 4");
        assert_eq!(app.domain, (0.0, 4.0));

        let plot = app.plot.as_ref().unwrap();
        let (first_x, _) = plot.curves[0].points[0];
        let (last_x, last_y) = *plot.curves[0].points.last().unwrap();
        assert_eq!(first_x, 0.0);
        assert_eq!(last_x, 4.0);
        assert!((last_y - 16.0).abs() < 1e-12);
    }

    #[test]
    fn domain_command_rejects_bad_ranges() {
        let mut app = App::new();
        submit(&mut app, "domain 4 0");
        assert!(matches!(app.history[0].outcome, Outcome::Failed(_)));
        submit(&mut app, "domain 1 two");
        assert!(matches!(app.history[1].outcome, Outcome::Failed(_)));
        assert_eq!(app.domain, DEFAULT_DOMAIN);
    }

    #[test]
    fn at_command_moves_the_marker() {
        let mut app = App::new();
        submit(&mut app, "plot x^2");
        submit(&mut app, "at 3");
        assert_eq!(app.point, 3.0);

        let marker = app.plot.as_ref().unwrap().marker.as_ref().unwrap();
        assert_eq!(marker.x, 3.0);
        assert_eq!(marker.points, vec![(3.0, 9.0)]);
    }

    #[test]
    fn sampling_drops_undefined_points() {
        let compiled = compile("ln(x)", "x").unwrap();
        let points = sample_curve(&compiled, (-1.0, 1.0), 100);
        assert!(!points.is_empty());
        assert!(points.len() < 100);
        assert!(points.iter().all(|&(x, y)| x > 0.0 && y.is_finite()));
    }

    #[test]
    fn clear_resets_plot_and_domain() {
        let mut app = App::new();
        submit(&mut app, "plot x");
        submit(&mut app, "domain 0 1");
        submit(&mut app, "clear");
        assert!(app.plot.is_none());
        assert_eq!(app.domain, DEFAULT_DOMAIN);
        assert!(app.history.is_empty());
    }
}
