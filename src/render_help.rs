use crate::tui_mode::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED),
    ))
}

pub fn render_help(frame: &mut Frame, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" plotcalc Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let help_text = vec![
        Line::from(Span::styled(
            "plotcalc - expression calculator and function plotter",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Expressions:"),
        Line::from("  One free variable x, numbers, parentheses, and"),
        Line::from("  + - * / ^  (also ** for powers; ^ binds tightest, right-assoc)"),
        Line::from("  A leading or post-operator - negates: -x, 2*-3, 2^-3"),
        Line::from(""),
        section("Functions:"),
        Line::from("  sin(x)  cos(x)  tan(x)   : Trigonometry (radians)"),
        Line::from("  sqrt(x)                  : Square root"),
        Line::from("  ln(x)   log(x)           : Natural / base-10 logarithm"),
        Line::from("  exp(x)  abs(x)           : Exponential / absolute value"),
        Line::from(""),
        section("Commands:"),
        Line::from("  <expr>               : Evaluate at the current point x"),
        Line::from("  plot <expr>[; ...]   : Draw one or more curves"),
        Line::from("  domain <from> <to>   : Re-sample the plot over a new x-range"),
        Line::from("  at <x>               : Move the marked evaluation point"),
        Line::from("  clear                : Drop history, plot, domain, and point"),
        Line::from("  help / F1            : This screen"),
        Line::from("  quit                 : Exit"),
        Line::from(""),
        section("Navigation:"),
        Line::from("  Left/Right           : Move cursor (Ctrl: by words)"),
        Line::from("  Home/End             : Start / end of line"),
        Line::from("  Up/Down              : Walk input history"),
        Line::from("  PgUp/PgDn            : Page through history"),
        Line::from("  Mouse wheel          : Scroll history or this help"),
        Line::from("  Ctrl+U               : Clear the input line"),
        Line::from(""),
        section("Examples:"),
        Line::from("  plot sin(x)^2 + 2*x - 1"),
        Line::from("  plot sin(x); cos(x)"),
        Line::from("  domain -3.14 3.14"),
        Line::from("  at 1.5"),
        Line::from("  sqrt(x) + 1/x"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
