use keyrush::{
    session::{CharState, Mode, Phase, TestSession},
    TestResult,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn prompt_spans(session: &TestSession) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let cursor_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);

    let cursor = session.typed.len();
    session
        .char_states()
        .into_iter()
        .enumerate()
        .map(|(idx, state)| {
            let shown = match state {
                CharState::Extra => session.typed.get(idx).copied().unwrap_or(' '),
                _ => session.target.get(idx).copied().unwrap_or(' '),
            };
            let style = match state {
                CharState::Pending if idx == cursor => cursor_style,
                CharState::Pending => dim_bold_style,
                CharState::Correct => green_bold_style,
                // spaces would vanish in red, show them as dots
                CharState::Incorrect | CharState::Extra => {
                    return Span::styled(
                        if shown == ' ' {
                            "·".to_owned()
                        } else {
                            shown.to_string()
                        },
                        red_bold_style,
                    )
                }
            };
            Span::styled(shown.to_string(), style)
        })
        .collect()
}

fn clock_label(session: &TestSession) -> String {
    match session.config.mode() {
        Mode::Time => format!("{}s", session.clock_value),
        _ if session.is_idle() => String::new(),
        _ => format!("{}s", session.clock_value),
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.engine.session();
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = session.target_text().width().max(session.typed.len()) as u16;
    let prompt_lines = if prompt_width <= max_chars_per_line {
        1
    } else {
        prompt_width / max_chars_per_line + 2
    };
    let padding = area.height.saturating_sub(prompt_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2), // clock + live stats
            Constraint::Length(prompt_lines),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let live = session.live;
    let header = if session.phase == Phase::Active {
        format!(
            "{}   {} wpm   {}% acc",
            clock_label(session),
            live.net_wpm,
            live.accuracy
        )
    } else {
        clock_label(session)
    };
    Paragraph::new(Span::styled(header, dim_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Line::from(prompt_spans(session)))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let hint = match (session.phase, session.config.mode()) {
        (Phase::Idle, _) => "start typing to begin / (tab) new test / (esc)ape",
        (_, Mode::Time) => "(tab) new test / (esc)ape",
        _ => "(enter) finish / (tab) new test / (esc)ape",
    };
    Paragraph::new(Span::styled(hint, italic_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn result_lines(result: &TestResult) -> Vec<Line<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let stats = result.character_stats;
    vec![
        Line::from(Span::styled(
            format!(
                "{} wpm   {} raw   {}% acc   {:.0}% consistency",
                result.wpm, result.raw_wpm, result.accuracy, result.consistency
            ),
            bold_style,
        )),
        Line::from(format!(
            "{} / {} / {} / {} characters   {} cpm   {}s   {}",
            stats.correct,
            stats.incorrect,
            stats.extra,
            stats.missed,
            result.cpm,
            result.duration_secs,
            result.mode
        )),
    ]
}

fn render_results(app: &App, result: &TestResult, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2), // results
            Constraint::Length(1), // notice
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
            Constraint::Min(1),
        ])
        .split(area);

    Paragraph::new(result_lines(result))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if let Some(ref notice) = app.notice {
        Paragraph::new(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        "(tab) new test / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.engine.result() {
            Some(result) => render_results(self, result, area, buf),
            None => render_typing(self, area, buf),
        }
    }
}
