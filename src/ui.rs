use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use typemaster::criteria::{is_boss_level, Challenge, Mode};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let session = app.round.session();
    let target = session.target().to_string();
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_lines = if target.width() <= max_chars_per_line as usize {
        1
    } else {
        ((target.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let filler = area.height.saturating_sub(prompt_lines + 2) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(filler),
            Constraint::Length(2),
            Constraint::Length(prompt_lines),
            Constraint::Min(0),
        ])
        .split(area);

    let snapshot = app.round.snapshot();
    let mut status = match app.round.mode() {
        Mode::Practice => String::new(),
        Mode::Level { level } if is_boss_level(*level) => format!("level {level} (boss)   "),
        Mode::Level { level } => format!("level {level}   "),
        Mode::Challenge { id } => match Challenge::find(id) {
            Ok(challenge) => format!("{}   ", challenge.title),
            Err(_) => String::new(),
        },
    };
    status.push_str(&format!(
        "{} wpm   {}% acc   {}x combo",
        snapshot.wpm, snapshot.accuracy, snapshot.combo_current
    ));
    if let Some(secs) = snapshot.seconds_remaining {
        status.push_str(&format!("   {secs}s"));
    }
    if app.round.reconciler().is_composing() {
        status.push_str("   composing…");
    }
    if app.keys.shift_active() {
        status.push_str("   ⇧");
    }
    Paragraph::new(Span::styled(status, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let chars = session.target().as_chars();
    let cursor = snapshot.cursor.min(chars.len());
    let mut spans = vec![Span::styled(
        chars[..cursor].iter().collect::<String>(),
        green_bold_style,
    )];
    if let Some(expected) = session.expected_char() {
        let shown = match expected {
            ' ' => "·".to_owned(),
            c => c.to_string(),
        };
        let cursor_style = if app.keys.is_pressed(KeyCode::Char(expected)) {
            underlined_dim_bold_style.add_modifier(Modifier::REVERSED)
        } else {
            underlined_dim_bold_style
        };
        spans.push(Span::styled(shown, cursor_style));
        spans.push(Span::styled(
            chars[cursor + 1..].iter().collect::<String>(),
            dim_bold_style,
        ));
    }

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let Some(result) = app.round.result() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(result.reasons.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let points: Vec<(f64, f64)> = app.round.history().iter().map(|&p| p.into()).collect();
    let duration = points.last().map(|p| p.0).unwrap_or(1.0).max(1.0);
    let top_wpm = points.iter().map(|p| p.1).fold(10.0_f64, f64::max);
    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];
    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format!("{duration:.0}"), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, top_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format!("{top_wpm:.0}"), bold_style),
                ]),
        )
        .render(chunks[0], buf);

    let verdict = match (app.round.mode(), result.success) {
        (Mode::Practice, _) => Span::styled("practice complete", bold_style),
        (_, true) => Span::styled("passed", bold_style.fg(Color::Green)),
        (_, false) => Span::styled("failed", bold_style.fg(Color::Red)),
    };
    Paragraph::new(verdict)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let mut summary = format!(
        "{} wpm   {}% acc   {} max combo   +{} xp",
        result.wpm, result.accuracy, result.max_combo, result.xp
    );
    if let Some(stars) = result.stars {
        summary.push_str(&format!("   {}", "★".repeat(stars as usize)));
    }
    Paragraph::new(Span::styled(summary, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let reasons: Vec<Line> = result
        .reasons
        .iter()
        .map(|r| Line::from(Span::styled(r.to_string(), Style::default().fg(Color::Red))))
        .collect();
    Paragraph::new(reasons)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let problem_keys = app
        .problem_keys
        .top(5)
        .into_iter()
        .map(|(c, _)| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    if !problem_keys.is_empty() {
        Paragraph::new(Span::styled(
            format!("problem keys: {problem_keys}"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled("(tab) retry / (esc)ape", italic_style)).render(chunks[6], buf);
}
