pub mod charting;
pub mod screen;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};
use tartini::{
    scoring::PASS_THRESHOLD,
    session::{ExamPhase, RoundResult},
    tuning::{HintWindow, PitchDirection},
    util::{format_clock, format_score},
};

use crate::{ui::screen::current_screen, App};

const HORIZONTAL_MARGIN: u16 = 5;
const SLIDER_HANDLE: &str = "█";
const SLIDER_TRACK: &str = "─";

pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.area());

    render_status(app, f, chunks[0]);
    current_screen(&app.state).render(app, f, chunks[1]);
}

fn render_status(app: &App, f: &mut Frame, area: Rect) {
    let display = app.session.display();
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let pass_style = if display.score >= PASS_THRESHOLD {
        bold.fg(Color::Green)
    } else {
        bold.fg(Color::Red)
    };

    let line = Line::from(vec![
        Span::raw("Score "),
        Span::styled(format!("{} / 100", format_score(display.score)), bold),
        Span::raw("   Round "),
        Span::styled(
            format!("{} / {}", display.round_number, display.total_rounds),
            bold,
        ),
        Span::raw("   "),
        Span::styled(
            format!("{} {}+", display.pass_status, PASS_THRESHOLD),
            pass_style,
        ),
        Span::raw("   Exam "),
        Span::styled(format_clock(display.exam_elapsed_secs), bold),
        Span::raw("   Round time "),
        Span::styled(format!("{:.1}s", display.round_remaining_secs), bold),
        Span::raw("   Hints "),
        Span::styled(display.hints_remaining.to_string(), bold),
    ]);

    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("tartini"));
    f.render_widget(widget, area);
}

pub fn render_selector(app: &App, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(area);

    let cursor_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    let mut previous_compound = None;
    let mut cursor_line = 0usize;
    for (idx, interval) in app.catalog().all().iter().enumerate() {
        if previous_compound != Some(interval.is_compound()) {
            let heading = if interval.is_compound() {
                "COMPOUND INTERVALS (OCTAVE +)"
            } else {
                "BASE JI INTERVALS"
            };
            lines.push(Line::from(Span::styled(
                heading,
                Style::default().add_modifier(Modifier::DIM | Modifier::BOLD),
            )));
            previous_compound = Some(interval.is_compound());
        }

        let mark = if app.selection.contains(interval.id) {
            "[x]"
        } else {
            "[ ]"
        };
        let text = format!(
            "{mark} {:<32} {:>6}",
            interval.name.to_uppercase(),
            interval.ratio_label()
        );
        if idx == app.cursor {
            cursor_line = lines.len();
            lines.push(Line::from(Span::styled(text, cursor_style)));
        } else {
            lines.push(Line::from(text));
        }
    }

    let visible = chunks[0].height.saturating_sub(2) as usize;
    let offset = cursor_line.saturating_sub(visible.saturating_sub(1)) as u16;
    let title = format!("Select intervals ({} chosen)", app.selection.len());
    let list = Paragraph::new(lines)
        .scroll((offset, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, chunks[0]);

    let legend = Paragraph::new(Span::styled(
        "(↑↓) move / (space) toggle / (a)ll / (n)one / (enter) start / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    f.render_widget(legend, chunks[1]);
}

/// Text slider of `width` cells. The handle sits at `value`; a visible hint
/// window is drawn in green beneath it.
pub fn slider_line(width: usize, value: f64, hint: Option<HintWindow>) -> Line<'static> {
    if width == 0 {
        return Line::default();
    }
    let last = (width - 1) as f64;
    let handle = (value.clamp(0.0, 1.0) * last).round() as usize;
    let hint_cells = hint.map(|w| ((w.start * last).round() as usize, (w.end * last).round() as usize));

    let spans = (0..width)
        .map(|cell| {
            let in_hint = hint_cells.is_some_and(|(a, b)| (a..=b).contains(&cell));
            let style = if in_hint {
                Style::default().fg(Color::Green).bg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Gray)
            };
            if cell == handle {
                Span::styled(SLIDER_HANDLE, style.fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                Span::styled(SLIDER_TRACK, style)
            }
        })
        .collect::<Vec<_>>();

    Line::from(spans)
}

fn feedback_lines(result: &RoundResult) -> Vec<Line<'static>> {
    let direction = PitchDirection::from_error(result.error_cents);
    let delta_style = if result.delta_score >= 0 {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(format!(
            "Error {:+.1} cents ({direction})   ",
            result.error_cents
        )),
        Span::styled(format!("{:+} pts", result.delta_score), delta_style),
        Span::raw(format!(
            "   {:.1}s{}",
            result.time_seconds,
            if result.auto_submitted { " (time up)" } else { "" }
        )),
    ])];
    lines.extend(
        result
            .contributions
            .iter()
            .map(|c| Line::from(Span::styled(format!("  {c}"), Style::default().add_modifier(Modifier::DIM)))),
    );
    lines
}

pub fn render_exam(app: &App, f: &mut Frame, area: Rect) {
    let Some(round) = app.session.current_round() else {
        return;
    };
    let display = app.session.display();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(4), // task
            Constraint::Length(3), // slider
            Constraint::Min(1),    // feedback
            Constraint::Length(2), // legend
        ])
        .split(area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let side = if round.tune_upper { "UPPER" } else { "LOWER" };
    let task = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{}  {}", round.interval.name.to_uppercase(), round.interval.ratio_label()),
            bold.fg(Color::Cyan),
        )),
        Line::from(format!(
            "You tune the {side} note. The other note holds at {:.2} Hz.",
            round.base_freq_hz
        )),
        Line::from(Span::styled(
            if app.session.is_playing() {
                "Listen for the beats to slow and the combination tone to lock in."
            } else if display.phase == ExamPhase::InProgress {
                "Press (p)lay to hear the interval; the round clock starts then."
            } else {
                "Round scored."
            },
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(task, chunks[0]);

    let slider_area = chunks[1];
    let slider = Paragraph::new(slider_line(
        slider_area.width.saturating_sub(2) as usize,
        app.session.slider_value(),
        display.hint_window,
    ))
    .block(Block::default().borders(Borders::ALL).title("slider"));
    f.render_widget(slider, slider_area);

    let feedback = match display.last_result {
        Some(ref result) => feedback_lines(result),
        None => Vec::new(),
    };
    f.render_widget(Paragraph::new(feedback).wrap(Wrap { trim: false }), chunks[2]);

    let legend = if display.phase == ExamPhase::InProgress {
        "(p)lay / (←→) fine / (↑↓) coarse / (h)int / (enter) done / (x) silence / (esc)ape"
    } else {
        "(n)ext round / (esc)ape"
    };
    f.render_widget(
        Paragraph::new(Span::styled(legend, Style::default().add_modifier(Modifier::ITALIC))),
        chunks[3],
    );
}

pub fn render_results(app: &App, f: &mut Frame, area: Rect) {
    let summary = app.session.summary();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(4), // headline
            Constraint::Min(6),    // chart
            Constraint::Length(summary.per_interval.len().min(8) as u16 + 2),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let verdict = if summary.passed {
        Span::styled("PASS", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("NOT PASSED", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    };
    let started = summary
        .started_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let headline = Paragraph::new(vec![
        Line::from(vec![
            Span::raw(format!("{} / 100   ", format_score(summary.normalized_score))),
            verdict,
        ]),
        Line::from(format!(
            "{} pts over {} rounds   {} hints   {} timed out",
            summary.total_points, summary.rounds_scored, summary.hints_used, summary.auto_submitted
        )),
        Line::from(format!(
            "mean |error| {:.1} cents   sd {:.1} cents   started {started}",
            summary.mean_abs_error_cents.unwrap_or(0.0),
            summary.error_std_dev_cents.unwrap_or(0.0),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    let points: Vec<(f64, f64)> = app
        .session
        .results()
        .map(|r| ((r.round_index + 1) as f64, r.error_cents))
        .collect();
    let (rounds, bound) = charting::compute_chart_params(&points);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let datasets = vec![Dataset::default()
        .marker(Marker::Dot)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Scatter)
        .data(&points)];
    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("round")
                .bounds([1.0, rounds])
                .labels(vec![
                    Span::styled("1", bold),
                    Span::styled(charting::format_label(rounds), bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("cents")
                .bounds([-bound, bound])
                .labels(vec![
                    Span::styled(charting::format_label(-bound), bold),
                    Span::styled("0", bold),
                    Span::styled(charting::format_label(bound), bold),
                ]),
        );
    f.render_widget(chart, chunks[1]);

    let breakdown: Vec<Line> = summary
        .per_interval
        .iter()
        .map(|b| {
            Line::from(format!(
                "{:<32} {:>3} rounds   {:>5.1} cents",
                b.name, b.rounds, b.mean_abs_error_cents
            ))
        })
        .collect();
    f.render_widget(
        Paragraph::new(breakdown).block(Block::default().borders(Borders::ALL).title("by interval")),
        chunks[2],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            "(r)estart with same intervals / (s)elect intervals / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[3],
    );
}
