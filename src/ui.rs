pub mod arena;
pub mod charting;
pub mod history;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
    Frame,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn key_help(pairs: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let groups = pairs.iter().map(|(key, action)| {
        vec![
            Span::styled(format!("({key})"), key_style),
            Span::styled(format!(" {action}"), dim),
        ]
    });
    let spans = Itertools::intersperse(groups, vec![Span::raw("   ")])
        .flatten()
        .collect_vec();
    Line::from(spans)
}

/// Title, a short blurb and the last three sessions
pub struct StartPanel<'a>(pub &'a App);

impl Widget for StartPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let config = app.controller.config();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Span::styled(
            "snag",
            bold_style.fg(Color::Magenta),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let mut blurb = vec![Line::from(format!(
            "Hold targets inside the aim zone for {:.1}s to capture them. Session length {}s.",
            config.capture_hold.as_secs_f64(),
            config.duration_limit_secs
        ))];
        if !app.permission.allows_events() {
            blurb.push(Line::from(Span::styled(
                "Orientation access denied: targets cannot be captured this run.",
                Style::default().fg(Color::Yellow),
            )));
        }
        Paragraph::new(blurb)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        history::RecentSessions(app.view().recent(3)).render(chunks[2], buf);

        Paragraph::new(key_help(&[
            ("enter", "start"),
            ("h", "history"),
            ("esc", "quit"),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }
}

/// Final numbers plus the rate trend over past sessions
pub struct ResultsPanel<'a>(pub &'a App);

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.0.view();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),    // chart
                Constraint::Length(1), // stats
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ])
            .split(area);

        // oldest to newest, one point per session
        let points: Vec<(f64, f64)> = view
            .history
            .iter()
            .rev()
            .enumerate()
            .map(|(i, r)| ((i + 1) as f64, r.rate_per_minute as f64))
            .collect();
        let (sessions, highest_rate) = charting::compute_chart_params(&points);

        let datasets = vec![Dataset::default()
            .marker(Marker::Braille)
            .style(magenta_style)
            .graph_type(GraphType::Line)
            .data(&points)];

        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title("session")
                    .bounds([1.0, sessions])
                    .labels(vec![
                        Span::styled("1", bold_style),
                        Span::styled(charting::format_label(sessions), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("per min")
                    .bounds([0.0, highest_rate])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(charting::format_label(highest_rate), bold_style),
                    ]),
            )
            .render(chunks[0], buf);

        let summary = match view.final_metrics {
            Some(m) => format!(
                "{} hits   {}s   {}% acc   {}/min",
                m.hits, m.duration_seconds, m.accuracy_percent, m.rate_per_minute
            ),
            None => String::from("no result"),
        };
        Paragraph::new(Span::styled(summary, bold_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(key_help(&[
            ("r", "restart"),
            ("h", "history"),
            ("esc", "quit"),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }
}

/// y/N prompt shown before wiping the history
pub struct ConfirmClearPanel<'a>(pub &'a App);

impl Widget for ConfirmClearPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.0.view().history.len();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Clear all {count} recorded sessions?"),
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            key_help(&[("y", "clear forever"), ("any other key", "keep")]),
        ])
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }
}

/// Status line shown above the arena
pub fn status_line(app: &App) -> Line<'static> {
    let view = app.view();
    let limit = app.controller.config().duration_limit_secs;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled(format!("time {}/{}s", view.elapsed_seconds, limit), bold_style),
        Span::raw("   "),
        Span::styled(
            format!("hits {}", view.score),
            bold_style.fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(format!("targets {}", view.target_count), bold_style),
    ])
}
