use std::io::{self, Write};

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
    Frame,
};
use snag::stats::{StatsRecord, StatsSummary};
use time_humanize::HumanTime;

use crate::{ui::key_help, App};

/// "5 minutes ago" style label relative to `now`
pub fn relative_label(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let secs = (now - timestamp).num_seconds().max(0);
    HumanTime::from_seconds(-secs).to_string()
}

fn accuracy_color(accuracy: u32) -> Color {
    if accuracy >= 30 {
        Color::Green
    } else if accuracy >= 10 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Pure presenter for a single history row
pub fn present_row(record: &StatsRecord, now: DateTime<Local>) -> Row<'static> {
    Row::new(vec![
        Cell::from(record.timestamp.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(relative_label(record.timestamp, now))
            .style(Style::default().add_modifier(Modifier::DIM)),
        Cell::from(record.hits.to_string()),
        Cell::from(format!("{}s", record.duration_seconds)),
        Cell::from(format!("{}%", record.accuracy_percent))
            .style(Style::default().fg(accuracy_color(record.accuracy_percent))),
        Cell::from(record.rate_per_minute.to_string()),
    ])
}

fn history_table(records: &[StatsRecord]) -> Table<'static> {
    let now = Local::now();
    let header = Row::new(vec!["Date", "When", "Hits", "Time", "Accuracy", "Per min"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let widths = [
        Constraint::Length(17),
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(8),
    ];
    Table::new(records.iter().map(|r| present_row(r, now)), widths)
        .header(header)
        .column_spacing(1)
}

/// Compact list of the latest sessions
pub struct RecentSessions<'a>(pub &'a [StatsRecord]);

impl Widget for RecentSessions<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Recent sessions");
        if self.0.is_empty() {
            Paragraph::new("No training sessions yet")
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
        } else {
            Widget::render(history_table(self.0).block(block), area, buf);
        }
    }
}

pub fn render_history(app: &App, f: &mut Frame) {
    let view = app.view();
    let summary = app.controller.stats().summary();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // History table
            Constraint::Length(2), // Instructions
        ])
        .split(f.area());

    let title = Paragraph::new(summary_text(&summary))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if view.history.is_empty() {
        f.render_widget(
            Paragraph::new("No training sessions yet").alignment(Alignment::Center),
            chunks[1],
        );
    } else {
        f.render_widget(history_table(&view.history), chunks[1]);
    }

    let mut help = vec![("b", "back"), ("esc", "quit")];
    if !view.history.is_empty() {
        help.insert(0, ("c", "clear history"));
    }
    f.render_widget(
        Paragraph::new(vec![Line::from(""), key_help(&help)]).alignment(Alignment::Center),
        chunks[2],
    );
}

pub fn summary_text(summary: &StatsSummary) -> String {
    format!(
        "{} sessions   {} hits total   best {}   avg {:.0}% acc   avg {:.1}/min",
        summary.sessions, summary.total_hits, summary.best_hits, summary.mean_accuracy, summary.mean_rate
    )
}

/// Plain-text table for non-interactive output, most recent first
pub fn write_table<W: Write>(
    out: &mut W,
    records: &[StatsRecord],
    summary: &StatsSummary,
) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No training sessions yet");
    }
    let now = Local::now();
    writeln!(
        out,
        "{:<17} {:<16} {:>5} {:>6} {:>8} {:>7}",
        "date", "when", "hits", "time", "accuracy", "per min"
    )?;
    for r in records {
        writeln!(
            out,
            "{:<17} {:<16} {:>5} {:>5}s {:>7}% {:>7}",
            r.timestamp.format("%Y-%m-%d %H:%M"),
            relative_label(r.timestamp, now),
            r.hits,
            r.duration_seconds,
            r.accuracy_percent,
            r.rate_per_minute
        )?;
    }
    writeln!(out)?;
    writeln!(out, "{}", summary_text(summary))
}
