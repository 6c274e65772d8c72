use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::{ui::status_line, App};

/// Arm length of the aim crosshair, in play-area units
const CROSSHAIR: f64 = 12.0;

/// Pure HSL (full saturation, fixed lightness) to RGB
pub fn hue_color(hue: f64) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let (l, s) = (0.55, 1.0);
    let c = (1.0 - (2.0 * l - 1.0_f64).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(to_byte(r), to_byte(g), to_byte(b))
}

pub fn render_arena(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    f.render_widget(
        Paragraph::new(status_line(app)).alignment(Alignment::Center),
        chunks[0],
    );

    let view = app.view();
    let config = app.controller.config();
    let (width, height) = (config.viewport.width, config.viewport.height);
    let aim = app.controller.state().aim_point;
    let radius = config.capture_radius;

    // canvas y grows upwards, the play area's grows downwards
    let flip = move |y: f64| height - y;

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: aim.x,
                y: flip(aim.y),
                radius,
                color: Color::DarkGray,
            });
            ctx.draw(&CanvasLine {
                x1: aim.x - CROSSHAIR,
                y1: flip(aim.y),
                x2: aim.x + CROSSHAIR,
                y2: flip(aim.y),
                color: Color::White,
            });
            ctx.draw(&CanvasLine {
                x1: aim.x,
                y1: flip(aim.y) - CROSSHAIR,
                x2: aim.x,
                y2: flip(aim.y) + CROSSHAIR,
                color: Color::White,
            });
            ctx.layer();
            for tv in view.targets.values() {
                let color = if tv.capturing {
                    Color::White
                } else {
                    hue_color(tv.target.hue)
                };
                ctx.draw(&Circle {
                    x: tv.target.position.x,
                    y: flip(tv.target.position.y),
                    radius: tv.target.radius(),
                    color,
                });
            }
        });
    f.render_widget(canvas, chunks[1]);

    let hint = if app.permission.allows_events() {
        "arrows/space tilt to recheck   (esc) quit"
    } else {
        "orientation access denied   (esc) quit"
    };
    f.render_widget(
        Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[2],
    );
}
