use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use snag::{
    controller::SessionController,
    geometry::Viewport,
    input::OrientationSample,
    persistence::MemoryPersistence,
    runtime::{Runner, SnagEvent, TestEventSource},
    session::{SessionConfig, SessionPhase},
    stats::StatsStore,
    view::GameView,
};

// Headless integration using the internal runtime + controller without a TTY.
// Time is simulated: every runner step advances the session clock by one tick.
const TICK: Duration = Duration::from_millis(50);

fn small_session(limit: u32) -> SessionController<MemoryPersistence, GameView> {
    let config = SessionConfig {
        duration_limit_secs: limit,
        viewport: Viewport::new(200.0, 200.0),
        seed: Some(17),
        ..SessionConfig::default()
    };
    SessionController::new(config, StatsStore::open(MemoryPersistence::new()), GameView::new())
}

fn tilt_for(key: KeyCode) -> Option<OrientationSample> {
    match key {
        KeyCode::Up => Some(OrientationSample::new(-10.0, 0.0)),
        KeyCode::Down => Some(OrientationSample::new(10.0, 0.0)),
        KeyCode::Left => Some(OrientationSample::new(0.0, -10.0)),
        KeyCode::Right => Some(OrientationSample::new(0.0, 10.0)),
        _ => None,
    }
}

#[test]
fn headless_session_captures_and_ends() {
    let mut controller = small_session(5);
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        Duration::from_millis(1),
    );

    // Producer: one tilt up front triggers the first capture check
    tx.send(SnagEvent::Key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE)))
        .unwrap();

    let mut now = Duration::ZERO;
    controller.start(now);

    for _ in 0..1000u32 {
        now += TICK;
        match runner.step() {
            SnagEvent::Tick => controller.advance_to(now),
            SnagEvent::Resize => {}
            SnagEvent::Key(key) => {
                if let Some(sample) = tilt_for(key.code) {
                    controller.on_orientation(sample, now);
                }
            }
        }
        if controller.phase() == SessionPhase::Ended {
            break;
        }
    }

    assert_eq!(controller.phase(), SessionPhase::Ended);
    let view = controller.presenter();
    assert_eq!(view.score, 1);
    assert_eq!(view.elapsed_seconds, 5);
    assert!(view.targets.is_empty());
    let metrics = view.final_metrics.expect("session reported final metrics");
    assert_eq!(metrics.hits, 1);
    assert_eq!(metrics.accuracy_percent, 20);
    assert_eq!(metrics.rate_per_minute, 12);
    assert_eq!(view.history.len(), 1);
}

#[test]
fn headless_steady_tilting_keeps_capturing() {
    let mut controller = small_session(20);
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        Duration::from_millis(1),
    );

    let mut now = Duration::ZERO;
    controller.start(now);

    for step in 0..2000u32 {
        now += TICK;
        // a tilt every half second
        if step % 10 == 0 {
            tx.send(SnagEvent::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)))
                .unwrap();
        }
        match runner.step() {
            SnagEvent::Key(key) => {
                if let Some(sample) = tilt_for(key.code) {
                    controller.on_orientation(sample, now);
                }
            }
            _ => controller.advance_to(now),
        }
        if controller.phase() == SessionPhase::Ended {
            break;
        }
    }

    let view = controller.presenter();
    assert_eq!(controller.phase(), SessionPhase::Ended);
    // targets spawn every 2s and every one is in range
    assert!(view.score >= 8, "score {}", view.score);
    assert!(view.score <= controller.state().spawned);
}

#[test]
fn headless_no_input_means_no_captures() {
    let mut controller = small_session(3);
    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        Duration::from_millis(1),
    );

    let mut now = Duration::ZERO;
    controller.start(now);
    while controller.phase() == SessionPhase::Running {
        now += TICK;
        if let SnagEvent::Tick = runner.step() {
            controller.advance_to(now);
        }
    }

    let view = controller.presenter();
    assert_eq!(view.score, 0);
    assert_eq!(view.final_metrics.map(|m| m.hits), Some(0));
}
