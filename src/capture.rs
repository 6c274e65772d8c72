use std::time::Duration;

use log::debug;

use crate::geometry::Point;
use crate::target::{CaptureState, Target, TargetId};

/// Outcome of evaluating one target against the aim point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle -> Capturing; a completion check is due at `due_at`
    Started {
        target: TargetId,
        attempt: u64,
        due_at: Duration,
    },
    /// Capturing -> Idle; the pending completion check must be cancelled
    Cancelled { target: TargetId, attempt: u64 },
}

/// Proximity evaluation and capture state transitions
#[derive(Debug, Clone)]
pub struct CaptureEngine {
    capture_radius: f64,
    hold: Duration,
    next_attempt: u64,
}

impl CaptureEngine {
    pub fn new(capture_radius: f64, hold: Duration) -> Self {
        Self {
            capture_radius,
            hold,
            next_attempt: 0,
        }
    }

    /// Evaluate every live target against `aim` in one pass.
    ///
    /// Targets already capturing and still in range are left untouched, so
    /// their original start time (and pending completion) stands.
    pub fn evaluate(&mut self, aim: Point, targets: &mut [Target], now: Duration) -> Vec<Transition> {
        let mut transitions = Vec::new();

        for target in targets.iter_mut() {
            let in_range = target.in_range(aim, self.capture_radius);

            match (in_range, target.state) {
                (true, CaptureState::Idle) => {
                    let attempt = self.next_attempt;
                    self.next_attempt += 1;
                    target.state = CaptureState::Capturing {
                        started_at: now,
                        attempt,
                    };
                    debug!("capture of target {} started at {:?}", target.id, now);
                    transitions.push(Transition::Started {
                        target: target.id,
                        attempt,
                        due_at: now + self.hold,
                    });
                }
                (false, CaptureState::Capturing { attempt, .. }) => {
                    target.state = CaptureState::Idle;
                    debug!("capture of target {} interrupted at {:?}", target.id, now);
                    transitions.push(Transition::Cancelled {
                        target: target.id,
                        attempt,
                    });
                }
                _ => {}
            }
        }

        transitions
    }

    /// A completion check is honoured only for the exact attempt it was
    /// scheduled for, and only after the full hold.
    pub fn completes(&self, target: &Target, attempt: u64, now: Duration) -> bool {
        match target.state {
            CaptureState::Capturing {
                started_at,
                attempt: current,
            } => current == attempt && now >= started_at + self.hold,
            CaptureState::Idle => false,
        }
    }
}

impl Default for CaptureEngine {
    fn default() -> Self {
        Self::new(100.0, Duration::from_millis(2000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn target_at(id: u64, x: f64, y: f64) -> Target {
        Target::new(TargetId(id), Point::new(x, y), 80.0, 0.0)
    }

    #[test]
    fn idle_in_range_starts_capture() {
        let mut engine = CaptureEngine::default();
        let mut targets = vec![target_at(1, 500.0, 500.0)];
        let now = Duration::from_millis(250);

        let transitions = engine.evaluate(Point::new(500.0, 500.0), &mut targets, now);

        assert_matches!(
            transitions.as_slice(),
            [Transition::Started { target: TargetId(1), due_at, .. }] if *due_at == Duration::from_millis(2250)
        );
        assert_eq!(targets[0].capture_started_at(), Some(now));
    }

    #[test]
    fn out_of_range_stays_idle() {
        let mut engine = CaptureEngine::default();
        let mut targets = vec![target_at(1, 0.0, 0.0)];
        let transitions = engine.evaluate(Point::new(500.0, 500.0), &mut targets, Duration::ZERO);
        assert!(transitions.is_empty());
        assert!(!targets[0].is_capturing());
    }

    #[test]
    fn leaving_range_cancels() {
        let mut engine = CaptureEngine::default();
        let mut targets = vec![target_at(1, 100.0, 100.0)];
        engine.evaluate(Point::new(100.0, 100.0), &mut targets, Duration::ZERO);

        let transitions =
            engine.evaluate(Point::new(900.0, 900.0), &mut targets, Duration::from_millis(500));

        assert_matches!(
            transitions.as_slice(),
            [Transition::Cancelled { target: TargetId(1), attempt: 0 }]
        );
        assert_eq!(targets[0].state, CaptureState::Idle);
    }

    #[test]
    fn staying_in_range_keeps_original_start() {
        let mut engine = CaptureEngine::default();
        let mut targets = vec![target_at(1, 100.0, 100.0)];
        engine.evaluate(Point::new(100.0, 100.0), &mut targets, Duration::from_millis(100));
        let transitions =
            engine.evaluate(Point::new(110.0, 100.0), &mut targets, Duration::from_millis(900));

        assert!(transitions.is_empty());
        assert_eq!(
            targets[0].capture_started_at(),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn each_attempt_gets_a_new_token() {
        let mut engine = CaptureEngine::default();
        let mut targets = vec![target_at(1, 100.0, 100.0)];
        let aim = Point::new(100.0, 100.0);
        let away = Point::new(1000.0, 1000.0);

        engine.evaluate(aim, &mut targets, Duration::ZERO);
        engine.evaluate(away, &mut targets, Duration::from_millis(10));
        let transitions = engine.evaluate(aim, &mut targets, Duration::from_millis(20));

        assert_matches!(transitions.as_slice(), [Transition::Started { attempt: 1, .. }]);
    }

    #[test]
    fn completes_requires_matching_attempt_and_full_hold() {
        let mut engine = CaptureEngine::default();
        let mut targets = vec![target_at(1, 100.0, 100.0)];
        engine.evaluate(Point::new(100.0, 100.0), &mut targets, Duration::from_millis(1000));

        assert!(!engine.completes(&targets[0], 0, Duration::from_millis(2999)));
        assert!(engine.completes(&targets[0], 0, Duration::from_millis(3000)));
        assert!(!engine.completes(&targets[0], 1, Duration::from_millis(3000)));

        targets[0].state = CaptureState::Idle;
        assert!(!engine.completes(&targets[0], 0, Duration::from_millis(5000)));
    }

    #[test]
    fn evaluates_all_targets_in_one_pass() {
        let mut engine = CaptureEngine::default();
        let mut targets = vec![
            target_at(1, 640.0, 360.0),
            target_at(2, 10.0, 10.0),
            target_at(3, 700.0, 360.0),
        ];
        let transitions = engine.evaluate(Point::new(640.0, 360.0), &mut targets, Duration::ZERO);
        assert_eq!(transitions.len(), 2);
        assert!(targets[0].is_capturing());
        assert!(!targets[1].is_capturing());
        assert!(targets[2].is_capturing());
    }
}
