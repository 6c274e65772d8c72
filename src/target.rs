use std::fmt;
use std::time::Duration;

use crate::geometry::Point;

/// Opaque identifier, unique per spawn within one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capture progress of a single target.
///
/// The start timestamp only exists while capturing, so it can never be
/// stale on an idle target. `attempt` identifies one Idle -> Capturing
/// transition; a completion timer carries the attempt it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing { started_at: Duration, attempt: u64 },
}

/// One spawned ball
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    /// Center point
    pub position: Point,
    /// Diameter
    pub size: f64,
    /// Cosmetic hue in degrees, [0, 360)
    pub hue: f64,
    pub state: CaptureState,
}

impl Target {
    pub fn new(id: TargetId, position: Point, size: f64, hue: f64) -> Self {
        Self {
            id,
            position,
            size,
            hue,
            state: CaptureState::Idle,
        }
    }

    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    pub fn capture_started_at(&self) -> Option<Duration> {
        match self.state {
            CaptureState::Capturing { started_at, .. } => Some(started_at),
            CaptureState::Idle => None,
        }
    }

    /// Circle overlaps the capture zone of `radius` around `aim`
    pub fn in_range(&self, aim: Point, capture_radius: f64) -> bool {
        self.position.distance_to(aim) < capture_radius + self.radius()
    }
}
