use std::time::Duration;

use strum_macros::Display;

use crate::geometry::{Point, Viewport};
use crate::spawner::SpawnConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Session ends once this many clock units have elapsed
    pub duration_limit_secs: u32,
    pub clock_interval: Duration,
    pub spawn_interval: Duration,
    /// Continuous in-range time needed to capture
    pub capture_hold: Duration,
    pub capture_radius: f64,
    pub spawn: SpawnConfig,
    pub viewport: Viewport,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_limit_secs: 120,
            clock_interval: Duration::from_secs(1),
            spawn_interval: Duration::from_secs(2),
            capture_hold: Duration::from_millis(2000),
            capture_radius: 100.0,
            spawn: SpawnConfig::default(),
            viewport: Viewport::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionPhase {
    NotStarted,
    Running,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub elapsed_seconds: u32,
    pub score: u32,
    /// Targets created since the last start
    pub spawned: u32,
    pub aim_point: Point,
}

impl SessionState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            elapsed_seconds: 0,
            score: 0,
            spawned: 0,
            aim_point: viewport.center(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn reset(&mut self, viewport: Viewport) {
        *self = Self::new(viewport);
    }
}
