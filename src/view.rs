use std::collections::BTreeMap;

use crate::presenter::Presenter;
use crate::stats::{SessionMetrics, StatsRecord};
use crate::target::{Target, TargetId};

/// What the terminal needs to draw one target
#[derive(Debug, Clone, PartialEq)]
pub struct TargetView {
    pub target: Target,
    pub capturing: bool,
}

/// Presentation-side mirror built purely from controller callbacks
#[derive(Debug, Default, Clone)]
pub struct GameView {
    pub targets: BTreeMap<TargetId, TargetView>,
    pub target_count: usize,
    pub score: u32,
    pub elapsed_seconds: u32,
    pub final_metrics: Option<SessionMetrics>,
    /// Most recent first
    pub history: Vec<StatsRecord>,
}

impl GameView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recent(&self, n: usize) -> &[StatsRecord] {
        &self.history[..n.min(self.history.len())]
    }
}

impl Presenter for GameView {
    fn on_target_spawned(&mut self, target: &Target) {
        self.targets.insert(
            target.id,
            TargetView {
                target: target.clone(),
                capturing: false,
            },
        );
    }

    fn on_target_removed(&mut self, id: TargetId) {
        self.targets.remove(&id);
    }

    fn on_capture_started(&mut self, id: TargetId) {
        if let Some(view) = self.targets.get_mut(&id) {
            view.capturing = true;
        }
    }

    fn on_capture_cancelled(&mut self, id: TargetId) {
        if let Some(view) = self.targets.get_mut(&id) {
            view.capturing = false;
        }
    }

    fn on_target_count_changed(&mut self, count: usize) {
        self.target_count = count;
    }

    fn on_score_changed(&mut self, score: u32) {
        self.score = score;
        if score == 0 {
            self.final_metrics = None;
        }
    }

    fn on_time_changed(&mut self, elapsed_seconds: u32) {
        self.elapsed_seconds = elapsed_seconds;
    }

    fn on_session_ended(&mut self, metrics: &SessionMetrics) {
        self.final_metrics = Some(*metrics);
    }

    fn on_stats_updated(&mut self, records: &[StatsRecord]) {
        self.history = records.to_vec();
    }
}
