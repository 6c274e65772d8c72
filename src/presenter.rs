use crate::stats::{SessionMetrics, StatsRecord};
use crate::target::{Target, TargetId};

/// Callbacks the session core drives. The core never reads state back from
/// the presentation side; every method defaults to a no-op.
pub trait Presenter {
    fn on_target_spawned(&mut self, _target: &Target) {}
    fn on_target_removed(&mut self, _id: TargetId) {}
    fn on_capture_started(&mut self, _id: TargetId) {}
    fn on_capture_cancelled(&mut self, _id: TargetId) {}
    fn on_target_count_changed(&mut self, _count: usize) {}
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_time_changed(&mut self, _elapsed_seconds: u32) {}
    fn on_session_ended(&mut self, _metrics: &SessionMetrics) {}
    /// Most recent first
    fn on_stats_updated(&mut self, _records: &[StatsRecord]) {}
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

impl<T: Presenter + ?Sized> Presenter for &mut T {
    fn on_target_spawned(&mut self, target: &Target) {
        (**self).on_target_spawned(target)
    }
    fn on_target_removed(&mut self, id: TargetId) {
        (**self).on_target_removed(id)
    }
    fn on_capture_started(&mut self, id: TargetId) {
        (**self).on_capture_started(id)
    }
    fn on_capture_cancelled(&mut self, id: TargetId) {
        (**self).on_capture_cancelled(id)
    }
    fn on_target_count_changed(&mut self, count: usize) {
        (**self).on_target_count_changed(count)
    }
    fn on_score_changed(&mut self, score: u32) {
        (**self).on_score_changed(score)
    }
    fn on_time_changed(&mut self, elapsed_seconds: u32) {
        (**self).on_time_changed(elapsed_seconds)
    }
    fn on_session_ended(&mut self, metrics: &SessionMetrics) {
        (**self).on_session_ended(metrics)
    }
    fn on_stats_updated(&mut self, records: &[StatsRecord]) {
        (**self).on_stats_updated(records)
    }
}
