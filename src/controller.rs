use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info};

use crate::capture::{CaptureEngine, Transition};
use crate::geometry::Point;
use crate::input::{AimMapper, FixedCenterAim, OrientationPermission, OrientationSample};
use crate::persistence::Persistence;
use crate::presenter::Presenter;
use crate::scheduler::{TimerEvent, TimerId, TimerQueue};
use crate::session::{SessionConfig, SessionPhase, SessionState};
use crate::spawner::Spawner;
use crate::stats::{ClearConfirmation, SessionMetrics, StatsRecord, StatsStore};
use crate::target::{Target, TargetId};

/// Source of the wall-clock time stamped on stats records
pub trait WallClock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Owns one play session at a time: the clock, the spawner, the capture
/// engine, the live targets and the history they feed.
///
/// Every method takes the current monotonic time; due timers are fired
/// in order by [`SessionController::advance_to`].
pub struct SessionController<P: Persistence, V: Presenter> {
    config: SessionConfig,
    state: SessionState,
    targets: Vec<Target>,
    spawner: Spawner,
    engine: CaptureEngine,
    timers: TimerQueue,
    pending_captures: HashMap<TargetId, TimerId>,
    stats: StatsStore<P>,
    presenter: V,
    aim: Box<dyn AimMapper>,
    permission: OrientationPermission,
    wall_clock: Box<dyn WallClock>,
    last_metrics: Option<SessionMetrics>,
}

impl<P: Persistence, V: Presenter> SessionController<P, V> {
    pub fn new(config: SessionConfig, stats: StatsStore<P>, mut presenter: V) -> Self {
        let spawner = match config.seed {
            Some(seed) => Spawner::seeded(config.spawn, seed),
            None => Spawner::new(config.spawn),
        };
        let engine = CaptureEngine::new(config.capture_radius, config.capture_hold);
        presenter.on_stats_updated(&stats.recent(stats.len()));

        Self {
            state: SessionState::new(config.viewport),
            config,
            targets: Vec::new(),
            spawner,
            engine,
            timers: TimerQueue::new(),
            pending_captures: HashMap::new(),
            stats,
            presenter,
            aim: Box::new(FixedCenterAim),
            permission: OrientationPermission::Unsupported,
            wall_clock: Box::new(SystemClock),
            last_metrics: None,
        }
    }

    pub fn with_wall_clock(mut self, clock: impl WallClock + 'static) -> Self {
        self.wall_clock = Box::new(clock);
        self
    }

    pub fn with_aim_mapper(mut self, mapper: impl AimMapper + 'static) -> Self {
        self.aim = Box::new(mapper);
        self
    }

    pub fn set_permission(&mut self, permission: OrientationPermission) {
        info!("orientation permission: {permission}");
        self.permission = permission;
    }

    /// Begin a fresh session. Valid from any phase; a running session is
    /// discarded without being recorded.
    pub fn start(&mut self, now: Duration) {
        self.timers.clear();
        self.pending_captures.clear();
        self.drop_all_targets();

        self.state.reset(self.config.viewport);
        self.state.phase = SessionPhase::Running;
        self.last_metrics = None;

        self.timers
            .schedule(now + self.config.clock_interval, TimerEvent::ClockTick);
        self.timers
            .schedule(now + self.config.spawn_interval, TimerEvent::Spawn);

        info!(
            "session started: limit {}s, hold {:?}, radius {}",
            self.config.duration_limit_secs, self.config.capture_hold, self.config.capture_radius
        );
        self.presenter.on_score_changed(0);
        self.presenter.on_time_changed(0);
        self.spawn_target();
    }

    /// Add one target to the live collection. No-op unless running.
    pub fn spawn_target(&mut self) -> Option<TargetId> {
        if !self.state.is_active() {
            return None;
        }
        let target = self.spawner.spawn(self.config.viewport);
        let id = target.id;
        debug!(
            "spawned target {} at ({:.0}, {:.0}) size {:.0}",
            id, target.position.x, target.position.y, target.size
        );
        self.state.spawned += 1;
        self.presenter.on_target_spawned(&target);
        self.targets.push(target);
        self.presenter.on_target_count_changed(self.targets.len());
        Some(id)
    }

    /// Fire every timer due at or before `now`
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((due, event)) = self.timers.pop_due(now) {
            match event {
                TimerEvent::ClockTick => self.on_clock_tick(due),
                TimerEvent::Spawn => {
                    self.spawn_target();
                    self.timers
                        .schedule(due + self.config.spawn_interval, TimerEvent::Spawn);
                }
                TimerEvent::CaptureComplete { target, attempt } => {
                    self.complete_capture(target, attempt, due)
                }
            }
        }
    }

    fn on_clock_tick(&mut self, at: Duration) {
        if !self.state.is_active() {
            return;
        }
        self.state.elapsed_seconds += 1;
        self.presenter.on_time_changed(self.state.elapsed_seconds);
        if self.limit_reached() {
            self.end(at);
        } else {
            self.timers
                .schedule(at + self.config.clock_interval, TimerEvent::ClockTick);
        }
    }

    fn limit_reached(&self) -> bool {
        self.state.elapsed_seconds >= self.config.duration_limit_secs
    }

    /// Orientation reading from the input source. Dropped while access is
    /// denied; otherwise the mapped aim point is rechecked.
    pub fn on_orientation(&mut self, sample: OrientationSample, now: Duration) {
        if !self.permission.allows_events() {
            debug!("orientation event ignored: permission denied");
            return;
        }
        let point = self.aim.aim_point(sample, self.config.viewport);
        self.on_aim_update(point, now);
    }

    /// Move the aim point and evaluate every live target against it
    pub fn on_aim_update(&mut self, point: Point, now: Duration) {
        self.advance_to(now);
        if !self.state.is_active() {
            return;
        }
        self.state.aim_point = point;

        let transitions = self.engine.evaluate(point, &mut self.targets, now);
        for transition in transitions {
            match transition {
                Transition::Started {
                    target,
                    attempt,
                    due_at,
                } => {
                    let timer = self
                        .timers
                        .schedule(due_at, TimerEvent::CaptureComplete { target, attempt });
                    self.pending_captures.insert(target, timer);
                    self.presenter.on_capture_started(target);
                }
                Transition::Cancelled { target, .. } => {
                    if let Some(timer) = self.pending_captures.remove(&target) {
                        self.timers.cancel(timer);
                    }
                    self.presenter.on_capture_cancelled(target);
                }
            }
        }
    }

    fn complete_capture(&mut self, id: TargetId, attempt: u64, at: Duration) {
        let Some(idx) = self.targets.iter().position(|t| t.id == id) else {
            debug!("completion for target {id} ignored: no longer live");
            return;
        };
        if !self.engine.completes(&self.targets[idx], attempt, at) {
            debug!("completion for target {id} ignored: attempt {attempt} superseded");
            return;
        }

        self.targets.remove(idx);
        self.pending_captures.remove(&id);
        self.state.score += 1;
        debug!("target {id} captured, score {}", self.state.score);

        self.presenter.on_target_removed(id);
        self.presenter.on_target_count_changed(self.targets.len());
        self.presenter.on_score_changed(self.state.score);

        if self.limit_reached() {
            self.end(at);
        }
    }

    /// Stop the session, record it and report the final numbers.
    /// No-op unless running.
    pub fn end(&mut self, now: Duration) {
        if !self.state.is_active() {
            return;
        }
        self.state.phase = SessionPhase::Ended;
        self.timers.clear();
        self.pending_captures.clear();
        self.drop_all_targets();

        let metrics = SessionMetrics::compute(self.state.score, self.state.elapsed_seconds);
        info!(
            "session ended at {:?}: {} hits in {}s ({}%, {}/min)",
            now,
            metrics.hits,
            metrics.duration_seconds,
            metrics.accuracy_percent,
            metrics.rate_per_minute
        );
        self.stats
            .append(StatsRecord::new(self.wall_clock.now(), metrics));
        self.last_metrics = Some(metrics);

        self.presenter.on_session_ended(&metrics);
        self.presenter
            .on_stats_updated(&self.stats.recent(self.stats.len()));
    }

    fn drop_all_targets(&mut self) {
        if self.targets.is_empty() {
            return;
        }
        for target in self.targets.drain(..) {
            self.presenter.on_target_removed(target.id);
        }
        self.presenter.on_target_count_changed(0);
    }

    /// Irreversibly wipe the stored history
    pub fn clear_history(&mut self, confirmation: ClearConfirmation) {
        self.stats.clear(confirmation);
        self.presenter.on_stats_updated(&[]);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> &StatsStore<P> {
        &self.stats
    }

    pub fn presenter(&self) -> &V {
        &self.presenter
    }

    pub fn last_metrics(&self) -> Option<SessionMetrics> {
        self.last_metrics
    }

    /// When the next timer is due, if any
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn pending_captures(&self) -> usize {
        self.pending_captures.len()
    }
}
