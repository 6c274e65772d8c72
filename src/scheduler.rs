use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

use crate::target::TargetId;

/// Everything the session schedules for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Hold duration for one capture attempt has elapsed
    CaptureComplete { target: TargetId, attempt: u64 },
    /// One clock unit elapsed
    ClockTick,
    /// Spawn interval elapsed
    Spawn,
}

impl TimerEvent {
    // Lower fires first when due at the same instant
    fn rank(&self) -> u8 {
        match self {
            TimerEvent::CaptureComplete { .. } => 0,
            TimerEvent::ClockTick => 1,
            TimerEvent::Spawn => 2,
        }
    }
}

/// Handle returned by [`TimerQueue::schedule`], used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    due: Duration,
    rank: u8,
    seq: u64,
    event: TimerEvent,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.rank, self.seq).cmp(&(other.due, other.rank, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-threaded timer queue.
///
/// Entries fire in (due, kind, scheduling order). Cancellation is lazy:
/// cancelled ids are dropped when they reach the front of the heap, and a
/// cancelled timer is never returned from [`TimerQueue::pop_due`].
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    pending: HashSet<u64>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, event: TimerEvent) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(seq);
        self.heap.push(Reverse(Entry {
            due,
            rank: event.rank(),
            seq,
            event,
        }));
        TimerId(seq)
    }

    /// Returns false when the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id.0)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains(&id.0)
    }

    /// Pop the earliest live timer due at or before `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerEvent)> {
        while let Some(Reverse(head)) = self.heap.peek() {
            if !self.pending.contains(&head.seq) {
                self.heap.pop();
                continue;
            }
            if head.due > now {
                return None;
            }
            let Reverse(entry) = self.heap.pop()?;
            self.pending.remove(&entry.seq);
            return Some((entry.due, entry.event));
        }
        None
    }

    /// Due time of the earliest live timer
    pub fn next_due(&self) -> Option<Duration> {
        self.heap
            .iter()
            .filter(|Reverse(e)| self.pending.contains(&e.seq))
            .map(|Reverse(e)| e.due)
            .min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(300), TimerEvent::Spawn);
        q.schedule(ms(100), TimerEvent::ClockTick);
        q.schedule(ms(200), TimerEvent::Spawn);

        assert_eq!(q.pop_due(ms(1000)), Some((ms(100), TimerEvent::ClockTick)));
        assert_eq!(q.pop_due(ms(1000)), Some((ms(200), TimerEvent::Spawn)));
        assert_eq!(q.pop_due(ms(1000)), Some((ms(300), TimerEvent::Spawn)));
        assert_eq!(q.pop_due(ms(1000)), None);
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut q = TimerQueue::new();
        q.schedule(ms(100), TimerEvent::ClockTick);
        assert_eq!(q.pop_due(ms(99)), None);
        assert_eq!(q.len(), 1);
        assert!(q.pop_due(ms(100)).is_some());
        assert!(q.is_empty());
    }

    #[test]
    fn completions_fire_before_ticks_at_same_instant() {
        let mut q = TimerQueue::new();
        let complete = TimerEvent::CaptureComplete {
            target: TargetId(1),
            attempt: 0,
        };
        q.schedule(ms(1000), TimerEvent::Spawn);
        q.schedule(ms(1000), TimerEvent::ClockTick);
        q.schedule(ms(1000), complete);

        assert_eq!(q.pop_due(ms(1000)).map(|(_, e)| e), Some(complete));
        assert_eq!(
            q.pop_due(ms(1000)).map(|(_, e)| e),
            Some(TimerEvent::ClockTick)
        );
        assert_eq!(q.pop_due(ms(1000)).map(|(_, e)| e), Some(TimerEvent::Spawn));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(10), TimerEvent::Spawn);
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.is_pending(id));
        assert!(!q.cancel(id));
        assert_eq!(q.pop_due(ms(1000)), None);
        assert_eq!(q.next_due(), None);
    }

    #[test]
    fn next_due_skips_cancelled() {
        let mut q = TimerQueue::new();
        let early = q.schedule(ms(10), TimerEvent::Spawn);
        q.schedule(ms(50), TimerEvent::ClockTick);
        q.cancel(early);
        assert_eq!(q.next_due(), Some(ms(50)));
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(10), TimerEvent::Spawn);
        q.schedule(ms(20), TimerEvent::ClockTick);
        q.clear();
        assert!(q.is_empty());
        assert!(!q.is_pending(id));
        assert_eq!(q.pop_due(ms(1000)), None);
    }
}
