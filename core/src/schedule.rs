use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::Epoch;

/// Period of the elapsed-time clock.
pub const TICK_PERIOD_MS: u32 = 1000;

/// How long a mismatched pair stays face-up before turning back down.
pub const MISMATCH_DELAY_MS: u32 = 1000;

/// Event delivered back to the engine when a scheduled timer fires.
///
/// Carries the epoch of the game that scheduled it, see [`crate::Engine::handle_timer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    Tick(Epoch),
    MismatchReset(Epoch),
}

impl TimerEvent {
    pub const fn epoch(self) -> Epoch {
        match self {
            Self::Tick(epoch) | Self::MismatchReset(epoch) => epoch,
        }
    }
}

/// Clock port the engine uses to request timer events.
///
/// Implementations deliver each event by calling [`crate::Engine::handle_timer`] when it is due.
pub trait Scheduler {
    /// Fire `event` every `period_ms` until cleared, replacing any interval already running.
    fn set_interval(&mut self, period_ms: u32, event: TimerEvent);

    /// Stop the running interval, if any.
    fn clear_interval(&mut self);

    /// Fire `event` once after `delay_ms`.
    fn set_timeout(&mut self, delay_ms: u32, event: TimerEvent);
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct IntervalEntry {
    period_ms: u32,
    next_due_ms: u64,
    event: TimerEvent,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct TimeoutEntry {
    due_ms: u64,
    event: TimerEvent,
}

/// Virtual-time scheduler, nothing fires until time is advanced explicitly.
///
/// Used by tests and headless hosts to drive the engine deterministically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManualScheduler {
    now_ms: u64,
    interval: Option<IntervalEntry>,
    timeouts: Vec<TimeoutEntry>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn has_interval(&self) -> bool {
        self.interval.is_some()
    }

    pub fn pending_timeouts(&self) -> usize {
        self.timeouts.len()
    }

    /// Pops the earliest event due at or before `until_ms` and moves the clock to its due time.
    ///
    /// On ties the interval fires before timeouts, timeouts fire in the order they were set.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerEvent> {
        let next_timeout = self
            .timeouts
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_ms <= until_ms)
            .min_by_key(|&(index, entry)| (entry.due_ms, index))
            .map(|(index, entry)| (index, entry.due_ms));

        let interval_due = self
            .interval
            .map(|entry| entry.next_due_ms)
            .filter(|&due_ms| due_ms <= until_ms);

        match (interval_due, next_timeout) {
            (Some(due_ms), Some((_, timeout_due_ms))) if due_ms <= timeout_due_ms => {
                self.fire_interval()
            }
            (Some(_), None) => self.fire_interval(),
            (_, Some((index, due_ms))) => {
                self.now_ms = self.now_ms.max(due_ms);
                Some(self.timeouts.remove(index).event)
            }
            (None, None) => None,
        }
    }

    /// Moves the clock forward without firing anything.
    pub(crate) fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn fire_interval(&mut self) -> Option<TimerEvent> {
        let entry = self.interval.as_mut()?;
        self.now_ms = self.now_ms.max(entry.next_due_ms);
        entry.next_due_ms += u64::from(entry.period_ms.max(1));
        Some(entry.event)
    }
}

impl Scheduler for ManualScheduler {
    fn set_interval(&mut self, period_ms: u32, event: TimerEvent) {
        self.interval = Some(IntervalEntry {
            period_ms,
            next_due_ms: self.now_ms + u64::from(period_ms.max(1)),
            event,
        });
    }

    fn clear_interval(&mut self) {
        self.interval = None;
    }

    fn set_timeout(&mut self, delay_ms: u32, event: TimerEvent) {
        self.timeouts.push(TimeoutEntry {
            due_ms: self.now_ms + u64::from(delay_ms),
            event,
        });
    }
}
