//! A logical timeline of single-shot timers.
//!
//! Nothing here sleeps. The owner moves time forward with [`Scheduler::pop_due`]
//! and [`Scheduler::advance_to`]; the terminal front end feeds it wall-clock
//! time and tests feed it whatever they like.

use std::time::Duration;

use log::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TimerKind {
    /// The computer's reply, after its thinking delay.
    OpponentMove,
    /// One second off the side to move.
    ClockTick,
    /// One second off the untimed game's soft move timer.
    MoveTimerTick,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Timer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub due: Duration,
    /// Generation of the state the timer was armed against.
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, kind: TimerKind, delay: Duration, generation: u64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay;
        debug!("scheduled {:?} #{} at {:?}", kind, id.0, due);
        self.pending.push(Timer {
            id,
            kind,
            due,
            generation,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        let cancelled = self.pending.len() != before;
        if cancelled {
            debug!("cancelled timer #{}", id.0);
        }
        cancelled
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            debug!("cancelled {} pending timers", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    pub fn pending(&self) -> &[Timer] {
        &self.pending
    }

    pub fn pending_of(&self, kind: TimerKind) -> usize {
        self.pending.iter().filter(|timer| timer.kind == kind).count()
    }

    /// Removes and returns the earliest timer due at or before `until`,
    /// moving the current time up to its due time. Timers due together fire
    /// in the order they were scheduled.
    pub fn pop_due(&mut self, until: Duration) -> Option<Timer> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(index, _)| index)?;

        let timer = self.pending.remove(index);
        if timer.due > self.now {
            self.now = timer.due;
        }
        Some(timer)
    }

    pub fn advance_to(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}
