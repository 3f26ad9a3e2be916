// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic timers driven by a caller-advanced clock.
//!
//! [`ManualTimers`] implements [`Timers`] without a platform. The owner moves
//! time forward explicitly and drains due timers one at a time with
//! [`pop_due`](ManualTimers::pop_due), so a fired callback may schedule or
//! cancel further timers before the next one is popped.
//!
//! ```rust,ignore
//! while let Some(group) = timers.pop_due(until) {
//!     scheduler.on_timer_fired(group, &master, &mut tracer);
//! }
//! timers.advance_to(until);
//! ```

use alloc::vec::Vec;
use core::fmt;

use crate::backend::Timers;
use crate::group::GroupId;
use crate::time::{Duration, HostTime};

/// Handle to a timer scheduled on [`ManualTimers`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    id: TimerId,
    group: GroupId,
    deadline: HostTime,
}

/// One-shot timers against a manual clock.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: HostTime,
    next_id: u64,
    pending: Vec<PendingTimer>,
    scheduled: u64,
    cancelled: u64,
}

impl ManualTimers {
    /// Creates an empty timer set with the clock at `start`.
    #[must_use]
    pub fn new(start: HostTime) -> Self {
        Self {
            now: start,
            ..Self::default()
        }
    }

    /// The current clock value.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// Removes and returns the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    ///
    /// Timers with equal deadlines fire in scheduling order.
    pub fn pop_due(&mut self, until: HostTime) -> Option<GroupId> {
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.id))?;
        let timer = self.pending.remove(pos);
        if timer.deadline > self.now {
            self.now = timer.deadline;
        }
        Some(timer.group)
    }

    /// Moves the clock forward to `until` without firing anything.
    ///
    /// The clock never moves backwards.
    pub fn advance_to(&mut self, until: HostTime) {
        if until > self.now {
            self.now = until;
        }
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if `id` is scheduled and has not fired or been cancelled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.pending.iter().map(|t| t.deadline).min()
    }

    /// Total timers scheduled so far.
    #[must_use]
    pub fn scheduled_count(&self) -> u64 {
        self.scheduled
    }

    /// Total timers cancelled before firing.
    #[must_use]
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl Timers for ManualTimers {
    type Handle = TimerId;

    fn schedule(&mut self, group: GroupId, delay: Duration) -> Option<TimerId> {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer {
            id,
            group,
            deadline: self.now.saturating_add(delay),
        });
        self.scheduled += 1;
        Some(id)
    }

    fn cancel(&mut self, handle: TimerId) {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}
