// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the synchronizer and scheduler.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! synchronizer and scheduler call as they act. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. Two tiers of events
//! pass through it:
//!
//! - **Diagnostics** ([`Tracer::play_rejected`]) are always dispatched. This
//!   is the channel for unexpected play rejections.
//! - **Trace events** (visibility, timers, play attempts, slave corrections)
//!   compile to nothing unless the `trace` feature is on, in which case each
//!   call performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the trace-tier `Tracer` method bodies.

use crate::group::GroupId;
use crate::media::{MediaEvent, PlayError, ReadyState};
use crate::time::Duration;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a group's visibility crosses the threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEvent {
    /// The group whose visibility changed.
    pub group: GroupId,
    /// Whether the group is now considered visible.
    pub intersecting: bool,
}

/// What happened to a group's pending-play timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerAction {
    /// A delayed play was scheduled.
    Scheduled {
        /// Delay before the play attempt.
        delay: Duration,
    },
    /// A pending play was cancelled before firing.
    Cancelled,
    /// The delay elapsed and the timer fired.
    Fired,
    /// The host refused to schedule the timer.
    ScheduleFailed,
}

/// Emitted when a group's pending-play timer changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerEvent {
    /// The group that owns the timer.
    pub group: GroupId,
    /// What happened.
    pub action: TimerAction,
}

/// Outcome of a fired play timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayAttempt {
    /// The master was paused; `play` was invoked.
    Requested,
    /// The master was already playing; nothing was done.
    AlreadyPlaying,
}

/// Emitted when a fired timer decides whether to start the master.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayAttemptEvent {
    /// The group whose master was considered.
    pub group: GroupId,
    /// What was done.
    pub outcome: PlayAttempt,
}

/// Emitted when the scheduler pauses a master because its group left view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HiddenPauseEvent {
    /// The group that left view.
    pub group: GroupId,
}

/// Emitted when a slave's position is snapped to the master's.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlaveCorrectionEvent {
    /// The group being synchronized.
    pub group: GroupId,
    /// Slave index within the group (document order, master excluded).
    pub slave: usize,
    /// Slave position before correction, in seconds.
    pub from: f64,
    /// Master position the slave was moved to, in seconds.
    pub to: f64,
}

/// Emitted when a drifting slave cannot be corrected yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlaveNotReadyEvent {
    /// The group being synchronized.
    pub group: GroupId,
    /// Slave index within the group.
    pub slave: usize,
    /// The slave's ready state at the time of the check.
    pub ready_state: ReadyState,
}

/// Emitted when an interaction on a slave is redirected to the master.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RedirectEvent {
    /// The group being synchronized.
    pub group: GroupId,
    /// Slave index that received the interaction.
    pub slave: usize,
    /// The slave event that was redirected.
    pub event: MediaEvent,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace and diagnostic events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a group's visibility changes.
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        _ = e;
    }

    /// Called when a pending-play timer is scheduled, cancelled, or fires.
    fn on_timer(&mut self, e: &TimerEvent) {
        _ = e;
    }

    /// Called when a fired timer decides whether to play.
    fn on_play_attempt(&mut self, e: &PlayAttemptEvent) {
        _ = e;
    }

    /// Called when a master is paused because its group left view.
    fn on_hidden_pause(&mut self, e: &HiddenPauseEvent) {
        _ = e;
    }

    /// Called when a slave is snapped to the master position.
    fn on_slave_correction(&mut self, e: &SlaveCorrectionEvent) {
        _ = e;
    }

    /// Called when a drifting slave lacks data for a correction.
    fn on_slave_not_ready(&mut self, e: &SlaveNotReadyEvent) {
        _ = e;
    }

    /// Called when a slave interaction is redirected to the master.
    fn on_redirect(&mut self, e: &RedirectEvent) {
        _ = e;
    }

    /// Diagnostic: a play request failed for a reason other than being
    /// superseded.
    fn on_play_rejected(&mut self, group: GroupId, error: &PlayError) {
        _ = (group, error);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

/// Expands to a trace-tier `Tracer` method whose body only exists with the
/// `trace` feature.
macro_rules! trace_tier {
    ($(#[$doc:meta])* $name:ident, $event:ty, $hook:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    trace_tier!(
        /// Emits a [`VisibilityEvent`].
        visibility,
        VisibilityEvent,
        on_visibility
    );
    trace_tier!(
        /// Emits a [`TimerEvent`].
        timer,
        TimerEvent,
        on_timer
    );
    trace_tier!(
        /// Emits a [`PlayAttemptEvent`].
        play_attempt,
        PlayAttemptEvent,
        on_play_attempt
    );
    trace_tier!(
        /// Emits a [`HiddenPauseEvent`].
        hidden_pause,
        HiddenPauseEvent,
        on_hidden_pause
    );
    trace_tier!(
        /// Emits a [`SlaveCorrectionEvent`].
        slave_correction,
        SlaveCorrectionEvent,
        on_slave_correction
    );
    trace_tier!(
        /// Emits a [`SlaveNotReadyEvent`].
        slave_not_ready,
        SlaveNotReadyEvent,
        on_slave_not_ready
    );
    trace_tier!(
        /// Emits a [`RedirectEvent`].
        redirect,
        RedirectEvent,
        on_redirect
    );

    /// Reports an unexpected play rejection. Always dispatched.
    #[inline]
    pub fn play_rejected(&mut self, group: GroupId, error: &PlayError) {
        if let Some(s) = &mut self.sink {
            s.on_play_rejected(group, error);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
