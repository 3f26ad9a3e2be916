// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Lines are
//! stamped with the sink's current time, converted to milliseconds using a
//! [`Timebase`].

use std::io::Write;

use tandem_core::group::GroupId;
use tandem_core::media::PlayError;
use tandem_core::time::{HostTime, Timebase};
use tandem_core::trace::{
    HiddenPauseEvent, PlayAttempt, PlayAttemptEvent, RedirectEvent, SlaveCorrectionEvent,
    SlaveNotReadyEvent, TimerAction, TimerEvent, TraceSink, VisibilityEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
    now: HostTime,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), timebase)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self {
            writer,
            timebase,
            now: HostTime::default(),
        }
    }

    /// Sets the time stamped on subsequent lines.
    pub fn set_time(&mut self, now: HostTime) {
        self.now = now;
    }

    /// Consumes the sink and returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ms(&self) -> f64 {
        self.timebase.ticks_to_nanos(self.now.ticks()) as f64 / 1_000_000.0
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        let state = if e.intersecting { "visible" } else { "hidden" };
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [visibility] group={} {state}",
            self.ms(),
            e.group.0,
        );
    }

    fn on_timer(&mut self, e: &TimerEvent) {
        let action = match e.action {
            TimerAction::Scheduled { delay } => {
                format!("scheduled +{}ms", delay.to_millis(self.timebase))
            }
            TimerAction::Cancelled => "cancelled".to_owned(),
            TimerAction::Fired => "fired".to_owned(),
            TimerAction::ScheduleFailed => "SCHEDULE FAILED".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [timer] group={} {action}",
            self.ms(),
            e.group.0,
        );
    }

    fn on_play_attempt(&mut self, e: &PlayAttemptEvent) {
        let outcome = match e.outcome {
            PlayAttempt::Requested => "play()",
            PlayAttempt::AlreadyPlaying => "already playing",
        };
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [play] group={} {outcome}",
            self.ms(),
            e.group.0,
        );
    }

    fn on_hidden_pause(&mut self, e: &HiddenPauseEvent) {
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [pause] group={} left view",
            self.ms(),
            e.group.0,
        );
    }

    fn on_slave_correction(&mut self, e: &SlaveCorrectionEvent) {
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [correct] group={} slave={} {:.3}s -> {:.3}s",
            self.ms(),
            e.group.0,
            e.slave,
            e.from,
            e.to,
        );
    }

    fn on_slave_not_ready(&mut self, e: &SlaveNotReadyEvent) {
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [not-ready] group={} slave={} state={:?}",
            self.ms(),
            e.group.0,
            e.slave,
            e.ready_state,
        );
    }

    fn on_redirect(&mut self, e: &RedirectEvent) {
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [redirect] group={} slave={} {}",
            self.ms(),
            e.group.0,
            e.slave,
            e.event.as_str(),
        );
    }

    fn on_play_rejected(&mut self, group: GroupId, error: &PlayError) {
        let _ = writeln!(
            self.writer,
            "[{:>9.1}ms] [ERROR] group={} Video Playback Error: {error}",
            self.ms(),
            group.0,
        );
    }
}
