// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each group becomes its own track (`tid`). A scheduled play timer and its
//! matching fire or cancel are emitted as an async span so the debounce
//! window is visible.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use tandem_core::time::Timebase;
use tandem_core::trace::{PlayAttempt, TimerAction};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = ticks_to_us(record.at.ticks(), timebase);
        let tid = record.event.group().0;
        let instant = |name: String, cat: &str, args: Value| {
            json!({
                "ph": "i",
                "name": name,
                "cat": cat,
                "ts": ts,
                "pid": 0,
                "tid": tid,
                "s": "t",
                "args": args,
            })
        };

        match record.event {
            RecordedEvent::Visibility(e) => {
                let name = if e.intersecting { "Visible" } else { "Hidden" };
                events.push(instant(name.to_owned(), "Visibility", json!({})));
            }
            RecordedEvent::Timer(e) => {
                let (ph, name, args) = match e.action {
                    TimerAction::Scheduled { delay } => (
                        "b",
                        "PlayDelay",
                        json!({ "delay_ms": delay.to_millis(timebase) }),
                    ),
                    TimerAction::Fired => ("e", "PlayDelay", json!({ "outcome": "fired" })),
                    TimerAction::Cancelled => {
                        ("e", "PlayDelay", json!({ "outcome": "cancelled" }))
                    }
                    TimerAction::ScheduleFailed => {
                        events.push(instant("ScheduleFailed".to_owned(), "Timer", json!({})));
                        continue;
                    }
                };
                events.push(json!({
                    "ph": ph,
                    "name": name,
                    "cat": "Timer",
                    "id": tid,
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "args": args,
                }));
            }
            RecordedEvent::PlayAttempt(e) => {
                let outcome = match e.outcome {
                    PlayAttempt::Requested => "requested",
                    PlayAttempt::AlreadyPlaying => "already_playing",
                };
                events.push(instant(
                    "Play".to_owned(),
                    "Scheduler",
                    json!({ "outcome": outcome }),
                ));
            }
            RecordedEvent::HiddenPause(_) => {
                events.push(instant("HiddenPause".to_owned(), "Scheduler", json!({})));
            }
            RecordedEvent::SlaveCorrection(e) => {
                events.push(instant(
                    "SlaveCorrection".to_owned(),
                    "Sync",
                    json!({ "slave": e.slave, "from": e.from, "to": e.to }),
                ));
            }
            RecordedEvent::SlaveNotReady(e) => {
                events.push(instant(
                    "SlaveNotReady".to_owned(),
                    "Sync",
                    json!({ "slave": e.slave, "ready_state": format!("{:?}", e.ready_state) }),
                ));
            }
            RecordedEvent::Redirect(e) => {
                events.push(instant(
                    format!("Redirect:{}", e.event.as_str()),
                    "Sync",
                    json!({ "slave": e.slave }),
                ));
            }
            RecordedEvent::PlayRejected { error, .. } => {
                events.push(instant(
                    "PlayRejected".to_owned(),
                    "Diagnostic",
                    json!({ "name": error.name, "message": error.message }),
                ));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
