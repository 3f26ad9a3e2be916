// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each prefixed by a tag byte and the
//! sink's current time. [`decode`] reads them back as an iterator of
//! [`Record`].
//!
//! Play-rejection records carry the exception name and message as
//! length-prefixed UTF-8.

use tandem_core::group::GroupId;
use tandem_core::media::{MediaEvent, PlayError, ReadyState};
use tandem_core::time::{Duration, HostTime};
use tandem_core::trace::{
    HiddenPauseEvent, PlayAttempt, PlayAttemptEvent, RedirectEvent, SlaveCorrectionEvent,
    SlaveNotReadyEvent, TimerAction, TimerEvent, TraceSink, VisibilityEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_VISIBILITY: u8 = 1;
const TAG_TIMER: u8 = 2;
const TAG_PLAY_ATTEMPT: u8 = 3;
const TAG_HIDDEN_PAUSE: u8 = 4;
const TAG_SLAVE_CORRECTION: u8 = 5;
const TAG_SLAVE_NOT_READY: u8 = 6;
const TAG_REDIRECT: u8 = 7;
const TAG_PLAY_REJECTED: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
    now: HostTime,
}

impl RecorderSink {
    /// Creates an empty recorder with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time stamped on subsequent records.
    pub fn set_time(&mut self, now: HostTime) {
        self.now = now;
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8, group: GroupId) {
        self.write_u8(tag);
        self.write_u64(self.now.ticks());
        self.write_u32(group.0);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_index(&mut self, v: usize) {
        self.write_u32(u32::try_from(v).unwrap_or(u32::MAX));
    }

    fn write_str(&mut self, s: &str) {
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_media_event(&mut self, e: MediaEvent) {
        self.write_u8(match e {
            MediaEvent::Play => 0,
            MediaEvent::Pause => 1,
            MediaEvent::TimeUpdate => 2,
            MediaEvent::Seeking => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.begin(TAG_VISIBILITY, e.group);
        self.write_u8(u8::from(e.intersecting));
    }

    fn on_timer(&mut self, e: &TimerEvent) {
        self.begin(TAG_TIMER, e.group);
        let (code, delay) = match e.action {
            TimerAction::Scheduled { delay } => (0, delay.ticks()),
            TimerAction::Cancelled => (1, 0),
            TimerAction::Fired => (2, 0),
            TimerAction::ScheduleFailed => (3, 0),
        };
        self.write_u8(code);
        self.write_u64(delay);
    }

    fn on_play_attempt(&mut self, e: &PlayAttemptEvent) {
        self.begin(TAG_PLAY_ATTEMPT, e.group);
        self.write_u8(match e.outcome {
            PlayAttempt::Requested => 0,
            PlayAttempt::AlreadyPlaying => 1,
        });
    }

    fn on_hidden_pause(&mut self, e: &HiddenPauseEvent) {
        self.begin(TAG_HIDDEN_PAUSE, e.group);
    }

    fn on_slave_correction(&mut self, e: &SlaveCorrectionEvent) {
        self.begin(TAG_SLAVE_CORRECTION, e.group);
        self.write_index(e.slave);
        self.write_f64(e.from);
        self.write_f64(e.to);
    }

    fn on_slave_not_ready(&mut self, e: &SlaveNotReadyEvent) {
        self.begin(TAG_SLAVE_NOT_READY, e.group);
        self.write_index(e.slave);
        self.write_u8(e.ready_state as u8);
    }

    fn on_redirect(&mut self, e: &RedirectEvent) {
        self.begin(TAG_REDIRECT, e.group);
        self.write_index(e.slave);
        self.write_media_event(e.event);
    }

    fn on_play_rejected(&mut self, group: GroupId, error: &PlayError) {
        self.begin(TAG_PLAY_REJECTED, group);
        self.write_str(&error.name);
        self.write_str(&error.message);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`VisibilityEvent`].
    Visibility(VisibilityEvent),
    /// A [`TimerEvent`].
    Timer(TimerEvent),
    /// A [`PlayAttemptEvent`].
    PlayAttempt(PlayAttemptEvent),
    /// A [`HiddenPauseEvent`].
    HiddenPause(HiddenPauseEvent),
    /// A [`SlaveCorrectionEvent`].
    SlaveCorrection(SlaveCorrectionEvent),
    /// A [`SlaveNotReadyEvent`].
    SlaveNotReady(SlaveNotReadyEvent),
    /// A [`RedirectEvent`].
    Redirect(RedirectEvent),
    /// A play-rejection diagnostic.
    PlayRejected {
        /// The group whose master was refused.
        group: GroupId,
        /// The rejection.
        error: PlayError,
    },
}

impl RecordedEvent {
    /// The group the event belongs to.
    #[must_use]
    pub fn group(&self) -> GroupId {
        match self {
            Self::Visibility(e) => e.group,
            Self::Timer(e) => e.group,
            Self::PlayAttempt(e) => e.group,
            Self::HiddenPause(e) => e.group,
            Self::SlaveCorrection(e) => e.group,
            Self::SlaveNotReady(e) => e.group,
            Self::Redirect(e) => e.group,
            Self::PlayRejected { group, .. } => *group,
        }
    }
}

/// A decoded event and the time it was recorded at.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The recorder's clock when the event arrived.
    pub at: HostTime,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecodeIter<'a> {
    fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_index(&mut self) -> Option<usize> {
        usize::try_from(self.read_u32()?).ok()
    }

    fn read_str(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        String::from_utf8(self.read_bytes(len)?.to_vec()).ok()
    }

    fn read_group(&mut self) -> Option<GroupId> {
        Some(GroupId(self.read_u32()?))
    }

    fn read_media_event(&mut self) -> Option<MediaEvent> {
        Some(match self.read_u8()? {
            0 => MediaEvent::Play,
            1 => MediaEvent::Pause,
            2 => MediaEvent::TimeUpdate,
            _ => MediaEvent::Seeking,
        })
    }

    fn decode_timer(&mut self, group: GroupId) -> Option<RecordedEvent> {
        let code = self.read_u8()?;
        let delay = Duration(self.read_u64()?);
        let action = match code {
            0 => TimerAction::Scheduled { delay },
            1 => TimerAction::Cancelled,
            2 => TimerAction::Fired,
            _ => TimerAction::ScheduleFailed,
        };
        Some(RecordedEvent::Timer(TimerEvent { group, action }))
    }

    fn decode_body(&mut self, tag: u8, group: GroupId) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_VISIBILITY => RecordedEvent::Visibility(VisibilityEvent {
                group,
                intersecting: self.read_u8()? != 0,
            }),
            TAG_TIMER => return self.decode_timer(group),
            TAG_PLAY_ATTEMPT => RecordedEvent::PlayAttempt(PlayAttemptEvent {
                group,
                outcome: match self.read_u8()? {
                    0 => PlayAttempt::Requested,
                    _ => PlayAttempt::AlreadyPlaying,
                },
            }),
            TAG_HIDDEN_PAUSE => RecordedEvent::HiddenPause(HiddenPauseEvent { group }),
            TAG_SLAVE_CORRECTION => RecordedEvent::SlaveCorrection(SlaveCorrectionEvent {
                group,
                slave: self.read_index()?,
                from: self.read_f64()?,
                to: self.read_f64()?,
            }),
            TAG_SLAVE_NOT_READY => RecordedEvent::SlaveNotReady(SlaveNotReadyEvent {
                group,
                slave: self.read_index()?,
                ready_state: ReadyState::from_raw(u16::from(self.read_u8()?)),
            }),
            TAG_REDIRECT => RecordedEvent::Redirect(RedirectEvent {
                group,
                slave: self.read_index()?,
                event: self.read_media_event()?,
            }),
            TAG_PLAY_REJECTED => {
                let name = self.read_str()?;
                let message = self.read_str()?;
                RecordedEvent::PlayRejected {
                    group,
                    error: PlayError::new(name, message),
                }
            }
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at = HostTime(self.read_u64()?);
        let group = self.read_group()?;
        // Unknown tags and truncated records stop iteration.
        let event = self.decode_body(tag, group)?;
        Some(Record { at, event })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
