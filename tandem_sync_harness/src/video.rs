// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted media element.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use tandem_core::backend::MediaElement;
use tandem_core::media::{MediaEvent, PlayError, ReadyState};

/// Index of a video within a [`SimPage`](crate::SimPage), in creation order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VideoId(pub usize);

impl fmt::Debug for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoId({})", self.0)
    }
}

/// Events waiting to be dispatched, shared by every video on a page.
pub(crate) type EventQueue = Rc<RefCell<VecDeque<(VideoId, MediaEvent)>>>;

struct SimState {
    id: VideoId,
    queue: EventQueue,
    paused: Cell<bool>,
    time: Cell<f64>,
    rate: Cell<f64>,
    ready: Cell<ReadyState>,
    rejection: RefCell<Option<PlayError>>,
    plays: Cell<u32>,
    pauses: Cell<u32>,
    seeks: Cell<u32>,
}

/// A media element with browser-like event behavior and scripted outcomes.
///
/// - `play` fires `play` only when the element was paused; a scripted
///   rejection leaves it paused and fires nothing.
/// - `pause` fires `pause` only when the element was playing.
/// - Every time assignment fires `seeking` followed by `timeupdate`.
///
/// Events are queued on the owning page and dispatched when it drains.
/// Clones share state.
#[derive(Clone)]
pub struct SimVideo(Rc<SimState>);

impl fmt::Debug for SimVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimVideo")
            .field("id", &self.0.id)
            .field("paused", &self.0.paused.get())
            .field("time", &self.0.time.get())
            .field("ready", &self.0.ready.get())
            .finish_non_exhaustive()
    }
}

impl SimVideo {
    pub(crate) fn new(id: VideoId, queue: EventQueue) -> Self {
        Self(Rc::new(SimState {
            id,
            queue,
            paused: Cell::new(true),
            time: Cell::new(0.0),
            rate: Cell::new(1.0),
            ready: Cell::new(ReadyState::HaveEnoughData),
            rejection: RefCell::new(None),
            plays: Cell::new(0),
            pauses: Cell::new(0),
            seeks: Cell::new(0),
        }))
    }

    /// This video's id.
    #[must_use]
    pub fn id(&self) -> VideoId {
        self.0.id
    }

    /// Number of `play` calls, successful or not.
    #[must_use]
    pub fn play_calls(&self) -> u32 {
        self.0.plays.get()
    }

    /// Number of `pause` calls.
    #[must_use]
    pub fn pause_calls(&self) -> u32 {
        self.0.pauses.get()
    }

    /// Number of time assignments.
    #[must_use]
    pub fn seek_calls(&self) -> u32 {
        self.0.seeks.get()
    }

    /// Sets the playback rate used by [`SimPage::advance`](crate::SimPage::advance).
    pub fn set_rate(&self, rate: f64) {
        self.0.rate.set(rate);
    }

    /// Sets the buffered-data level.
    pub fn set_ready_state(&self, ready: ReadyState) {
        self.0.ready.set(ready);
    }

    /// Makes every following `play` call fail with `error` until
    /// [`allow_play`](Self::allow_play).
    pub fn reject_play(&self, error: PlayError) {
        *self.0.rejection.borrow_mut() = Some(error);
    }

    /// Lets `play` calls succeed again.
    pub fn allow_play(&self) {
        self.0.rejection.borrow_mut().take();
    }

    /// Moves the playhead without firing events, as decoding does.
    pub(crate) fn play_for(&self, seconds: f64) -> bool {
        if self.0.paused.get() {
            return false;
        }
        self.0.time.set(self.0.time.get() + seconds * self.0.rate.get());
        self.fire(MediaEvent::TimeUpdate);
        true
    }

    fn fire(&self, event: MediaEvent) {
        self.0.queue.borrow_mut().push_back((self.0.id, event));
    }
}

impl MediaElement for SimVideo {
    type PlayRequest = Result<(), PlayError>;

    fn play(&self) -> Self::PlayRequest {
        self.0.plays.set(self.0.plays.get() + 1);
        if let Some(error) = self.0.rejection.borrow().as_ref() {
            return Err(error.clone());
        }
        if self.0.paused.replace(false) {
            self.fire(MediaEvent::Play);
        }
        Ok(())
    }

    fn pause(&self) {
        self.0.pauses.set(self.0.pauses.get() + 1);
        if !self.0.paused.replace(true) {
            self.fire(MediaEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.0.paused.get()
    }

    fn current_time(&self) -> f64 {
        self.0.time.get()
    }

    fn set_current_time(&self, seconds: f64) {
        self.0.seeks.set(self.0.seeks.get() + 1);
        self.0.time.set(seconds);
        self.fire(MediaEvent::Seeking);
        self.fire(MediaEvent::TimeUpdate);
    }

    fn ready_state(&self) -> ReadyState {
        self.0.ready.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> (SimVideo, EventQueue) {
        let queue = EventQueue::default();
        (SimVideo::new(VideoId(0), Rc::clone(&queue)), queue)
    }

    fn drained(queue: &EventQueue) -> alloc::vec::Vec<MediaEvent> {
        queue.borrow_mut().drain(..).map(|(_, e)| e).collect()
    }

    #[test]
    fn play_fires_only_on_state_change() {
        let (v, queue) = video();
        assert!(v.play().is_ok());
        assert!(v.play().is_ok());
        assert_eq!(v.play_calls(), 2);
        assert_eq!(drained(&queue), [MediaEvent::Play]);
    }

    #[test]
    fn pause_fires_only_when_playing() {
        let (v, queue) = video();
        v.pause();
        assert!(drained(&queue).is_empty(), "already paused");
        v.play().unwrap();
        v.pause();
        assert_eq!(drained(&queue), [MediaEvent::Play, MediaEvent::Pause]);
    }

    #[test]
    fn seek_fires_seeking_then_timeupdate() {
        let (v, queue) = video();
        v.set_current_time(4.0);
        assert_eq!(v.current_time(), 4.0);
        assert_eq!(drained(&queue), [MediaEvent::Seeking, MediaEvent::TimeUpdate]);
    }

    #[test]
    fn rejected_play_leaves_video_paused() {
        let (v, queue) = video();
        v.reject_play(PlayError::new("NotAllowedError", ""));
        assert!(v.play().is_err());
        assert!(v.is_paused());
        assert!(drained(&queue).is_empty());

        v.allow_play();
        assert!(v.play().is_ok());
        assert!(!v.is_paused());
    }

    #[test]
    fn playback_respects_rate() {
        let (v, _queue) = video();
        v.set_rate(1.5);
        assert!(!v.play_for(2.0), "paused video does not move");
        v.play().unwrap();
        assert!(v.play_for(2.0));
        assert_eq!(v.current_time(), 3.0);
    }
}
