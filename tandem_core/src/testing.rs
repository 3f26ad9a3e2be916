// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Media double shared by unit tests. Records calls, never fires events.

use alloc::rc::Rc;
use core::cell::Cell;

use crate::backend::MediaElement;
use crate::media::ReadyState;

#[derive(Clone, Default)]
pub(crate) struct Probe(pub(crate) Rc<ProbeState>);

#[derive(Default)]
pub(crate) struct ProbeState {
    pub(crate) paused: Cell<bool>,
    pub(crate) time: Cell<f64>,
    pub(crate) ready: Cell<u16>,
    pub(crate) plays: Cell<u32>,
    pub(crate) pauses: Cell<u32>,
    pub(crate) seeks: Cell<u32>,
}

impl Probe {
    /// A paused element at `time` with raw ready state `ready`.
    pub(crate) fn at(time: f64, ready: u16) -> Self {
        let p = Self::default();
        p.0.paused.set(true);
        p.0.time.set(time);
        p.0.ready.set(ready);
        p
    }
}

impl MediaElement for Probe {
    type PlayRequest = ();

    fn play(&self) -> Self::PlayRequest {
        self.0.plays.set(self.0.plays.get() + 1);
        self.0.paused.set(false);
    }

    fn pause(&self) {
        self.0.pauses.set(self.0.pauses.get() + 1);
        self.0.paused.set(true);
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
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_raw(self.0.ready.get())
    }
}
