// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` timers keyed by group.
//!
//! Each group owns one long-lived JS closure, registered once at install time.
//! Scheduling a timer hands that closure to `setTimeout`; cancelling clears the
//! returned handle. The closure is never dropped while a timeout that
//! references it is live.

use std::collections::BTreeMap;

use tandem_core::backend::Timers;
use tandem_core::group::GroupId;
use tandem_core::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::timebase;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, millis: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(handle: i32);
}

type TimerClosure = Closure<dyn FnMut()>;

/// [`Timers`] backed by the browser's `setTimeout`.
#[derive(Default)]
pub struct WebTimers {
    callbacks: BTreeMap<GroupId, TimerClosure>,
}

impl core::fmt::Debug for WebTimers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebTimers")
            .field("groups", &self.callbacks.len())
            .finish()
    }
}

impl WebTimers {
    /// Creates a timer set with no groups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the callback invoked when `group`'s timer fires.
    ///
    /// Replacing a callback while a timeout for `group` is pending is a logic
    /// error; cancel first.
    pub fn register(&mut self, group: GroupId, callback: impl FnMut() + 'static) {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        self.callbacks.insert(group, closure);
    }
}

impl Timers for WebTimers {
    /// The `setTimeout` handle.
    type Handle = i32;

    fn schedule(&mut self, group: GroupId, delay: Duration) -> Option<i32> {
        let callback = self.callbacks.get(&group)?;
        Some(set_timeout(
            callback.as_ref().unchecked_ref(),
            delay_millis(delay),
        ))
    }

    fn cancel(&mut self, handle: i32) {
        clear_timeout(handle);
    }
}

/// A delay as a `setTimeout` argument, clamped to the `i32` range.
pub(crate) fn delay_millis(delay: Duration) -> i32 {
    i32::try_from(delay.to_millis(timebase())).unwrap_or(i32::MAX)
}
