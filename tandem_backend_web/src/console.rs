// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console as a [`TraceSink`].

use tandem_core::group::GroupId;
use tandem_core::media::PlayError;
use tandem_core::trace::TraceSink;
#[cfg(feature = "trace")]
use tandem_core::trace::{
    HiddenPauseEvent, PlayAttemptEvent, RedirectEvent, SlaveCorrectionEvent, SlaveNotReadyEvent,
    TimerEvent, VisibilityEvent,
};
use wasm_bindgen::JsValue;
use web_sys::console;

/// Prefix of every play-rejection diagnostic.
pub(crate) const PLAY_ERROR_LABEL: &str = "Video Playback Error:";

/// Writes play rejections to `console.error`.
///
/// With the `trace` feature, trace-tier events are also written to
/// `console.debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

#[cfg(feature = "trace")]
fn debug(line: &str) {
    console::debug_1(&JsValue::from_str(line));
}

impl TraceSink for ConsoleSink {
    fn on_play_rejected(&mut self, group: GroupId, error: &PlayError) {
        console::error_3(
            &JsValue::from_str(PLAY_ERROR_LABEL),
            &JsValue::from_str(&error.to_string()),
            &JsValue::from(group.0),
        );
    }

    #[cfg(feature = "trace")]
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        debug(&format!("tandem: {:?} intersecting={}", e.group, e.intersecting));
    }

    #[cfg(feature = "trace")]
    fn on_timer(&mut self, e: &TimerEvent) {
        debug(&format!("tandem: {:?} timer {:?}", e.group, e.action));
    }

    #[cfg(feature = "trace")]
    fn on_play_attempt(&mut self, e: &PlayAttemptEvent) {
        debug(&format!("tandem: {:?} play {:?}", e.group, e.outcome));
    }

    #[cfg(feature = "trace")]
    fn on_hidden_pause(&mut self, e: &HiddenPauseEvent) {
        debug(&format!("tandem: {:?} paused (hidden)", e.group));
    }

    #[cfg(feature = "trace")]
    fn on_slave_correction(&mut self, e: &SlaveCorrectionEvent) {
        debug(&format!(
            "tandem: {:?} slave {} {:.3}s -> {:.3}s",
            e.group, e.slave, e.from, e.to
        ));
    }

    #[cfg(feature = "trace")]
    fn on_slave_not_ready(&mut self, e: &SlaveNotReadyEvent) {
        debug(&format!(
            "tandem: {:?} slave {} not ready ({:?})",
            e.group, e.slave, e.ready_state
        ));
    }

    #[cfg(feature = "trace")]
    fn on_redirect(&mut self, e: &RedirectEvent) {
        debug(&format!(
            "tandem: {:?} slave {} {} -> master",
            e.group,
            e.slave,
            e.event.as_str()
        ));
    }
}
