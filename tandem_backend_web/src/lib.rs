// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for tandem.
//!
//! This crate wires `tandem_core` to browser APIs:
//!
//! - [`WebVideo`]: [`MediaElement`] over `HTMLVideoElement`
//! - [`WebTimers`]: [`Timers`] over `setTimeout` / `clearTimeout`
//! - [`Selectors`] and [`discover`]: markup conventions and group discovery
//! - [`ConsoleSink`]: play-rejection diagnostics on `console.error`
//! - [`install`] / [`install_when_ready`]: one-call page setup that attaches
//!   media listeners and an `IntersectionObserver` to every group
//!
//! ```rust,ignore
//! #[wasm_bindgen(start)]
//! pub fn main() -> Result<(), JsValue> {
//!     tandem_backend_web::install_when_ready()
//! }
//! ```

mod console;
mod dom;
mod install;
mod media;
mod timers;

pub use console::ConsoleSink;
pub use dom::{DiscoveredGroup, Selectors, discover};
pub use install::{Installation, install, install_when_ready, install_with};
pub use media::{WebVideo, play_error};
pub use tandem_core::backend::{MediaElement, Timers};
pub use timers::WebTimers;

use tandem_core::time::{HostTime, Timebase};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;
}

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    HostTime(millis_to_ticks(performance_now()))
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

fn millis_to_ticks(ms: f64) -> u64 {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    us
}
