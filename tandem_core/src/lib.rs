// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core state machines for grouped video playback.
//!
//! `tandem_core` keeps groups of media elements playing in lockstep and
//! starts or stops each group as it scrolls in and out of view. It is
//! `no_std` compatible (with `alloc`) and knows nothing about any host: media
//! elements, timers, and visibility are reached through the traits in
//! [`backend`].
//!
//! # Architecture
//!
//! ```text
//!   Backend (observer, timers, media events)
//!       │
//!       ├── visibility entry ──► VisibilityScheduler::on_visibility()
//!       │                             │ schedule / cancel / pause
//!       │                             ▼
//!       ├── timer fired ──────► VisibilityScheduler::on_timer_fired()
//!       │                             │ master.play()
//!       │                             ▼
//!       └── media event ──────► GroupSync::on_master_event()
//!                               GroupSync::on_slave_event()
//!                                     │ fan out to slaves / redirect to master
//!                                     ▼
//!                               MediaElement (host)
//! ```
//!
//! **[`group`]**: Group identity and master resolution.
//!
//! **[`media`]**: Ready states, media events, and play rejections.
//!
//! **[`sync`]**: [`GroupSync`](sync::GroupSync) handles master fan-out, slave
//! redirection, and drift correction.
//!
//! **[`scheduler`]**: [`VisibilityScheduler`](scheduler::VisibilityScheduler) gives
//! debounced play on entering view, immediate pause on leaving.
//!
//! **[`visibility`]**: Intersection ratios from layout rectangles via
//! `kurbo`, and threshold crossing detection.
//!
//! **[`backend`]**: The [`MediaElement`](backend::MediaElement) and
//! [`Timers`](backend::Timers) traits that host backends implement.
//!
//! **[`timer`]**: [`ManualTimers`](timer::ManualTimers), a deterministic
//! timer set for hosts without a platform.
//!
//! **[`time`]**: Host time, durations, and timebase conversion.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables trace-tier `Tracer` method bodies
//!   (one branch per call site). Play-rejection diagnostics are always on.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod group;
pub mod media;
pub mod scheduler;
pub mod sync;
pub mod time;
pub mod timer;
pub mod trace;
pub mod visibility;

#[cfg(test)]
mod testing;
