// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Tandem splits host-specific work into *backend* crates. Each backend
//! provides the following pieces:
//!
//! - **Media**: Implements [`MediaElement`] over the host's native media
//!   object (e.g. `HTMLVideoElement`). Handles are cheap to clone and share
//!   interior state with the host, so every method takes `&self`.
//!
//! - **Timers**: Implements [`Timers`] over a cancellable one-shot timer
//!   (e.g. `setTimeout` / `clearTimeout`). When a timer elapses the backend
//!   calls [`VisibilityScheduler::on_timer_fired`] for its group.
//!
//! - **Visibility**: Delivers per-group intersecting/not-intersecting
//!   transitions to [`VisibilityScheduler::on_visibility`] (e.g. from an
//!   `IntersectionObserver`).
//!
//! - **Events**: Forwards each member's `play`, `pause`, `timeupdate`, and
//!   `seeking` events to [`GroupSync`] and honors the returned
//!   [`EventResponse`](crate::media::EventResponse).
//!
//! - **Time**: `now() -> HostTime` and `timebase() -> Timebase` free
//!   functions that read the platform's monotonic clock.
//!
//! # Crate boundaries
//!
//! `tandem_core` owns the data model, the synchronizer, the scheduler, and
//! this contract module. Backend crates depend on `tandem_core` and provide
//! platform glue. Hosts without a platform (tests, simulations) use
//! [`ManualTimers`](crate::timer::ManualTimers) and a scripted media type.
//!
//! [`VisibilityScheduler::on_timer_fired`]: crate::scheduler::VisibilityScheduler::on_timer_fired
//! [`VisibilityScheduler::on_visibility`]: crate::scheduler::VisibilityScheduler::on_visibility
//! [`GroupSync`]: crate::sync::GroupSync

use crate::group::GroupId;
use crate::media::ReadyState;
use crate::time::Duration;

/// A controllable media element.
///
/// `play` is asynchronous on every real host: it returns a
/// [`PlayRequest`](Self::PlayRequest) that settles later. The synchronizer
/// drops it; the scheduler hands it back to the backend so rejections can be
/// routed to [`report_play_rejection`](crate::scheduler::report_play_rejection).
pub trait MediaElement {
    /// The host's handle to an in-flight play request.
    type PlayRequest;

    /// Requests playback.
    fn play(&self) -> Self::PlayRequest;

    /// Pauses playback. Always succeeds.
    fn pause(&self);

    /// Returns `true` while the element is paused.
    fn is_paused(&self) -> bool;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Seeks to `seconds`. Always succeeds.
    fn set_current_time(&self, seconds: f64);

    /// How much data the element has buffered.
    fn ready_state(&self) -> ReadyState;
}

/// Cancellable one-shot timers keyed by group.
///
/// The scheduler is the only caller and keeps at most one live handle per
/// group, cancelling it before scheduling a replacement.
pub trait Timers {
    /// Handle used to cancel a scheduled timer.
    type Handle;

    /// Schedules a one-shot timer that fires for `group` after `delay`.
    ///
    /// Returns `None` if the host could not schedule the timer.
    fn schedule(&mut self, group: GroupId, delay: Duration) -> Option<Self::Handle>;

    /// Cancels a timer so it never fires.
    fn cancel(&mut self, handle: Self::Handle);
}
