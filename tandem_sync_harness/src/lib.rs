// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic simulation, drift metrics, and grading for tandem.
//!
//! - [`SimVideo`]: a scripted [`MediaElement`](tandem_core::backend::MediaElement)
//!   with browser-like event rules.
//! - [`SimPage`]: groups laid out on a page under a scrolling viewport, with
//!   manual timers and an event queue.
//! - [`DriftTracker`]: rolling drift history and an A–D grade.
//!
//! ```rust,ignore
//! let mut page = SimPage::new(Size::new(800.0, 600.0), SimConfig::web());
//! let group = page.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 3, None);
//! page.observe(&mut Tracer::none());
//! page.advance(Duration::from_millis(200, Timebase::MICROS), &mut Tracer::none());
//! assert!(!page.master(group).unwrap().is_paused());
//! ```

#![no_std]

extern crate alloc;

mod drift;
mod page;
mod video;

pub use drift::{DriftGrade, DriftReport, DriftSample, DriftTracker};
pub use page::{SimConfig, SimPage};
pub use video::{SimVideo, VideoId};
