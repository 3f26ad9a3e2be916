// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport intersection geometry.
//!
//! Hosts with a native intersection observer report ratios directly. Hosts
//! without one (the simulation harness, tests) compute them here from layout
//! rectangles and feed them through a [`VisibilityTracker`], which turns a
//! stream of ratios into threshold crossings.

use kurbo::Rect;

/// Fraction of `target`'s area that lies inside `root`, in `0.0..=1.0`.
///
/// A zero-area target counts as fully visible when it touches `root` and
/// invisible otherwise.
#[must_use]
pub fn intersection_ratio(target: Rect, root: Rect) -> f64 {
    let target = target.abs();
    let root = root.abs();
    let touches = target.x0 <= root.x1
        && root.x0 <= target.x1
        && target.y0 <= root.y1
        && root.y0 <= target.y1;
    if !touches {
        return 0.0;
    }

    let area = target.area();
    if area <= 0.0 {
        return 1.0;
    }
    (target.intersect(root).area() / area).clamp(0.0, 1.0)
}

/// Edge detector over intersection ratios for one target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityTracker {
    threshold: f64,
    last: Option<bool>,
}

impl VisibilityTracker {
    /// A tracker that considers a target visible at or above `threshold`.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last: None,
        }
    }

    /// The configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The last reported state, if any ratio has been observed.
    #[must_use]
    pub const fn is_intersecting(&self) -> Option<bool> {
        self.last
    }

    /// Feeds a new ratio. Returns the new state when it differs from the last
    /// reported one; the first observation is always reported.
    pub fn update(&mut self, ratio: f64) -> Option<bool> {
        let now = ratio >= self.threshold;
        if self.last == Some(now) {
            return None;
        }
        self.last = Some(now);
        Some(now)
    }

    /// Forgets the last state so the next update reports unconditionally.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
