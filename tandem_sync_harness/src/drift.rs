// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drift metrics and grading.

use alloc::string::String;

/// Per-tick sample fed into [`DriftTracker::observe`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DriftSample {
    /// Largest slave-to-master offset this tick, in ms.
    pub max_drift_ms: f64,
    /// Slave corrections performed this tick.
    pub corrections: u32,
}

/// Letter grade for synchronization quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriftGrade {
    /// Tight sync and rare corrections.
    A,
    /// Within tolerance with moderate corrections.
    B,
    /// Visibly out of step at times.
    C,
    /// Poor sync.
    D,
}

impl DriftGrade {
    /// Returns a short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`DriftTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct DriftReport {
    /// Current grade.
    pub grade: DriftGrade,
    /// Largest drift in the history window, in ms.
    pub peak_drift_ms: f64,
    /// Corrections per 1000 observed ticks.
    pub corrections_per_1000: f64,
    /// Total ticks observed.
    pub total_ticks: u64,
    /// Total corrections observed.
    pub total_corrections: u64,
}

/// Rolling drift tracker with a fixed-size history.
#[derive(Debug)]
pub struct DriftTracker<const N: usize> {
    drifts_ms: [f64; N],
    cursor: usize,
    total_ticks: u64,
    total_corrections: u64,
}

impl<const N: usize> Default for DriftTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DriftTracker<N> {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drifts_ms: [0.0; N],
            cursor: 0,
            total_ticks: 0,
            total_corrections: 0,
        }
    }

    /// Observes one tick and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, sample: DriftSample) -> DriftReport {
        self.total_ticks = self.total_ticks.saturating_add(1);
        self.total_corrections = self
            .total_corrections
            .saturating_add(u64::from(sample.corrections));
        self.drifts_ms[self.cursor % N] = sample.max_drift_ms.abs();
        self.cursor = (self.cursor + 1) % N;

        let rate = self.total_corrections as f64 * 1000.0 / self.total_ticks as f64;
        let peak = self.drifts_ms.iter().copied().fold(0.0, f64::max);

        DriftReport {
            grade: grade_for(peak, rate),
            peak_drift_ms: peak,
            corrections_per_1000: rate,
            total_ticks: self.total_ticks,
            total_corrections: self.total_corrections,
        }
    }

    /// Returns the drift history oldest→newest.
    #[must_use]
    pub fn history(&self) -> [f64; N] {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.drifts_ms[(self.cursor + i) % N];
        }
        out
    }

    /// Returns an ASCII sparkline over [`history`](Self::history).
    #[must_use]
    pub fn sparkline_ascii(&self, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        self.history()
            .iter()
            .map(|v| {
                let t = v.clamp(0.0, max_ms) / max_ms;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "index is clamped to ASCII level count"
                )]
                let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
                LEVELS[level] as char
            })
            .collect()
    }
}

/// Thresholds sit around the 100 ms correction tolerance.
fn grade_for(peak_drift_ms: f64, corrections_per_1000: f64) -> DriftGrade {
    if peak_drift_ms < 50.0 && corrections_per_1000 < 50.0 {
        DriftGrade::A
    } else if peak_drift_ms <= 100.0 && corrections_per_1000 < 200.0 {
        DriftGrade::B
    } else if peak_drift_ms < 250.0 && corrections_per_1000 < 500.0 {
        DriftGrade::C
    } else {
        DriftGrade::D
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(max_drift_ms: f64, corrections: u32) -> DriftSample {
        DriftSample {
            max_drift_ms,
            corrections,
        }
    }

    #[test]
    fn steady_sync_grades_a() {
        let mut t = DriftTracker::<8>::new();
        let mut report = t.observe(sample(0.0, 0));
        for _ in 0..20 {
            report = t.observe(sample(12.0, 0));
        }
        assert_eq!(report.grade, DriftGrade::A);
        assert_eq!(report.total_ticks, 21);
    }

    #[test]
    fn correction_rate_accumulates() {
        let mut t = DriftTracker::<4>::new();
        let mut last = None;
        for i in 0..10 {
            last = Some(t.observe(sample(5.0, u32::from(i < 2))));
        }
        let report = last.unwrap();
        assert!((report.corrections_per_1000 - 200.0).abs() < 1e-6);
        assert_eq!(report.grade, DriftGrade::C, "rate 200/1000 is past B");
    }

    #[test]
    fn peak_drops_out_of_the_window() {
        let mut t = DriftTracker::<2>::new();
        assert_eq!(t.observe(sample(300.0, 0)).grade, DriftGrade::D);
        let _ = t.observe(sample(10.0, 0));
        let report = t.observe(sample(10.0, 0));
        assert_eq!(report.peak_drift_ms, 10.0);
    }

    #[test]
    fn sparkline_has_one_char_per_slot() {
        let mut t = DriftTracker::<4>::new();
        let _ = t.observe(sample(100.0, 0));
        let line = t.sparkline_ascii(100.0);
        assert_eq!(line.len(), 4);
        assert!(line.ends_with('@'), "newest sample is at full scale: {line:?}");
    }
}
