// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drift correction under mismatched playback rates.

use kurbo::{Rect, Size};
use tandem_core::group::GroupId;
use tandem_core::media::ReadyState;
use tandem_core::trace::Tracer;
use tandem_debug::recorder::{RecordedEvent, RecorderSink, decode};
use tandem_sync_harness::{DriftGrade, DriftSample, DriftTracker, SimConfig, SimPage};

fn playing_pair(slave_rate: f64) -> (SimPage, GroupId) {
    let mut page = SimPage::new(Size::new(800.0, 600.0), SimConfig::web());
    let g = page.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 2, None);
    page.members(g)[1].set_rate(slave_rate);
    page.user_play(g, 0, &mut Tracer::none());
    (page, g)
}

fn count(rec: &RecorderSink, pred: impl Fn(&RecordedEvent) -> bool) -> usize {
    decode(rec.as_bytes()).filter(|r| pred(&r.event)).count()
}

#[test]
fn fast_slave_stays_within_tolerance() {
    let (mut page, g) = playing_pair(1.1);
    let slave = page.members(g)[1].clone();
    let mut rec = RecorderSink::new();
    let mut grades = DriftTracker::<16>::new();
    let mut report = None;

    for _ in 0..40 {
        let seeks_before = slave.seek_calls();
        rec.set_time(page.now());
        page.tick(&mut Tracer::new(&mut rec));
        let drift = page.max_drift(g).unwrap();
        assert!(drift < 0.1 + 1e-6, "drift {drift} escaped the tolerance");
        report = Some(grades.observe(DriftSample {
            max_drift_ms: drift * 1000.0,
            corrections: slave.seek_calls() - seeks_before,
        }));
    }

    let report = report.unwrap();
    assert!(report.total_corrections > 0);
    assert_ne!(report.grade, DriftGrade::D);
    assert!(count(&rec, |e| matches!(e, RecordedEvent::SlaveCorrection(_))) > 0);
    assert_eq!(page.guard_trips(), 0);
}

#[test]
fn matched_rates_grade_a() {
    let (mut page, g) = playing_pair(1.0);
    let mut grades = DriftTracker::<16>::new();
    let mut report = None;

    for _ in 0..40 {
        page.tick(&mut Tracer::none());
        report = Some(grades.observe(DriftSample {
            max_drift_ms: page.max_drift(g).unwrap() * 1000.0,
            corrections: 0,
        }));
    }

    assert_eq!(report.unwrap().grade, DriftGrade::A);
    assert_eq!(page.members(g)[1].seek_calls(), 0);
}

#[test]
fn unready_slave_is_corrected_once_it_buffers() {
    let (mut page, g) = playing_pair(1.2);
    let slave = page.members(g)[1].clone();
    slave.set_ready_state(ReadyState::HaveMetadata);
    let mut rec = RecorderSink::new();

    for _ in 0..10 {
        page.tick(&mut Tracer::new(&mut rec));
    }
    assert_eq!(slave.seek_calls(), 0, "not ready yet");
    assert!(page.max_drift(g).unwrap() > 0.4);
    assert!(count(&rec, |e| matches!(e, RecordedEvent::SlaveNotReady(_))) > 0);

    slave.set_ready_state(ReadyState::HaveEnoughData);
    page.tick(&mut Tracer::new(&mut rec));

    assert_eq!(slave.seek_calls(), 1);
    assert!(page.max_drift(g).unwrap() < 1e-9);
}
