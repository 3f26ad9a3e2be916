// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scheduling and synchronization on a simulated page.

use kurbo::{Rect, Size};
use tandem_core::backend::MediaElement;
use tandem_core::group::GroupId;
use tandem_core::media::PlayError;
use tandem_core::scheduler::GroupPhase;
use tandem_core::time::{Duration, Timebase};
use tandem_core::trace::{PlayAttempt, PlayAttemptEvent, TimerAction, TimerEvent, Tracer};
use tandem_debug::recorder::{RecordedEvent, RecorderSink, decode};
use tandem_sync_harness::{SimConfig, SimPage};

const VIEWPORT: Size = Size::new(800.0, 600.0);

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis, Timebase::MICROS)
}

/// A page with one group in view and one far below the fold.
fn two_group_page(members: usize) -> (SimPage, GroupId, GroupId) {
    let mut page = SimPage::new(VIEWPORT, SimConfig::web());
    let top = page.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), members, None);
    let below = page.add_group(Rect::new(0.0, 2000.0, 800.0, 2300.0), members, None);
    (page, top, below)
}

fn events(rec: &RecorderSink) -> Vec<RecordedEvent> {
    decode(rec.as_bytes()).map(|r| r.event).collect()
}

fn play_requests(rec: &RecorderSink, group: GroupId) -> usize {
    events(rec)
        .iter()
        .filter(|e| {
            matches!(e, RecordedEvent::PlayAttempt(PlayAttemptEvent {
                group: g,
                outcome: PlayAttempt::Requested,
            }) if *g == group)
        })
        .count()
}

fn rejections(rec: &RecorderSink) -> Vec<GroupId> {
    events(rec)
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::PlayRejected { group, .. } => Some(*group),
            _ => None,
        })
        .collect()
}

#[test]
fn flicker_into_view_never_plays() {
    let (mut page, _, below) = two_group_page(3);
    let mut rec = RecorderSink::new();

    page.observe(&mut Tracer::new(&mut rec));
    page.scroll_to(1900.0, &mut Tracer::new(&mut rec));
    page.advance(ms(150), &mut Tracer::new(&mut rec));
    rec.set_time(page.now());
    page.scroll_to(0.0, &mut Tracer::new(&mut rec));
    page.advance(ms(2_000), &mut Tracer::new(&mut rec));

    let master = page.master(below).unwrap();
    assert_eq!(master.play_calls(), 0);
    assert!(master.is_paused());
    assert!(master.pause_calls() >= 1, "leaving view pauses");
    assert!(page.members(below).iter().all(|v| v.play_calls() == 0));
    assert_eq!(play_requests(&rec, below), 0);
    assert!(events(&rec).contains(&RecordedEvent::Timer(TimerEvent {
        group: below,
        action: TimerAction::Cancelled,
    })));
    assert_eq!(page.phase(below), Some(&GroupPhase::Idle));
}

#[test]
fn sustained_visibility_plays_once() {
    let (mut page, top, _) = two_group_page(3);
    let mut rec = RecorderSink::new();

    page.observe(&mut Tracer::new(&mut rec));
    assert!(page.has_pending(top));
    assert_eq!(page.advance(ms(199), &mut Tracer::new(&mut rec)), 0);
    assert!(page.master(top).unwrap().is_paused());

    assert_eq!(page.advance(ms(1), &mut Tracer::new(&mut rec)), 1);
    page.advance(ms(1_000), &mut Tracer::new(&mut rec));

    assert_eq!(play_requests(&rec, top), 1);
    assert!(!page.has_pending(top));
    assert_eq!(page.phase(top), Some(&GroupPhase::Playing));
    for member in page.members(top) {
        assert!(!member.is_paused(), "{member:?} follows the master");
    }
    for slave in page.sync(top).unwrap().slaves() {
        assert_eq!(slave.play_calls(), 1, "one fan-out per master play event");
    }
}

#[test]
fn superseded_play_is_silent_and_others_are_logged_once() {
    let (mut page, top, below) = two_group_page(2);
    page.master(top).unwrap().reject_play(PlayError::aborted());
    page.master(below)
        .unwrap()
        .reject_play(PlayError::new("NotAllowedError", "autoplay blocked"));
    let mut rec = RecorderSink::new();

    page.observe(&mut Tracer::new(&mut rec));
    page.advance(ms(500), &mut Tracer::new(&mut rec));
    assert!(rejections(&rec).is_empty(), "AbortError is expected");

    page.scroll_to(1900.0, &mut Tracer::new(&mut rec));
    page.advance(ms(500), &mut Tracer::new(&mut rec));
    page.advance(ms(5_000), &mut Tracer::new(&mut rec));

    assert_eq!(rejections(&rec), [below]);
    assert!(page.master(below).unwrap().is_paused(), "no retry");
}

#[test]
fn groups_schedule_independently() {
    let mut page = SimPage::new(VIEWPORT, SimConfig::web());
    let first = page.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 2, None);
    let second = page.add_group(Rect::new(0.0, 400.0, 800.0, 700.0), 2, None);

    page.observe(&mut Tracer::none());
    assert!(page.has_pending(first));
    assert!(page.has_pending(second));

    page.advance(ms(100), &mut Tracer::none());
    page.scroll_to(350.0, &mut Tracer::none());
    assert!(!page.has_pending(first), "first left view");
    assert!(page.has_pending(second), "second never crossed the threshold");

    page.advance(ms(200), &mut Tracer::none());
    assert_eq!(page.master(first).unwrap().play_calls(), 0);
    assert!(!page.master(second).unwrap().is_paused());
    assert_eq!(page.timers().cancelled_count(), 1);
}

#[test]
fn single_member_group_is_left_alone() {
    let mut page = SimPage::new(VIEWPORT, SimConfig::web());
    let lone = page.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 1, None);

    page.observe(&mut Tracer::none());
    page.advance(ms(1_000), &mut Tracer::none());
    page.scroll_to(5_000.0, &mut Tracer::none());
    page.advance(ms(1_000), &mut Tracer::none());

    let video = &page.members(lone)[0];
    assert_eq!(video.play_calls(), 0);
    assert_eq!(video.pause_calls(), 0);
    assert_eq!(page.timers().scheduled_count(), 0);
}

#[test]
fn slave_play_drives_the_whole_group() {
    let mut page = SimPage::new(VIEWPORT, SimConfig::web());
    let g = page.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 3, Some(0));

    page.user_seek(g, 1, 30.0, &mut Tracer::none());
    assert_eq!(page.master(g).unwrap().current_time(), 30.0, "slave seek moves master");
    assert!(page.master(g).unwrap().is_paused(), "slave seek does not resume");

    page.user_play(g, 1, &mut Tracer::none());

    assert!(page.prevented_defaults() >= 1);
    let master = page.master(g).unwrap();
    assert!(!master.is_paused());
    assert_eq!(master.current_time(), 30.0);
    assert!(page.members(g).iter().all(|v| !v.is_paused()));
    assert_eq!(page.guard_trips(), 0);
}

#[test]
fn slave_pause_pauses_everyone() {
    let mut page = SimPage::new(VIEWPORT, SimConfig::web());
    let g = page.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 3, None);
    page.user_play(g, 0, &mut Tracer::none());
    assert!(page.members(g).iter().all(|v| !v.is_paused()));

    page.user_pause(g, 2, &mut Tracer::none());

    assert!(page.members(g).iter().all(|v| v.is_paused()));
}
