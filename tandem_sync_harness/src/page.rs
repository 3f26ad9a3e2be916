// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic simulated page.
//!
//! [`SimPage`] plays the role of the browser: it owns the videos, lays groups
//! out on a vertical page, tracks a scrolling viewport, runs the debounce
//! timers against a manual clock, and dispatches queued media events to each
//! group's [`GroupSync`].
//!
//! ```text
//!   scroll_to() ──► intersection_ratio() ──► VisibilityTracker ──► on_visibility()
//!   advance()   ──► ManualTimers::pop_due() ──► on_timer_fired() ──► play()
//!               └─► playback ──► timeupdate ─┐
//!   user_*()    ──► play/pause/seek ─────────┤
//!                                            ▼
//!                         event queue ──► GroupSync handlers ──► more events
//! ```
//!
//! Every operation drains the event queue until it is empty or the loop guard
//! trips.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::{Rect, Size};
use tandem_core::backend::MediaElement;
use tandem_core::group::{GroupId, Member};
use tandem_core::media::{EventResponse, MediaEvent};
use tandem_core::scheduler::{
    GroupPhase, VisibilityConfig, VisibilityScheduler, report_play_rejection,
};
use tandem_core::sync::{GroupSync, SyncConfig};
use tandem_core::time::{Duration, HostTime, Timebase};
use tandem_core::timer::{ManualTimers, TimerId};
use tandem_core::trace::Tracer;
use tandem_core::visibility::{VisibilityTracker, intersection_ratio};

use crate::video::{EventQueue, SimVideo, VideoId};

/// Configuration for a [`SimPage`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    /// Synchronizer settings.
    pub sync: SyncConfig,
    /// Scheduler settings.
    pub visibility: VisibilityConfig,
    /// Clock advance per [`SimPage::tick`]; also the `timeupdate` cadence.
    pub frame: Duration,
    /// Maximum events dispatched per drain before the loop guard trips.
    pub max_events_per_drain: usize,
}

impl SimConfig {
    /// Browser defaults with a 250 ms `timeupdate` cadence.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            sync: SyncConfig::web(),
            visibility: VisibilityConfig::web(),
            frame: Duration::from_millis(250, Timebase::MICROS),
            max_events_per_drain: 10_000,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::web()
    }
}

#[derive(Clone, Copy, Debug)]
enum Role {
    Master,
    Slave(usize),
}

#[derive(Debug)]
struct SimGroup {
    id: GroupId,
    rect: Rect,
    members: Vec<SimVideo>,
    sync: Option<GroupSync<SimVideo>>,
    tracker: VisibilityTracker,
}

/// A scripted page of video groups under a scrolling viewport.
///
/// Time is in microsecond ticks ([`Timebase::MICROS`]).
#[derive(Debug)]
pub struct SimPage {
    config: SimConfig,
    viewport: Rect,
    queue: EventQueue,
    videos: Vec<SimVideo>,
    groups: Vec<SimGroup>,
    routes: BTreeMap<VideoId, (usize, Role)>,
    scheduler: VisibilityScheduler<TimerId>,
    timers: ManualTimers,
    played_until: HostTime,
    prevented: u64,
    dispatched: u64,
    guard_trips: u64,
}

impl SimPage {
    /// Creates an empty page with the viewport at the top.
    #[must_use]
    pub fn new(viewport: Size, config: SimConfig) -> Self {
        Self {
            config,
            viewport: Rect::from_origin_size((0.0, 0.0), viewport),
            queue: EventQueue::default(),
            videos: Vec::new(),
            groups: Vec::new(),
            routes: BTreeMap::new(),
            scheduler: VisibilityScheduler::new(config.visibility),
            timers: ManualTimers::new(HostTime(0)),
            played_until: HostTime(0),
            prevented: 0,
            dispatched: 0,
            guard_trips: 0,
        }
    }

    /// Adds a group laid out at `rect` (page coordinates) with `members`
    /// videos. `master` tags one member as master; `None` leaves the choice
    /// to document order.
    ///
    /// Groups with fewer than two members get videos but are neither
    /// synchronized nor observed.
    pub fn add_group(&mut self, rect: Rect, members: usize, master: Option<usize>) -> GroupId {
        let index = self.groups.len();
        let id = GroupId(u32::try_from(index).unwrap_or(u32::MAX));

        let videos: Vec<SimVideo> = (0..members)
            .map(|_| {
                let video = SimVideo::new(VideoId(self.videos.len()), self.queue.clone());
                self.videos.push(video.clone());
                video
            })
            .collect();
        let tagged = videos
            .iter()
            .enumerate()
            .map(|(i, v)| Member {
                media: v.clone(),
                tagged_master: master == Some(i),
            })
            .collect();

        let sync = GroupSync::from_members(id, tagged, self.config.sync);
        if let Some(sync) = &sync {
            self.routes.insert(sync.master().id(), (index, Role::Master));
            for (i, slave) in sync.slaves().iter().enumerate() {
                self.routes.insert(slave.id(), (index, Role::Slave(i)));
            }
            self.scheduler.register(id);
        }

        self.groups.push(SimGroup {
            id,
            rect,
            members: videos,
            sync,
            tracker: VisibilityTracker::new(self.config.visibility.threshold),
        });
        id
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.timers.now()
    }

    /// The viewport in page coordinates.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Members of `group` in document order.
    #[must_use]
    pub fn members(&self, group: GroupId) -> &[SimVideo] {
        self.group(group).map_or(&[], |g| &g.members)
    }

    /// The resolved master of `group`, if it is synchronized.
    #[must_use]
    pub fn master(&self, group: GroupId) -> Option<&SimVideo> {
        self.group(group)?.sync.as_ref().map(GroupSync::master)
    }

    /// The synchronizer for `group`, if it has one.
    #[must_use]
    pub fn sync(&self, group: GroupId) -> Option<&GroupSync<SimVideo>> {
        self.group(group)?.sync.as_ref()
    }

    /// The scheduler's phase for `group`.
    #[must_use]
    pub fn phase(&self, group: GroupId) -> Option<&GroupPhase<TimerId>> {
        self.scheduler.phase(group)
    }

    /// Returns `true` if `group` has a play attempt waiting on its timer.
    #[must_use]
    pub fn has_pending(&self, group: GroupId) -> bool {
        self.scheduler.has_pending(group)
    }

    /// The page's timers, for inspecting scheduling and cancellation counts.
    #[must_use]
    pub fn timers(&self) -> &ManualTimers {
        &self.timers
    }

    /// Largest absolute slave-to-master offset in `group`, in seconds.
    #[must_use]
    pub fn max_drift(&self, group: GroupId) -> Option<f64> {
        let sync = self.sync(group)?;
        let target = sync.master().current_time();
        Some(
            sync.slaves()
                .iter()
                .map(|s| (s.current_time() - target).abs())
                .fold(0.0, f64::max),
        )
    }

    /// Default actions suppressed by slave `play` redirection so far.
    #[must_use]
    pub fn prevented_defaults(&self) -> u64 {
        self.prevented
    }

    /// Media events dispatched so far.
    #[must_use]
    pub fn dispatched_events(&self) -> u64 {
        self.dispatched
    }

    /// Number of drains cut short by the loop guard.
    #[must_use]
    pub fn guard_trips(&self) -> u64 {
        self.guard_trips
    }

    /// Delivers the initial visibility of every observed group, as an
    /// observer does when it starts observing.
    pub fn observe(&mut self, tracer: &mut Tracer<'_>) {
        self.update_visibility(tracer);
    }

    /// Scrolls the viewport so its top edge is at `y` and delivers any
    /// visibility changes.
    pub fn scroll_to(&mut self, y: f64, tracer: &mut Tracer<'_>) {
        self.viewport = Rect::from_origin_size((self.viewport.x0, y), self.viewport.size());
        self.update_visibility(tracer);
    }

    /// Moves the clock forward by `dt`.
    ///
    /// Due timers fire at their deadlines, playing videos advance and fire
    /// `timeupdate`, and the event queue is drained after each step. Returns
    /// the number of timers that fired.
    pub fn advance(&mut self, dt: Duration, tracer: &mut Tracer<'_>) -> usize {
        let target = self.timers.now().saturating_add(dt);
        let mut fired = 0;
        while let Some(group) = self.timers.pop_due(target) {
            self.play_until(self.timers.now(), tracer);
            self.fire_timer(group, tracer);
            self.drain(tracer);
            fired += 1;
        }
        self.timers.advance_to(target);
        self.play_until(target, tracer);
        fired
    }

    /// Advances by one configured frame.
    pub fn tick(&mut self, tracer: &mut Tracer<'_>) -> usize {
        self.advance(self.config.frame, tracer)
    }

    /// Simulates the user pressing play on `member` of `group`.
    pub fn user_play(&mut self, group: GroupId, member: usize, tracer: &mut Tracer<'_>) {
        if let Some(video) = self.members(group).get(member) {
            let _ = video.play();
        }
        self.drain(tracer);
    }

    /// Simulates the user pressing pause on `member` of `group`.
    pub fn user_pause(&mut self, group: GroupId, member: usize, tracer: &mut Tracer<'_>) {
        if let Some(video) = self.members(group).get(member) {
            video.pause();
        }
        self.drain(tracer);
    }

    /// Simulates the user scrubbing `member` of `group` to `seconds`.
    pub fn user_seek(&mut self, group: GroupId, member: usize, seconds: f64, tracer: &mut Tracer<'_>) {
        if let Some(video) = self.members(group).get(member) {
            video.set_current_time(seconds);
        }
        self.drain(tracer);
    }

    /// Dispatches queued media events until the queue is empty or the loop
    /// guard trips. Returns the number dispatched.
    pub fn drain(&mut self, tracer: &mut Tracer<'_>) -> usize {
        let mut count = 0;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((video, event)) = next else {
                break;
            };
            if count == self.config.max_events_per_drain {
                self.queue.borrow_mut().clear();
                self.guard_trips += 1;
                break;
            }
            count += 1;
            self.dispatch(video, event, tracer);
        }
        self.dispatched += count as u64;
        count
    }

    fn group(&self, id: GroupId) -> Option<&SimGroup> {
        self.groups.get(usize::try_from(id.0).ok()?)
    }

    fn dispatch(&mut self, video: VideoId, event: MediaEvent, tracer: &mut Tracer<'_>) {
        let Some(&(index, role)) = self.routes.get(&video) else {
            return;
        };
        let Some(sync) = self.groups.get(index).and_then(|g| g.sync.as_ref()) else {
            return;
        };
        match role {
            Role::Master => sync.on_master_event(event, tracer),
            Role::Slave(i) => {
                if sync.on_slave_event(i, event, tracer) == EventResponse::PreventDefault {
                    self.prevented += 1;
                }
            }
        }
    }

    fn update_visibility(&mut self, tracer: &mut Tracer<'_>) {
        let viewport = self.viewport;
        for group in &mut self.groups {
            let Some(sync) = &group.sync else {
                continue;
            };
            let ratio = intersection_ratio(group.rect, viewport);
            if let Some(intersecting) = group.tracker.update(ratio) {
                self.scheduler.on_visibility(
                    group.id,
                    intersecting,
                    Some(sync.master()),
                    &mut self.timers,
                    tracer,
                );
            }
        }
        self.drain(tracer);
    }

    fn fire_timer(&mut self, group: GroupId, tracer: &mut Tracer<'_>) {
        let Some(master) = self
            .groups
            .iter()
            .find(|g| g.id == group)
            .and_then(|g| g.sync.as_ref())
            .map(GroupSync::master)
        else {
            return;
        };
        if let Some(Err(error)) = self.scheduler.on_timer_fired(group, master, tracer) {
            report_play_rejection(group, &error, tracer);
        }
    }

    fn play_until(&mut self, until: HostTime, tracer: &mut Tracer<'_>) {
        let elapsed = until.saturating_duration_since(self.played_until);
        if elapsed == Duration::ZERO {
            return;
        }
        self.played_until = until;
        let seconds = Timebase::MICROS.ticks_to_nanos(elapsed.ticks()) as f64 / 1e9;
        for video in &self.videos {
            video.play_for(seconds);
        }
        self.drain(tracer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> SimPage {
        SimPage::new(Size::new(800.0, 600.0), SimConfig::web())
    }

    #[test]
    fn small_groups_are_not_synchronized() {
        let mut p = page();
        let g = p.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 1, None);
        assert!(p.sync(g).is_none());
        assert_eq!(p.members(g).len(), 1);
        assert_eq!(p.phase(g), None, "not registered with the scheduler");
    }

    #[test]
    fn tagged_member_becomes_master() {
        let mut p = page();
        let g = p.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 3, Some(2));
        assert_eq!(p.master(g).map(SimVideo::id), Some(p.members(g)[2].id()));
    }

    #[test]
    fn advance_plays_back_at_each_rate() {
        let mut p = page();
        let g = p.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 2, None);
        p.members(g)[0].play().unwrap();
        p.drain(&mut Tracer::none());

        p.advance(Duration::from_millis(500, Timebase::MICROS), &mut Tracer::none());

        let master = p.master(g).unwrap();
        assert!((master.current_time() - 0.5).abs() < 1e-9);
        assert!(p.max_drift(g).unwrap() < 1e-9, "slave started with master");
    }

    #[test]
    fn loop_guard_trips_on_runaway_queues() {
        let mut config = SimConfig::web();
        config.max_events_per_drain = 3;
        let mut p = SimPage::new(Size::new(800.0, 600.0), config);
        let g = p.add_group(Rect::new(0.0, 0.0, 800.0, 300.0), 3, None);

        p.user_play(g, 0, &mut Tracer::none());

        assert_eq!(p.guard_trips(), 1);
        assert_eq!(p.dispatched_events(), 3);
    }
}
