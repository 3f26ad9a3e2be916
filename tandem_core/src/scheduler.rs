// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility-driven play/pause scheduling with a debounced start.
//!
//! The [`VisibilityScheduler`] starts a group's master shortly after the group
//! scrolls into view and pauses it as soon as the group leaves. See the
//! [`VisibilityScheduler`] struct docs for the per-group state machine.

use alloc::collections::BTreeMap;

use crate::backend::{MediaElement, Timers};
use crate::group::GroupId;
use crate::media::PlayError;
use crate::time::{Duration, Timebase};
use crate::trace::{
    HiddenPauseEvent, PlayAttempt, PlayAttemptEvent, TimerAction, TimerEvent, Tracer,
    VisibilityEvent,
};

/// Fraction of a group that must be visible before it counts as in view.
pub const VISIBILITY_THRESHOLD: f64 = 0.3;

/// Debounce delay between entering view and starting playback.
pub const PLAY_DELAY_MS: u64 = 200;

/// Configuration for the [`VisibilityScheduler`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityConfig {
    /// Visible fraction (0.0–1.0) at or above which a group is in view.
    pub threshold: f64,
    /// Delay before a play attempt, in host ticks.
    pub play_delay: Duration,
}

impl VisibilityConfig {
    /// Default configuration for a host with the given timebase.
    #[must_use]
    pub const fn for_timebase(timebase: Timebase) -> Self {
        Self {
            threshold: VISIBILITY_THRESHOLD,
            play_delay: Duration::from_millis(PLAY_DELAY_MS, timebase),
        }
    }

    /// Default configuration for the web (1 tick = 1 µs).
    #[must_use]
    pub const fn web() -> Self {
        Self::for_timebase(Timebase::MICROS)
    }

    /// Returns `true` if `threshold` is a fraction in `0.0..=1.0`.
    ///
    /// Observers reject anything else, so hosts check this before binding.
    #[must_use]
    pub const fn has_valid_threshold(&self) -> bool {
        self.threshold >= 0.0 && self.threshold <= 1.0
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// The scheduler's view of one group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupPhase<H> {
    /// Not in view and nothing pending.
    Idle,
    /// In view; a play attempt is scheduled behind the given timer.
    PendingPlay(H),
    /// The timer fired: the master was started or was already playing.
    Playing,
}

/// What [`VisibilityScheduler::on_visibility`] did with an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityAction {
    /// The group has no master or is not registered; nothing happened.
    Ignored,
    /// A delayed play attempt was scheduled.
    PlayScheduled,
    /// The host could not schedule the timer; the group is idle.
    ScheduleFailed,
    /// The master was paused.
    Paused,
}

/// Per-group play/pause scheduler driven by visibility transitions.
///
/// # State machine
///
/// Each registered group is [`Idle`](GroupPhase::Idle),
/// [`PendingPlay`](GroupPhase::PendingPlay), or
/// [`Playing`](GroupPhase::Playing). Every visibility entry first cancels any
/// pending timer for its group, so a stale play intent never survives a new
/// decision:
///
/// ```text
///   entry(intersecting)      ──► cancel pending ──► schedule ──► PendingPlay
///   entry(not intersecting)  ──► cancel pending ──► pause    ──► Idle
///   timer fired              ──► play if paused            ──► Playing
/// ```
///
/// At most one timer per group is live at any time.
///
/// # Ownership
///
/// The scheduler is the single writer of the per-group records. Hosts are
/// single-threaded, so it lives behind a `RefCell` at most; no locking.
#[derive(Debug)]
pub struct VisibilityScheduler<H> {
    config: VisibilityConfig,
    groups: BTreeMap<GroupId, GroupPhase<H>>,
}

impl<H> VisibilityScheduler<H> {
    /// Creates a scheduler with no registered groups.
    #[must_use]
    pub fn new(config: VisibilityConfig) -> Self {
        Self {
            config,
            groups: BTreeMap::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Starts tracking `group`. Registering twice is a no-op.
    pub fn register(&mut self, group: GroupId) {
        self.groups.entry(group).or_insert(GroupPhase::Idle);
    }

    /// Stops tracking `group`, cancelling its pending timer if any.
    ///
    /// Returns `false` if the group was not registered.
    pub fn unregister<T>(&mut self, group: GroupId, timers: &mut T) -> bool
    where
        T: Timers<Handle = H>,
    {
        match self.groups.remove(&group) {
            Some(GroupPhase::PendingPlay(handle)) => {
                timers.cancel(handle);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Returns `true` if `group` is registered.
    #[must_use]
    pub fn is_registered(&self, group: GroupId) -> bool {
        self.groups.contains_key(&group)
    }

    /// The current phase of `group`, if registered.
    #[must_use]
    pub fn phase(&self, group: GroupId) -> Option<&GroupPhase<H>> {
        self.groups.get(&group)
    }

    /// Returns `true` if `group` has a play attempt waiting on its timer.
    #[must_use]
    pub fn has_pending(&self, group: GroupId) -> bool {
        matches!(self.groups.get(&group), Some(GroupPhase::PendingPlay(_)))
    }

    /// Number of groups with a pending play attempt.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.groups
            .values()
            .filter(|p| matches!(p, GroupPhase::PendingPlay(_)))
            .count()
    }

    /// Handles a visibility entry for `group`.
    ///
    /// `master` is the group's resolved master; `None` means the group has no
    /// media and the entry is ignored entirely.
    pub fn on_visibility<M, T>(
        &mut self,
        group: GroupId,
        intersecting: bool,
        master: Option<&M>,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) -> VisibilityAction
    where
        M: MediaElement,
        T: Timers<Handle = H>,
    {
        let Some(master) = master else {
            return VisibilityAction::Ignored;
        };
        let Some(phase) = self.groups.get_mut(&group) else {
            return VisibilityAction::Ignored;
        };
        tracer.visibility(&VisibilityEvent {
            group,
            intersecting,
        });

        if let GroupPhase::PendingPlay(handle) = core::mem::replace(phase, GroupPhase::Idle) {
            timers.cancel(handle);
            tracer.timer(&TimerEvent {
                group,
                action: TimerAction::Cancelled,
            });
        }

        if intersecting {
            let delay = self.config.play_delay;
            match timers.schedule(group, delay) {
                Some(handle) => {
                    *phase = GroupPhase::PendingPlay(handle);
                    tracer.timer(&TimerEvent {
                        group,
                        action: TimerAction::Scheduled { delay },
                    });
                    VisibilityAction::PlayScheduled
                }
                None => {
                    *phase = GroupPhase::Idle;
                    tracer.timer(&TimerEvent {
                        group,
                        action: TimerAction::ScheduleFailed,
                    });
                    VisibilityAction::ScheduleFailed
                }
            }
        } else {
            master.pause();
            *phase = GroupPhase::Idle;
            tracer.hidden_pause(&HiddenPauseEvent { group });
            VisibilityAction::Paused
        }
    }

    /// Handles the expiry of `group`'s play timer.
    ///
    /// Clears the pending record and, if `master` is paused, starts it. The
    /// returned request belongs to the host, which routes a rejection to
    /// [`report_play_rejection`]. Returns `None` if nothing was started or if
    /// no play was pending for the group.
    pub fn on_timer_fired<M>(
        &mut self,
        group: GroupId,
        master: &M,
        tracer: &mut Tracer<'_>,
    ) -> Option<M::PlayRequest>
    where
        M: MediaElement,
    {
        let phase = self.groups.get_mut(&group)?;
        if !matches!(phase, GroupPhase::PendingPlay(_)) {
            return None;
        }
        *phase = GroupPhase::Playing;
        tracer.timer(&TimerEvent {
            group,
            action: TimerAction::Fired,
        });

        if master.is_paused() {
            tracer.play_attempt(&PlayAttemptEvent {
                group,
                outcome: PlayAttempt::Requested,
            });
            Some(master.play())
        } else {
            tracer.play_attempt(&PlayAttemptEvent {
                group,
                outcome: PlayAttempt::AlreadyPlaying,
            });
            None
        }
    }
}

/// Routes a rejected scheduler play request to the diagnostic channel.
///
/// Superseded requests (the master was paused again before playback began)
/// are expected and dropped silently. Everything else is reported exactly
/// once. Returns `true` if a diagnostic was emitted.
pub fn report_play_rejection(group: GroupId, error: &PlayError, tracer: &mut Tracer<'_>) -> bool {
    if error.is_superseded() {
        return false;
    }
    tracer.play_rejected(group, error);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use crate::time::HostTime;
    use crate::timer::{ManualTimers, TimerId};
    use crate::trace::TraceSink;
    use alloc::vec::Vec;

    const G1: GroupId = GroupId(1);
    const G2: GroupId = GroupId(2);

    fn setup(groups: &[GroupId]) -> (VisibilityScheduler<TimerId>, ManualTimers) {
        let mut sched = VisibilityScheduler::new(VisibilityConfig::web());
        for &g in groups {
            sched.register(g);
        }
        (sched, ManualTimers::new(HostTime(0)))
    }

    /// Fires every timer due by `until`, the way a backend would.
    fn run_timers(
        sched: &mut VisibilityScheduler<TimerId>,
        timers: &mut ManualTimers,
        masters: &[(GroupId, &Probe)],
        until: HostTime,
    ) {
        while let Some(group) = timers.pop_due(until) {
            let (_, master) = masters
                .iter()
                .find(|(g, _)| *g == group)
                .expect("timer for known group");
            sched.on_timer_fired(group, *master, &mut Tracer::none());
        }
        timers.advance_to(until);
    }

    #[test]
    fn web_config_matches_fixed_constants() {
        let cfg = VisibilityConfig::web();
        assert_eq!(cfg.threshold, 0.3);
        assert_eq!(cfg.play_delay, Duration(200_000));
    }

    #[test]
    fn threshold_must_be_a_fraction() {
        let mut cfg = VisibilityConfig::web();
        assert!(cfg.has_valid_threshold());
        for ok in [0.0, 1.0] {
            cfg.threshold = ok;
            assert!(cfg.has_valid_threshold(), "{ok} is in range");
        }
        for bad in [1.5, -0.1, f64::NAN] {
            cfg.threshold = bad;
            assert!(!cfg.has_valid_threshold(), "{bad} is out of range");
        }
    }

    #[test]
    fn entering_view_schedules_without_playing() {
        let (mut sched, mut timers) = setup(&[G1]);
        let master = Probe::at(0.0, 4);

        let action =
            sched.on_visibility(G1, true, Some(&master), &mut timers, &mut Tracer::none());

        assert_eq!(action, VisibilityAction::PlayScheduled);
        assert!(sched.has_pending(G1));
        assert_eq!(timers.pending_len(), 1);
        assert_eq!(master.0.plays.get(), 0, "play waits for the debounce");
    }

    #[test]
    fn flicker_out_cancels_pending_and_pauses() {
        let (mut sched, mut timers) = setup(&[G1]);
        let master = Probe::at(0.0, 4);

        sched.on_visibility(G1, true, Some(&master), &mut timers, &mut Tracer::none());
        run_timers(&mut sched, &mut timers, &[(G1, &master)], HostTime(150_000));
        let action =
            sched.on_visibility(G1, false, Some(&master), &mut timers, &mut Tracer::none());
        run_timers(&mut sched, &mut timers, &[(G1, &master)], HostTime(10_000_000));

        assert_eq!(action, VisibilityAction::Paused);
        assert_eq!(timers.cancelled_count(), 1);
        assert_eq!(master.0.pauses.get(), 1);
        assert_eq!(master.0.plays.get(), 0, "cancelled timer never fires");
        assert_eq!(sched.phase(G1), Some(&GroupPhase::Idle));
    }

    #[test]
    fn repeated_entries_keep_a_single_timer() {
        let (mut sched, mut timers) = setup(&[G1]);
        let master = Probe::at(0.0, 4);

        for _ in 0..5 {
            sched.on_visibility(G1, true, Some(&master), &mut timers, &mut Tracer::none());
        }

        assert_eq!(timers.pending_len(), 1, "superseded timers are cancelled");
        assert_eq!(timers.cancelled_count(), 4);
        run_timers(&mut sched, &mut timers, &[(G1, &master)], HostTime(1_000_000));
        assert_eq!(master.0.plays.get(), 1);
    }

    #[test]
    fn sustained_visibility_plays_once_and_clears_record() {
        let (mut sched, mut timers) = setup(&[G1]);
        let master = Probe::at(0.0, 4);

        sched.on_visibility(G1, true, Some(&master), &mut timers, &mut Tracer::none());
        run_timers(&mut sched, &mut timers, &[(G1, &master)], HostTime(199_999));
        assert_eq!(master.0.plays.get(), 0);

        run_timers(&mut sched, &mut timers, &[(G1, &master)], HostTime(200_000));
        assert_eq!(master.0.plays.get(), 1);
        assert!(!sched.has_pending(G1));
        assert_eq!(sched.pending_count(), 0);
        assert_eq!(sched.phase(G1), Some(&GroupPhase::Playing));
    }

    #[test]
    fn already_playing_master_is_not_replayed() {
        let (mut sched, mut timers) = setup(&[G1]);
        let master = Probe::at(0.0, 4);
        master.0.paused.set(false);

        sched.on_visibility(G1, true, Some(&master), &mut timers, &mut Tracer::none());
        run_timers(&mut sched, &mut timers, &[(G1, &master)], HostTime(200_000));

        assert_eq!(master.0.plays.get(), 0);
        assert!(!sched.has_pending(G1));
    }

    #[test]
    fn missing_master_ignores_entry() {
        let (mut sched, mut timers) = setup(&[G1]);

        let action =
            sched.on_visibility::<Probe, _>(G1, true, None, &mut timers, &mut Tracer::none());

        assert_eq!(action, VisibilityAction::Ignored);
        assert_eq!(timers.scheduled_count(), 0);
    }

    #[test]
    fn unregistered_group_is_ignored() {
        let (mut sched, mut timers) = setup(&[]);
        let master = Probe::at(0.0, 4);

        let action =
            sched.on_visibility(G1, false, Some(&master), &mut timers, &mut Tracer::none());

        assert_eq!(action, VisibilityAction::Ignored);
        assert_eq!(master.0.pauses.get(), 0);
    }

    #[test]
    fn stale_fire_is_ignored() {
        let (mut sched, _timers) = setup(&[G1]);
        let master = Probe::at(0.0, 4);

        assert!(sched.on_timer_fired(G1, &master, &mut Tracer::none()).is_none());
        assert_eq!(master.0.plays.get(), 0);
    }

    #[test]
    fn groups_are_independent() {
        let (mut sched, mut timers) = setup(&[G1, G2]);
        let m1 = Probe::at(0.0, 4);
        let m2 = Probe::at(0.0, 4);

        sched.on_visibility(G1, true, Some(&m1), &mut timers, &mut Tracer::none());
        sched.on_visibility(G2, true, Some(&m2), &mut timers, &mut Tracer::none());
        sched.on_visibility(G1, false, Some(&m1), &mut timers, &mut Tracer::none());
        run_timers(
            &mut sched,
            &mut timers,
            &[(G1, &m1), (G2, &m2)],
            HostTime(500_000),
        );

        assert_eq!(m1.0.plays.get(), 0);
        assert_eq!(m1.0.pauses.get(), 1);
        assert_eq!(m2.0.plays.get(), 1);
        assert_eq!(m2.0.pauses.get(), 0);
    }

    #[test]
    fn unregister_cancels_pending_timer() {
        let (mut sched, mut timers) = setup(&[G1]);
        let master = Probe::at(0.0, 4);
        sched.on_visibility(G1, true, Some(&master), &mut timers, &mut Tracer::none());

        assert!(sched.unregister(G1, &mut timers));
        assert_eq!(timers.pending_len(), 0);
        assert!(!sched.is_registered(G1));
        assert!(!sched.unregister(G1, &mut timers));
    }

    #[test]
    fn schedule_failure_leaves_group_idle() {
        struct RefusingTimers;
        impl Timers for RefusingTimers {
            type Handle = ();
            fn schedule(&mut self, _: GroupId, _: Duration) -> Option<()> {
                None
            }
            fn cancel(&mut self, _: ()) {}
        }

        let mut sched = VisibilityScheduler::new(VisibilityConfig::web());
        sched.register(G1);
        let master = Probe::at(0.0, 4);

        let action = sched.on_visibility(
            G1,
            true,
            Some(&master),
            &mut RefusingTimers,
            &mut Tracer::none(),
        );

        assert_eq!(action, VisibilityAction::ScheduleFailed);
        assert_eq!(sched.phase(G1), Some(&GroupPhase::Idle));
    }

    #[derive(Default)]
    struct Diagnostics(Vec<(GroupId, PlayError)>);

    impl TraceSink for Diagnostics {
        fn on_play_rejected(&mut self, group: GroupId, error: &PlayError) {
            self.0.push((group, error.clone()));
        }
    }

    #[test]
    fn superseded_rejection_is_silent() {
        let mut sink = Diagnostics::default();
        let logged = report_play_rejection(G1, &PlayError::aborted(), &mut Tracer::new(&mut sink));
        assert!(!logged);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn other_rejection_is_logged_once() {
        let mut sink = Diagnostics::default();
        let err = PlayError::new("NotAllowedError", "autoplay blocked");
        let logged = report_play_rejection(G2, &err, &mut Tracer::new(&mut sink));
        assert!(logged);
        assert_eq!(sink.0, [(G2, err)]);
    }
}
