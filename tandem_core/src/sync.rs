// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Master/slave playback synchronization within a group.
//!
//! [`GroupSync`] mirrors the master's play, pause, and position onto every
//! slave, and turns interaction on a slave into a command for the master:
//!
//! ```text
//!   master play/pause ───────────────► every slave play/pause
//!   master timeupdate/seeking ───────► snap drifting slaves (> tolerance)
//!   slave play ──► prevent default, master.t = slave.t, master.play()
//!   slave pause ─► master.pause()
//!   slave seeking ► master.t = slave.t
//! ```
//!
//! The master's own handlers then fan the change back out, so a slave is
//! effectively a remote control for the master. A slave seek moves the master
//! but never resumes it.

use alloc::vec::Vec;

use crate::backend::MediaElement;
use crate::group::{GroupId, GroupLayout, Member};
use crate::media::{EventResponse, MediaEvent, ReadyState};
use crate::trace::{RedirectEvent, SlaveCorrectionEvent, SlaveNotReadyEvent, Tracer};

/// Configuration for [`GroupSync`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncConfig {
    /// Allowed drift between a slave and the master, in seconds, before the
    /// slave is corrected. Absorbs ordinary `timeupdate` jitter.
    pub tolerance_secs: f64,
    /// Minimum ready state a slave needs before its position is corrected.
    pub ready_threshold: ReadyState,
}

impl SyncConfig {
    /// Default configuration for browser media elements.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            tolerance_secs: 0.1,
            ready_threshold: ReadyState::HaveCurrentData,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// Keeps one group's slaves in step with its master.
///
/// Handlers take `&self`: media handles carry their own interior state, so a
/// `GroupSync` can be shared between event listeners behind an `Rc`.
#[derive(Debug)]
pub struct GroupSync<M> {
    id: GroupId,
    master: M,
    slaves: Vec<M>,
    config: SyncConfig,
}

impl<M: MediaElement> GroupSync<M> {
    /// Creates a synchronizer for an already-resolved layout.
    #[must_use]
    pub fn new(id: GroupId, layout: GroupLayout<M>, config: SyncConfig) -> Self {
        Self {
            id,
            master: layout.master,
            slaves: layout.slaves,
            config,
        }
    }

    /// Resolves `members` and creates a synchronizer.
    ///
    /// Returns `None` for groups with fewer than two members.
    #[must_use]
    pub fn from_members(id: GroupId, members: Vec<Member<M>>, config: SyncConfig) -> Option<Self> {
        GroupLayout::from_members(members).map(|layout| Self::new(id, layout, config))
    }

    /// The group this synchronizer manages.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// The master element.
    #[must_use]
    pub fn master(&self) -> &M {
        &self.master
    }

    /// The slave elements, in document order.
    #[must_use]
    pub fn slaves(&self) -> &[M] {
        &self.slaves
    }

    /// Number of slaves.
    #[must_use]
    pub fn slave_count(&self) -> usize {
        self.slaves.len()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Handles an event fired by the master.
    pub fn on_master_event(&self, event: MediaEvent, tracer: &mut Tracer<'_>) {
        match event {
            MediaEvent::Play => {
                for slave in &self.slaves {
                    let _ = slave.play();
                }
            }
            MediaEvent::Pause => {
                for slave in &self.slaves {
                    slave.pause();
                }
            }
            MediaEvent::TimeUpdate | MediaEvent::Seeking => {
                self.sync_time(tracer);
            }
        }
    }

    /// Handles an event fired by the slave at `index`.
    ///
    /// Returns [`EventResponse::PreventDefault`] for `play`, which the host
    /// should apply to the native event. Out-of-range indices are ignored.
    pub fn on_slave_event(
        &self,
        index: usize,
        event: MediaEvent,
        tracer: &mut Tracer<'_>,
    ) -> EventResponse {
        let Some(slave) = self.slaves.get(index) else {
            return EventResponse::Default;
        };

        match event {
            MediaEvent::Play => {
                self.trace_redirect(index, event, tracer);
                self.master.set_current_time(slave.current_time());
                let _ = self.master.play();
                EventResponse::PreventDefault
            }
            MediaEvent::Pause => {
                self.trace_redirect(index, event, tracer);
                self.master.pause();
                EventResponse::Default
            }
            MediaEvent::Seeking => {
                self.trace_redirect(index, event, tracer);
                self.master.set_current_time(slave.current_time());
                EventResponse::Default
            }
            MediaEvent::TimeUpdate => EventResponse::Default,
        }
    }

    /// Snaps every ready slave that has drifted past the tolerance to the
    /// master's position. Returns the number of slaves corrected.
    ///
    /// Slaves below the ready-state threshold are skipped and re-checked on
    /// the next call.
    pub fn sync_time(&self, tracer: &mut Tracer<'_>) -> usize {
        let target = self.master.current_time();
        let mut corrected = 0;
        for (index, slave) in self.slaves.iter().enumerate() {
            let current = slave.current_time();
            if (current - target).abs() <= self.config.tolerance_secs {
                continue;
            }
            let ready_state = slave.ready_state();
            if ready_state < self.config.ready_threshold {
                tracer.slave_not_ready(&SlaveNotReadyEvent {
                    group: self.id,
                    slave: index,
                    ready_state,
                });
                continue;
            }
            slave.set_current_time(target);
            corrected += 1;
            tracer.slave_correction(&SlaveCorrectionEvent {
                group: self.id,
                slave: index,
                from: current,
                to: target,
            });
        }
        corrected
    }

    fn trace_redirect(&self, slave: usize, event: MediaEvent, tracer: &mut Tracer<'_>) {
        tracer.redirect(&RedirectEvent {
            group: self.id,
            slave,
            event,
        });
    }
}
