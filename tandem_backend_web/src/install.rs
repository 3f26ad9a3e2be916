// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page setup: discovery, media listeners, visibility, and timers.
//!
//! [`install`] wires every group in a document:
//!
//! ```text
//!   discover() ──► GroupSync per group (≥ 2 members)
//!       │             ├── master: play/pause/timeupdate/seeking ─► on_master_event
//!       │             └── slave i: same events ─► on_slave_event (+ preventDefault)
//!       │
//!       ├──► IntersectionObserver(threshold) ─► VisibilityScheduler::on_visibility
//!       └──► WebTimers (one closure per group) ─► VisibilityScheduler::on_timer_fired
//!                                                    └── play() promise ─► rejection report
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Array, Promise};
use tandem_core::group::GroupId;
use tandem_core::media::{EventResponse, MediaEvent};
use tandem_core::scheduler::{VisibilityConfig, VisibilityScheduler, report_play_rejection};
use tandem_core::sync::{GroupSync, SyncConfig};
use tandem_core::trace::Tracer;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, console,
};

use crate::console::ConsoleSink;
use crate::dom::{Selectors, discover};
use crate::media::{WebVideo, play_error};
use crate::timers::WebTimers;

type Listener = Closure<dyn FnMut(Event)>;
type ObserverClosure = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct WebGroup {
    id: GroupId,
    element: Element,
    sync: Rc<GroupSync<WebVideo>>,
}

/// Scheduler state shared between observer and timer callbacks.
struct Driver {
    scheduler: VisibilityScheduler<i32>,
    timers: WebTimers,
    groups: Vec<WebGroup>,
}

impl Driver {
    fn on_entry(&mut self, target: &Element, intersecting: bool) {
        let Self {
            scheduler,
            timers,
            groups,
        } = self;
        let Some(group) = groups.iter().find(|g| &g.element == target) else {
            return;
        };
        scheduler.on_visibility(
            group.id,
            intersecting,
            Some(group.sync.master()),
            timers,
            &mut Tracer::new(&mut ConsoleSink),
        );
    }

    fn on_timer(&mut self, id: GroupId) -> Option<Result<Promise, JsValue>> {
        let group = self.groups.iter().find(|g| g.id == id)?;
        self.scheduler
            .on_timer_fired(id, group.sync.master(), &mut Tracer::new(&mut ConsoleSink))
    }
}

/// A live installation on a document.
///
/// Dropping it removes every listener, disconnects the observer, and
/// cancels pending play timers. Call [`leak`](Self::leak) to keep it for the
/// lifetime of the page.
pub struct Installation {
    driver: Rc<RefCell<Driver>>,
    observer: Option<(IntersectionObserver, ObserverClosure)>,
    listeners: Vec<(EventTarget, &'static str, Listener)>,
}

impl core::fmt::Debug for Installation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Installation")
            .field("groups", &self.group_count())
            .field("observing", &self.observer.is_some())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Installation {
    /// Number of synchronized groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.driver.borrow().groups.len()
    }

    /// Keeps the installation alive for the lifetime of the page.
    pub fn leak(self) {
        core::mem::forget(self);
    }
}

impl Drop for Installation {
    fn drop(&mut self) {
        if let Some((observer, _)) = &self.observer {
            observer.disconnect();
        }
        for (target, event, listener) in &self.listeners {
            let _ = target.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
        let mut driver = self.driver.borrow_mut();
        let Driver {
            scheduler,
            timers,
            groups,
        } = &mut *driver;
        for group in groups.iter() {
            scheduler.unregister(group.id, timers);
        }
    }
}

/// Installs with [`Selectors::DEFAULT`] and the default configurations.
pub fn install(document: &Document) -> Result<Installation, JsValue> {
    install_with(
        document,
        &Selectors::DEFAULT,
        SyncConfig::web(),
        VisibilityConfig::web(),
    )
}

/// Discovers groups in `document` and wires each one up.
///
/// Groups with fewer than two member videos are left untouched.
pub fn install_with(
    document: &Document,
    selectors: &Selectors,
    sync_config: SyncConfig,
    visibility_config: VisibilityConfig,
) -> Result<Installation, JsValue> {
    check_config(&visibility_config).map_err(JsValue::from_str)?;

    // From here on every listener is owned by `installation`; its Drop detaches them.
    let mut installation = Installation {
        driver: Rc::new(RefCell::new(Driver {
            scheduler: VisibilityScheduler::new(visibility_config),
            timers: WebTimers::new(),
            groups: Vec::new(),
        })),
        observer: None,
        listeners: Vec::new(),
    };

    for found in discover(document, selectors)? {
        let Some(sync) = GroupSync::from_members(found.id, found.members, sync_config) else {
            continue;
        };
        let sync = Rc::new(sync);
        bind_media(&sync, &mut installation.listeners)?;

        let driver = &installation.driver;
        let mut d = driver.borrow_mut();
        d.scheduler.register(found.id);
        d.timers.register(found.id, timer_callback(Rc::downgrade(driver), found.id));
        d.groups.push(WebGroup {
            id: found.id,
            element: found.element,
            sync,
        });
    }

    if installation.group_count() > 0 {
        installation.observer = Some(observe(&installation.driver, visibility_config.threshold)?);
    }
    Ok(installation)
}

/// Installs on the current document once it has been parsed.
///
/// If the document is still loading, installation waits for
/// `DOMContentLoaded`; otherwise it happens immediately. The installation is
/// kept for the lifetime of the page.
pub fn install_when_ready() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("tandem: no document"))?;

    if document.ready_state() != "loading" {
        install(&document)?.leak();
        return Ok(());
    }

    let doc = document.clone();
    let ready = Closure::once(move |_event: Event| match install(&doc) {
        Ok(installation) => installation.leak(),
        Err(err) => console::error_2(&JsValue::from_str("tandem: install failed"), &err),
    });
    document.add_event_listener_with_callback("DOMContentLoaded", ready.as_ref().unchecked_ref())?;
    ready.forget();
    Ok(())
}

fn bind_media(
    sync: &Rc<GroupSync<WebVideo>>,
    listeners: &mut Vec<(EventTarget, &'static str, Listener)>,
) -> Result<(), JsValue> {
    for event in MediaEvent::ALL {
        let master_sync = Rc::clone(sync);
        let on_master = Closure::wrap(Box::new(move |_event: Event| {
            master_sync.on_master_event(event, &mut Tracer::new(&mut ConsoleSink));
        }) as Box<dyn FnMut(_)>);
        listen(sync.master().element(), event, on_master, listeners)?;

        for (index, slave) in sync.slaves().iter().enumerate() {
            let slave_sync = Rc::clone(sync);
            let on_slave = Closure::wrap(Box::new(move |dom_event: Event| {
                let response =
                    slave_sync.on_slave_event(index, event, &mut Tracer::new(&mut ConsoleSink));
                if response == EventResponse::PreventDefault {
                    dom_event.prevent_default();
                }
            }) as Box<dyn FnMut(_)>);
            listen(slave.element(), event, on_slave, listeners)?;
        }
    }
    Ok(())
}

fn listen(
    target: &EventTarget,
    event: MediaEvent,
    listener: Listener,
    listeners: &mut Vec<(EventTarget, &'static str, Listener)>,
) -> Result<(), JsValue> {
    let name = event.as_str();
    target.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
    listeners.push((target.clone(), name, listener));
    Ok(())
}

fn timer_callback(driver: Weak<RefCell<Driver>>, id: GroupId) -> impl FnMut() + 'static {
    move || {
        let Some(driver) = driver.upgrade() else {
            return;
        };
        let request = driver.borrow_mut().on_timer(id);
        if let Some(request) = request {
            watch_play(id, request);
        }
    }
}

/// Routes a rejected scheduler `play()` to the diagnostic channel.
fn watch_play(id: GroupId, request: Result<Promise, JsValue>) {
    match request {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                report_play_rejection(id, &play_error(&err), &mut Tracer::new(&mut ConsoleSink));
            }
        }),
        Err(err) => {
            report_play_rejection(id, &play_error(&err), &mut Tracer::new(&mut ConsoleSink));
        }
    }
}

fn observe(
    driver: &Rc<RefCell<Driver>>,
    threshold: f64,
) -> Result<(IntersectionObserver, ObserverClosure), JsValue> {
    let weak = Rc::downgrade(driver);
    let callback = Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
        let Some(driver) = weak.upgrade() else {
            return;
        };
        let mut driver = driver.borrow_mut();
        for entry in entries.iter() {
            let entry: IntersectionObserverEntry = entry.unchecked_into();
            driver.on_entry(&entry.target(), is_intersecting(entry.intersection_ratio(), threshold));
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for group in &driver.borrow().groups {
        observer.observe(&group.element);
    }
    Ok((observer, callback))
}

/// Rejects configurations the observer would throw on, before anything is bound.
fn check_config(config: &VisibilityConfig) -> Result<(), &'static str> {
    if config.has_valid_threshold() {
        Ok(())
    } else {
        Err("tandem: visibility threshold must be within 0.0..=1.0")
    }
}

/// A group counts as in view once the visible fraction reaches `threshold`.
fn is_intersecting(ratio: f64, threshold: f64) -> bool {
    ratio >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_threshold_is_rejected_before_binding() {
        assert_eq!(check_config(&VisibilityConfig::web()), Ok(()));
        let config = VisibilityConfig {
            threshold: 1.5,
            ..VisibilityConfig::web()
        };
        assert!(check_config(&config).is_err(), "1.5 would make the observer throw");
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(is_intersecting(0.3, 0.3));
        assert!(is_intersecting(1.0, 0.3));
        assert!(!is_intersecting(0.299, 0.3));
        assert!(!is_intersecting(0.0, 0.3));
    }
}
