// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `HTMLVideoElement` as a [`MediaElement`].

use js_sys::Promise;
use tandem_core::backend::MediaElement;
use tandem_core::media::{PlayError, ReadyState};
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{DomException, HtmlVideoElement};

/// A group member backed by a `<video>` element.
///
/// Cloning shares the underlying DOM node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebVideo(pub HtmlVideoElement);

impl WebVideo {
    /// The wrapped element.
    #[must_use]
    pub fn element(&self) -> &HtmlVideoElement {
        &self.0
    }
}

impl MediaElement for WebVideo {
    /// The `play()` promise, or the exception thrown synchronously.
    type PlayRequest = Result<Promise, JsValue>;

    fn play(&self) -> Self::PlayRequest {
        self.0.play()
    }

    fn pause(&self) {
        let _ = self.0.pause();
    }

    fn is_paused(&self) -> bool {
        self.0.paused()
    }

    fn current_time(&self) -> f64 {
        self.0.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.0.set_current_time(seconds);
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_raw(self.0.ready_state())
    }
}

/// Converts a rejection value from `play()` into a [`PlayError`].
///
/// `DOMException`s keep their name and message. Other `Error` objects are
/// read the same way; anything else is stringified under the name `Error`.
#[must_use]
pub fn play_error(value: &JsValue) -> PlayError {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        return PlayError::new(exception.name(), exception.message());
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return PlayError::new(String::from(error.name()), String::from(error.message()));
    }
    PlayError::new("Error", value.as_string().unwrap_or_default())
}
