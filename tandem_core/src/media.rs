// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Media element vocabulary: ready states, events, and play rejections.

use alloc::string::String;
use core::fmt;

/// How much media data an element has buffered, mirroring the
/// `HTMLMediaElement.readyState` levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReadyState {
    /// No information about the media resource.
    #[default]
    HaveNothing = 0,
    /// Duration and dimensions are known; no frame data yet.
    HaveMetadata = 1,
    /// Data for the current playback position is available.
    HaveCurrentData = 2,
    /// Data for the current position and at least a little ahead.
    HaveFutureData = 3,
    /// Enough data to play through without stalling.
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Converts a raw ready-state value. Values above 4 saturate to
    /// [`HaveEnoughData`](Self::HaveEnoughData).
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::HaveNothing,
            1 => Self::HaveMetadata,
            2 => Self::HaveCurrentData,
            3 => Self::HaveFutureData,
            _ => Self::HaveEnoughData,
        }
    }
}

/// The media events the synchronizer listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    /// Playback was requested (`play`).
    Play,
    /// Playback was paused (`pause`).
    Pause,
    /// The playback position advanced (`timeupdate`).
    TimeUpdate,
    /// A seek started (`seeking`).
    Seeking,
}

impl MediaEvent {
    /// Every event, in listener-registration order.
    pub const ALL: [Self; 4] = [Self::Play, Self::Pause, Self::TimeUpdate, Self::Seeking];

    /// The DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::TimeUpdate => "timeupdate",
            Self::Seeking => "seeking",
        }
    }
}

/// What a handler asks the host to do with the event's default action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EventResponse {
    /// Let the default action proceed.
    #[default]
    Default,
    /// Suppress the default action.
    PreventDefault,
}

/// Classification of a rejected play request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayErrorKind {
    /// The request was superseded by a pause or another load before playback
    /// began (`AbortError`). Expected during scrolling.
    Aborted,
    /// Autoplay or permission policy refused playback (`NotAllowedError`).
    NotAllowed,
    /// The media source is unusable (`NotSupportedError`).
    NotSupported,
    /// Anything else.
    Other,
}

impl PlayErrorKind {
    /// Classifies a `DOMException` name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "AbortError" => Self::Aborted,
            "NotAllowedError" => Self::NotAllowed,
            "NotSupportedError" => Self::NotSupported,
            _ => Self::Other,
        }
    }
}

/// A rejected play request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayError {
    /// Classification derived from `name`.
    pub kind: PlayErrorKind,
    /// The exception name as reported by the runtime.
    pub name: String,
    /// Human-readable message, possibly empty.
    pub message: String,
}

impl PlayError {
    /// Builds an error from an exception name and message.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: PlayErrorKind::from_name(&name),
            name,
            message: message.into(),
        }
    }

    /// An `AbortError`: the request was interrupted by another command.
    #[must_use]
    pub fn aborted() -> Self {
        Self::new(
            "AbortError",
            "The play() request was interrupted by a call to pause().",
        )
    }

    /// Returns `true` for the cancellation class, which is never logged.
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        self.kind == PlayErrorKind::Aborted
    }
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl core::error::Error for PlayError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString as _;

    #[test]
    fn ready_state_ordering_matches_raw_levels() {
        assert!(ReadyState::from_raw(2) >= ReadyState::HaveCurrentData);
        assert!(ReadyState::from_raw(1) < ReadyState::HaveCurrentData);
        assert_eq!(ReadyState::from_raw(9), ReadyState::HaveEnoughData);
        assert_eq!(ReadyState::HaveFutureData as u16, 3);
    }

    #[test]
    fn abort_error_is_superseded() {
        assert!(PlayError::aborted().is_superseded());
        assert!(PlayError::new("AbortError", "").is_superseded());
    }

    #[test]
    fn other_rejections_are_not_superseded() {
        let denied = PlayError::new("NotAllowedError", "autoplay blocked");
        assert_eq!(denied.kind, PlayErrorKind::NotAllowed);
        assert!(!denied.is_superseded());
        assert_eq!(PlayError::new("TypeError", "").kind, PlayErrorKind::Other);
    }

    #[test]
    fn display_includes_message_when_present() {
        assert_eq!(PlayError::new("NotSupportedError", "").to_string(), "NotSupportedError");
        assert_eq!(
            PlayError::new("NotAllowedError", "blocked").to_string(),
            "NotAllowedError: blocked"
        );
    }
}
