//! Clip lifecycle state
//!
//! Contains the `ClipState` machine and the `ClipRuntimeState` a controller
//! mutates while it drives a resource.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::resource::MediaReference;

/// Lifecycle of a clip controller.
///
/// `Idle → Preparing → Active → {Paused, Stopped} → Idle`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipState {
    #[default]
    Idle,
    /// Resource claimed, media opened and parked on the entry point
    Preparing,
    /// Resource playing (or parked, for frame-accurate clips) under this clip
    Active,
    Paused,
    /// Ownership released, resource state restored
    Stopped,
}

impl ClipState {
    /// States from which Prepare may start.
    pub fn can_prepare(self) -> bool {
        matches!(self, Self::Idle | Self::Paused | Self::Stopped)
    }

    /// States in which the clip may still hold the resource.
    pub fn is_engaged(self) -> bool {
        matches!(self, Self::Preparing | Self::Active | Self::Paused)
    }
}

impl fmt::Display for ClipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// State a controller mutates while it owns (or competes for) a resource.
#[derive(Debug, Clone, Default)]
pub struct ClipRuntimeState {
    pub state: ClipState,
    /// Resource loop flag before this clip changed it
    pub saved_loop: Option<bool>,
    /// Media the resource held before this clip opened its own
    pub saved_media: Option<MediaReference>,
    /// Media this clip is driving (its own source or the resource's)
    pub active_source: Option<MediaReference>,
    /// Clock reading at the last drift check
    pub last_drift_check: Option<Duration>,
    /// Media length observed from seekable ranges (0.0 = not yet known)
    pub inferred_length: f64,
    /// Blend weight from the most recent tick
    pub blend_weight: f32,
}

impl ClipRuntimeState {
    /// Adopt a newly observed media length.
    ///
    /// Non-positive observations are ignored and the stored value never
    /// shrinks.
    pub fn observe_length(&mut self, length: f64) -> bool {
        if length > self.inferred_length {
            self.inferred_length = length;
            true
        } else {
            false
        }
    }

    /// Forget restoration data (ownership moved elsewhere).
    pub fn clear_saved(&mut self) {
        self.saved_loop = None;
        self.saved_media = None;
    }

    /// Hand restoration data over, leaving none behind.
    pub fn take_restoration(&mut self) -> Restoration {
        Restoration {
            looping: self.saved_loop.take(),
            media: self.saved_media.take(),
        }
    }

    /// Adopt restoration data from a previous owner.
    pub fn inherit(&mut self, restoration: Restoration) {
        if restoration.looping.is_some() {
            self.saved_loop = restoration.looping;
        }
        if restoration.media.is_some() {
            self.saved_media = restoration.media;
        }
    }
}

/// How to put a resource back the way the first claimant found it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restoration {
    pub looping: Option<bool>,
    pub media: Option<MediaReference>,
}

impl Restoration {
    pub fn is_empty(&self) -> bool {
        self.looping.is_none() && self.media.is_none()
    }
}
