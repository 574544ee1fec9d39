//! The playback resource collaborator.
//!
//! A playback resource is whatever actually decodes and presents media: a
//! video player component, an audio transport, a hardware deck. The engine
//! never owns one. It observes it and issues commands through the
//! [`PlaybackResource`] trait, and several clip controllers share a single
//! resource through [`SharedResource`].
//!
//! # Module Structure
//!
//! - [`simulated`] - In-memory resource that records every command

pub mod simulated;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use simulated::{SeekLatency, SimulatedResource, TransportCommand};

/// Stable identity of a playback resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(u64);

impl ResourceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

/// Reference to a media source (path, URL, asset key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaReference(String);

impl MediaReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty references are treated as "no source assigned".
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A seekable span of the open media, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Largest end time across `ranges`, or 0.0 when nothing is seekable.
pub fn seekable_extent(ranges: &[TimeRange]) -> f64 {
    ranges.iter().fold(0.0f64, |acc, range| acc.max(range.end))
}

/// Commands and queries the engine needs from a media transport.
///
/// Implementations wrap a concrete player. All calls happen on the host's
/// update thread.
pub trait PlaybackResource {
    /// Identity used as the ownership key in the registry.
    fn id(&self) -> ResourceId;

    /// The media currently assigned to the resource, if any.
    fn media_reference(&self) -> Option<MediaReference>;

    /// Whether the assigned media has been opened successfully.
    fn is_media_opened(&self) -> bool;

    /// Open `reference`, optionally starting playback immediately.
    fn open_media(&mut self, reference: &MediaReference, autoplay: bool);

    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    /// Seek to exactly `time`. Completion is reported through `is_seeking`.
    fn seek_precise(&mut self, time: f64);

    /// Seek to roughly `time` (nearest keyframe), without waiting.
    fn seek_fast(&mut self, time: f64);

    fn is_seeking(&self) -> bool;
    fn is_playing(&self) -> bool;
    fn is_looping(&self) -> bool;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Seekable spans of the open media, ordered by start time.
    fn seekable_ranges(&self) -> Vec<TimeRange>;

    fn set_loop(&mut self, looping: bool);
    fn set_audio_volume(&mut self, volume: f32);

    /// Advance the transport's internal update cycle by one step.
    fn update_step(&mut self);
    fn end_update_step(&mut self);
    fn render_step(&mut self);

    /// Stop any background render/update loop so a deterministic seek can
    /// drive the resource instead.
    ///
    /// Returns `false` when the resource has no such loop.
    fn cancel_background_render(&mut self) -> bool {
        false
    }
}

/// A resource shared between the controllers of one track.
pub type SharedResource = Rc<RefCell<dyn PlaybackResource>>;

/// Wrap a concrete resource for sharing.
pub fn share<R: PlaybackResource + 'static>(resource: R) -> SharedResource {
    Rc::new(RefCell::new(resource))
}
