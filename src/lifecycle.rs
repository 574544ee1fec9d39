//! Hooks a host sequencing engine calls.
//!
//! The host owns the global time cursor. Every update it calls
//! [`TrackLifecycle::on_track_tick`] once per track, and the per-clip
//! [`ClipLifecycle`] hooks as clips start, play, end and go away. Hooks never
//! fail: a skipped action is logged and playback carries on under whoever
//! owns the resource.

use tracing::{debug, warn};

use crate::clip::ClipController;
use crate::error::SyncResult;
use crate::registry::ClaimantId;

/// Lifecycle callbacks for one clip.
pub trait ClipLifecycle {
    /// Cursor is approaching the clip; get the resource ready.
    fn on_prepare(&mut self);
    /// Clip starts playing at `local_time` seconds into the clip.
    fn on_activate(&mut self, local_time: f64);
    /// Clip's interval ended.
    fn on_pause(&mut self);
    /// One update while the clip is playing.
    fn on_tick(&mut self, local_time: f64, blend_weight: f32);
    /// Clip is being torn down.
    fn on_destroy(&mut self);
}

/// A clip blended into the current frame and its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveClip {
    pub clip: ClaimantId,
    pub weight: f32,
}

impl ActiveClip {
    pub fn new(clip: ClaimantId, weight: f32) -> Self {
        Self { clip, weight }
    }
}

/// Per-track aggregation callback.
pub trait TrackLifecycle {
    fn on_track_tick(&mut self, global_time: f64, active: &[ActiveClip]);
}

/// Log a skipped operation and swallow it.
pub(crate) fn report<T>(hook: &'static str, clip: &str, result: SyncResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_routine() => {
            debug!(hook, clip, %err, "skipped");
            None
        }
        Err(err) => {
            warn!(hook, clip, %err, "skipped");
            None
        }
    }
}

impl ClipLifecycle for ClipController {
    fn on_prepare(&mut self) {
        let result = self.prepare();
        report("prepare", self.name(), result);
    }

    fn on_activate(&mut self, local_time: f64) {
        let result = self.activate(local_time);
        report("activate", self.name(), result);
    }

    fn on_pause(&mut self) {
        let result = self.pause();
        report("pause", self.name(), result);
    }

    fn on_tick(&mut self, local_time: f64, blend_weight: f32) {
        self.set_blend_weight(blend_weight);
        let result = self.tick(local_time);
        report("tick", self.name(), result);
    }

    fn on_destroy(&mut self) {
        let result = self.destroy();
        report("destroy", self.name(), result);
    }
}
