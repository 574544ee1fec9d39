//! Placement of a clip on the global timeline.

use serde::{Deserialize, Serialize};

/// Where a clip sits on the timeline and how it fades in and out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineClip {
    /// Global time of the clip's first frame
    pub start: f64,
    pub duration: f64,
    /// Seconds over which the blend weight ramps up from 0
    #[serde(default)]
    pub ease_in: f64,
    /// Seconds over which the blend weight ramps down to 0
    #[serde(default)]
    pub ease_out: f64,
}

impl TimelineClip {
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            duration: duration.max(0.0),
            ease_in: 0.0,
            ease_out: 0.0,
        }
    }

    pub fn with_ease(mut self, ease_in: f64, ease_out: f64) -> Self {
        self.ease_in = ease_in.max(0.0);
        self.ease_out = ease_out.max(0.0);
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether `time` lies in `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end()
    }

    /// Whether `time` lies in `[start - lead, start)`.
    pub fn in_preroll(&self, time: f64, lead: f64) -> bool {
        let lead = lead.max(0.0);
        self.start - lead <= time && time < self.start
    }

    /// Clip-local time for global `time`.
    pub fn local_time(&self, time: f64) -> f64 {
        time - self.start
    }

    /// Blend weight at global `time`: 0 outside the clip, linear ramps over
    /// the ease-in and ease-out spans, 1 in between.
    pub fn weight_at(&self, time: f64) -> f32 {
        if !self.contains(time) {
            return 0.0;
        }
        let local = self.local_time(time);
        let remaining = self.end() - time;
        let mut weight = 1.0f64;
        if self.ease_in > 0.0 {
            weight = weight.min(local / self.ease_in);
        }
        if self.ease_out > 0.0 {
            weight = weight.min(remaining / self.ease_out);
        }
        weight.clamp(0.0, 1.0) as f32
    }
}
