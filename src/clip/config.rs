//! Authoring-time clip settings.

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::resource::MediaReference;

/// What an unprepared clip may do when it is activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Prepare on the spot whenever activation beats preparation
    #[default]
    Permissive,
    /// Prepare on the spot only when activated at local time zero
    ClipStartOnly,
}

/// Configuration of one timeline clip. Immutable while the timeline runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfiguration {
    /// Media to play; `None` plays whatever the resource already holds
    pub source: Option<MediaReference>,
    /// Media time that corresponds to the clip's first frame
    pub start_offset: f64,
    /// Loop flag applied to the resource while this clip owns it
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Pause the resource when the clip ends
    pub pause_on_completion: bool,
    pub audio_volume: f32,
    /// Seconds before clip start to begin preparing
    pub preload_lead_time: f64,
    pub frame_accurate_seek: bool,
    /// Seek back into sync when the resource drifts
    pub enforce_drift: bool,
    pub drift_tolerance: f64,
    /// Block on drift-correction seeks until they complete
    pub wait_for_seek_completion: bool,
    /// Media length if known; zero or negative means infer it at runtime
    pub authored_length: f64,
    /// Drive the resource while the editor scrubs outside playback
    pub allow_preview_scrub: bool,
    pub activation_policy: ActivationPolicy,
}

impl Default for ClipConfiguration {
    fn default() -> Self {
        Self {
            source: None,
            start_offset: 0.0,
            looping: false,
            pause_on_completion: true,
            audio_volume: 1.0,
            preload_lead_time: 0.3,
            frame_accurate_seek: false,
            enforce_drift: false,
            drift_tolerance: 0.5,
            wait_for_seek_completion: false,
            authored_length: -1.0,
            allow_preview_scrub: false,
            activation_policy: ActivationPolicy::Permissive,
        }
    }
}

impl ClipConfiguration {
    pub fn with_source(source: impl Into<MediaReference>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    /// Configured source, ignoring blank references.
    pub fn media(&self) -> Option<&MediaReference> {
        self.source.as_ref().filter(|source| !source.is_empty())
    }

    /// Lead time clamped to be non-negative.
    pub fn preload_window(&self) -> f64 {
        self.preload_lead_time.max(0.0)
    }

    /// Default timeline duration for a freshly placed clip.
    ///
    /// Uses the authored media length minus the start offset when known,
    /// otherwise `fallback`.
    pub fn default_duration(&self, fallback: f64) -> f64 {
        if self.authored_length <= 0.0 {
            fallback
        } else {
            (self.authored_length - self.start_offset).max(0.0)
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        if !(self.start_offset >= 0.0) {
            return Err(invalid("start_offset", "must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.audio_volume) {
            return Err(invalid("audio_volume", "must be between 0 and 1"));
        }
        if !(self.preload_lead_time >= 0.0) {
            return Err(invalid("preload_lead_time", "must be non-negative"));
        }
        if !(self.drift_tolerance >= 0.0) {
            return Err(invalid("drift_tolerance", "must be non-negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> SyncError {
    SyncError::InvalidConfiguration {
        field,
        reason: reason.to_string(),
    }
}
