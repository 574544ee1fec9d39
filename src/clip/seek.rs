//! Seek policies and the bounded seek watchdog.
//!
//! Frame-accurate seeks block the calling thread until the resource stops
//! reporting `is_seeking`, pumping its update cycle on every poll. The wait
//! is capped by `SyncSettings::seek_timeout`; when the cap is hit, playback
//! continues from wherever the resource landed.

use std::time::Duration;

use crate::clock::Clock;
use crate::config::SyncSettings;
use crate::resource::PlaybackResource;

/// How a clip positions its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekPolicy {
    /// Precise seek, then wait for completion
    FrameAccurate,
    /// Approximate seek, no waiting
    Fast,
}

impl SeekPolicy {
    pub fn for_clip(frame_accurate: bool) -> Self {
        if frame_accurate {
            Self::FrameAccurate
        } else {
            Self::Fast
        }
    }
}

/// What happened to a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// Fire-and-forget seek
    Issued,
    Completed { waited: Duration },
    /// Watchdog expired while the resource was still seeking
    TimedOut { waited: Duration },
}

impl SeekOutcome {
    pub fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Poll until the resource finishes seeking or the watchdog expires.
///
/// Each poll runs one update/end-update step; a render step follows the
/// loop either way. With a zero poll interval the clock must advance on
/// its own or this spins until the resource settles.
pub fn wait_for_seek(
    resource: &mut dyn PlaybackResource,
    clock: &dyn Clock,
    settings: &SyncSettings,
) -> SeekOutcome {
    let started = clock.now();
    let timeout = settings.seek_timeout();
    let poll = settings.seek_poll_interval();

    let outcome = loop {
        let waited = clock.now().saturating_sub(started);
        if !resource.is_seeking() {
            break SeekOutcome::Completed { waited };
        }
        if waited >= timeout {
            break SeekOutcome::TimedOut { waited };
        }
        resource.update_step();
        resource.end_update_step();
        clock.sleep(poll);
    };

    resource.render_step();
    outcome
}

/// Seek to `target` using `policy`.
pub fn seek(
    resource: &mut dyn PlaybackResource,
    policy: SeekPolicy,
    target: f64,
    clock: &dyn Clock,
    settings: &SyncSettings,
) -> SeekOutcome {
    match policy {
        SeekPolicy::FrameAccurate => {
            resource.seek_precise(target);
            wait_for_seek(resource, clock, settings)
        }
        SeekPolicy::Fast => {
            resource.seek_fast(target);
            SeekOutcome::Issued
        }
    }
}

/// Editor scrub: fast seek plus one forced update/render so the new frame
/// shows without advancing playback.
pub fn scrub(resource: &mut dyn PlaybackResource, target: f64) {
    resource.seek_fast(target);
    resource.update_step();
    resource.end_update_step();
    resource.render_step();
}
