//! Timeline description files.
//!
//! A timeline file describes one simulated player and the clips placed on
//! its track:
//!
//! ```toml
//! [player]
//! media = "idle.mp4"
//! durations = { "intro.mp4" = 10.0, "loop.mp4" = 4.0 }
//!
//! [[clips]]
//! name = "intro"
//! start = 0.0
//! duration = 5.0
//! source = "intro.mp4"
//!
//! [[clips]]
//! name = "loop"
//! start = 5.0
//! source = "loop.mp4"
//! loop = true
//! enforce_drift = true
//! ```
//!
//! Clip entries accept every [`ClipConfiguration`] field next to their
//! placement. A clip without `duration` gets
//! [`ClipConfiguration::default_duration`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::clip::ClipConfiguration;
use crate::config::SyncSettings;
use crate::context::SyncContext;
use crate::resource::{MediaReference, ResourceId, SeekLatency, SharedResource, SimulatedResource};
use crate::track::{Sequencer, TimelineClip, TrackCoordinator};

/// The simulated player a timeline drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpec {
    /// Media assigned to the player before any clip claims it
    pub media: Option<MediaReference>,
    pub looping: bool,
    /// Length of each media source, in seconds
    pub durations: BTreeMap<MediaReference, f64>,
    pub seek_latency: SeekLatency,
    /// Decode speed relative to the timeline (1.0 = no drift)
    pub rate: f64,
    pub render_loop: bool,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        Self {
            media: None,
            looping: false,
            durations: BTreeMap::new(),
            seek_latency: SeekLatency::Immediate,
            rate: 1.0,
            render_loop: false,
        }
    }
}

impl PlayerSpec {
    pub fn build(&self, id: ResourceId) -> SimulatedResource {
        let mut resource = SimulatedResource::new(id)
            .with_looping(self.looping)
            .with_seek_latency(self.seek_latency)
            .with_rate(self.rate);
        for (media, secs) in &self.durations {
            resource = resource.with_media_duration(media.clone(), *secs);
        }
        if let Some(media) = self.media.as_ref().filter(|media| !media.is_empty()) {
            resource = resource.with_assigned_media(media.clone());
        }
        if self.render_loop {
            resource = resource.with_render_loop();
        }
        resource
    }
}

/// One `[[clips]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub start: f64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub ease_in: f64,
    #[serde(default)]
    pub ease_out: f64,
    #[serde(flatten)]
    pub config: ClipConfiguration,
}

impl ClipEntry {
    pub fn placement(&self, settings: &SyncSettings) -> TimelineClip {
        let duration = self
            .duration
            .unwrap_or_else(|| self.config.default_duration(settings.default_clip_duration_secs));
        TimelineClip::new(self.start, duration).with_ease(self.ease_in, self.ease_out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineFile {
    pub player: PlayerSpec,
    pub clips: Vec<ClipEntry>,
}

/// A timeline ready to run: the simulated player and the sequencer over it.
#[derive(Debug)]
pub struct LoadedTimeline {
    pub player: Rc<RefCell<SimulatedResource>>,
    pub sequencer: Sequencer,
}

impl TimelineFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read timeline file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid timeline file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let timeline: TimelineFile = toml::from_str(content)?;
        timeline.validate()?;
        Ok(timeline)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.player.rate >= 0.0) {
            bail!("player.rate must be non-negative");
        }
        for (index, clip) in self.clips.iter().enumerate() {
            let label = self.clip_name(index);
            if !clip.start.is_finite() {
                bail!("clip '{}': start must be a finite number", label);
            }
            if let Some(duration) = clip.duration {
                if !(duration >= 0.0) {
                    bail!("clip '{}': duration must be non-negative", label);
                }
            }
            if !(clip.ease_in >= 0.0 && clip.ease_out >= 0.0) {
                bail!("clip '{}': ease spans must be non-negative", label);
            }
            clip.config
                .validate()
                .with_context(|| format!("clip '{}'", label))?;
        }
        Ok(())
    }

    /// Name of the clip at `index`, or a positional one if it has none.
    pub fn clip_name(&self, index: usize) -> String {
        self.clips
            .get(index)
            .and_then(|clip| clip.name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("clip-{}", index + 1))
    }

    /// Latest clip end on the timeline.
    pub fn end(&self, settings: &SyncSettings) -> f64 {
        self.clips
            .iter()
            .map(|clip| clip.placement(settings).end())
            .fold(0.0, f64::max)
    }

    /// Build the player and a sequencer with every clip attached.
    pub fn instantiate(&self, context: Rc<SyncContext>) -> LoadedTimeline {
        let player = Rc::new(RefCell::new(self.player.build(ResourceId::new(1))));
        let shared: SharedResource = player.clone();
        let mut track = TrackCoordinator::new(Some(shared), Rc::clone(&context));
        for (index, clip) in self.clips.iter().enumerate() {
            track.add_clip(
                self.clip_name(index),
                clip.config.clone(),
                clip.placement(context.settings()),
            );
        }
        LoadedTimeline {
            player,
            sequencer: Sequencer::new(track),
        }
    }
}
