//! In-memory playback resource.
//!
//! Models just enough of a media transport to exercise the engine: a play
//! head that moves when advanced, seeks that take a configurable number of
//! update steps to settle, looping, and per-media durations that show up as
//! seekable ranges. Every command is appended to a log so callers can
//! inspect exactly what the engine asked for.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{MediaReference, PlaybackResource, ResourceId, TimeRange};

/// One command received by a [`SimulatedResource`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TransportCommand {
    OpenMedia {
        reference: MediaReference,
        autoplay: bool,
    },
    Play,
    Pause,
    Stop,
    SeekPrecise {
        time: f64,
    },
    SeekFast {
        time: f64,
    },
    SetLoop {
        looping: bool,
    },
    SetAudioVolume {
        volume: f32,
    },
    UpdateStep,
    EndUpdateStep,
    RenderStep,
    CancelRenderLoop,
}

impl TransportCommand {
    /// Update/render steps, which watchdog polls emit in bulk.
    pub fn is_step(&self) -> bool {
        matches!(self, Self::UpdateStep | Self::EndUpdateStep | Self::RenderStep)
    }
}

/// How long a precise seek takes to settle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekLatency {
    /// Seek completes as soon as it is issued
    #[default]
    Immediate,
    /// Seek completes after this many `update_step` calls
    Steps(u32),
    /// Seek never reports completion
    Never,
}

/// Scriptable stand-in for a real media player.
#[derive(Debug)]
pub struct SimulatedResource {
    id: ResourceId,
    media: Option<MediaReference>,
    opened: bool,
    durations: HashMap<MediaReference, f64>,
    position: f64,
    playing: bool,
    looping: bool,
    volume: f32,
    seek_latency: SeekLatency,
    pending_seek: Option<u32>,
    render_loop: bool,
    rate: f64,
    commands: Vec<TransportCommand>,
}

impl SimulatedResource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            media: None,
            opened: false,
            durations: HashMap::new(),
            position: 0.0,
            playing: false,
            looping: false,
            volume: 1.0,
            seek_latency: SeekLatency::Immediate,
            pending_seek: None,
            render_loop: false,
            rate: 1.0,
            commands: Vec::new(),
        }
    }

    /// Register the length of a media source.
    pub fn with_media_duration(mut self, reference: impl Into<MediaReference>, secs: f64) -> Self {
        self.durations.insert(reference.into(), secs);
        self
    }

    /// Assign (and open) media before any clip touches the resource.
    pub fn with_assigned_media(mut self, reference: impl Into<MediaReference>) -> Self {
        self.media = Some(reference.into());
        self.opened = true;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_seek_latency(mut self, latency: SeekLatency) -> Self {
        self.seek_latency = latency;
        self
    }

    /// Give the resource a background render loop that can be cancelled.
    pub fn with_render_loop(mut self) -> Self {
        self.render_loop = true;
        self
    }

    /// Decode speed relative to the driving clock (1.0 = in sync).
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Move the play head as if `dt` seconds of wall time had passed.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing || self.pending_seek.is_some() {
            return;
        }
        self.position += dt * self.rate;
        if let Some(duration) = self.current_duration() {
            if self.position >= duration {
                if self.looping {
                    self.position = self.position.rem_euclid(duration);
                } else {
                    self.position = duration;
                    self.playing = false;
                }
            }
        }
    }

    /// Force the play head somewhere without logging a command.
    pub fn set_position(&mut self, time: f64) {
        self.position = time;
    }

    /// Start playback without logging a command.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn has_render_loop(&self) -> bool {
        self.render_loop
    }

    pub fn commands(&self) -> &[TransportCommand] {
        &self.commands
    }

    /// Commands excluding update/render steps.
    pub fn transport_commands(&self) -> Vec<TransportCommand> {
        self.commands
            .iter()
            .filter(|command| !command.is_step())
            .cloned()
            .collect()
    }

    pub fn take_commands(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    fn current_duration(&self) -> Option<f64> {
        self.media
            .as_ref()
            .and_then(|media| self.durations.get(media))
            .copied()
            .filter(|duration| *duration > 0.0)
    }

    fn clamp_to_media(&self, time: f64) -> f64 {
        match self.current_duration() {
            Some(duration) => time.clamp(0.0, duration),
            None => time.max(0.0),
        }
    }
}

impl PlaybackResource for SimulatedResource {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn media_reference(&self) -> Option<MediaReference> {
        self.media.clone()
    }

    fn is_media_opened(&self) -> bool {
        self.opened
    }

    fn open_media(&mut self, reference: &MediaReference, autoplay: bool) {
        self.commands.push(TransportCommand::OpenMedia {
            reference: reference.clone(),
            autoplay,
        });
        self.media = Some(reference.clone());
        self.opened = true;
        self.position = 0.0;
        self.pending_seek = None;
        self.playing = autoplay;
    }

    fn play(&mut self) {
        self.commands.push(TransportCommand::Play);
        self.playing = true;
    }

    fn pause(&mut self) {
        self.commands.push(TransportCommand::Pause);
        self.playing = false;
    }

    fn stop(&mut self) {
        self.commands.push(TransportCommand::Stop);
        self.playing = false;
        self.position = 0.0;
    }

    fn seek_precise(&mut self, time: f64) {
        self.commands.push(TransportCommand::SeekPrecise { time });
        self.position = self.clamp_to_media(time);
        self.pending_seek = match self.seek_latency {
            SeekLatency::Immediate | SeekLatency::Steps(0) => None,
            SeekLatency::Steps(steps) => Some(steps),
            SeekLatency::Never => Some(u32::MAX),
        };
    }

    fn seek_fast(&mut self, time: f64) {
        self.commands.push(TransportCommand::SeekFast { time });
        self.position = self.clamp_to_media(time);
    }

    fn is_seeking(&self) -> bool {
        self.pending_seek.is_some()
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn seekable_ranges(&self) -> Vec<TimeRange> {
        if !self.opened {
            return Vec::new();
        }
        self.current_duration()
            .map(|duration| vec![TimeRange::new(0.0, duration)])
            .unwrap_or_default()
    }

    fn set_loop(&mut self, looping: bool) {
        self.commands.push(TransportCommand::SetLoop { looping });
        self.looping = looping;
    }

    fn set_audio_volume(&mut self, volume: f32) {
        self.commands.push(TransportCommand::SetAudioVolume { volume });
        self.volume = volume;
    }

    fn update_step(&mut self) {
        self.commands.push(TransportCommand::UpdateStep);
        if self.seek_latency == SeekLatency::Never {
            return;
        }
        self.pending_seek = match self.pending_seek {
            Some(remaining) if remaining > 1 => Some(remaining - 1),
            _ => None,
        };
    }

    fn end_update_step(&mut self) {
        self.commands.push(TransportCommand::EndUpdateStep);
    }

    fn render_step(&mut self) {
        self.commands.push(TransportCommand::RenderStep);
    }

    fn cancel_background_render(&mut self) -> bool {
        if !self.render_loop {
            return false;
        }
        self.commands.push(TransportCommand::CancelRenderLoop);
        self.render_loop = false;
        true
    }
}
