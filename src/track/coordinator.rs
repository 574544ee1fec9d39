//! All clips of one timeline track that share a playback resource.
//!
//! The coordinator blends audio across overlapping clips, starts preparing
//! clips that are about to begin, and in editor preview stops or reclaims
//! the resource as the cursor crosses scrub-enabled clip boundaries. It
//! also hands the resource over between adjacent clips: an owner that is
//! no longer playing inside its own interval is evicted with
//! [`force_stop`](crate::registry::PlaybackResourceRegistry::force_stop)
//! and its restoration data passes to the clip taking over. Pre-roll is
//! gentler and only evicts owners that have finished with the resource.

use std::rc::Rc;

use tracing::debug;

use crate::clip::{ClipConfiguration, ClipController, ClipState, DriftCorrection, SeekOutcome};
use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::lifecycle::{report, ActiveClip, TrackLifecycle};
use crate::registry::ClaimantId;
use crate::resource::SharedResource;
use crate::track::timeline::TimelineClip;

/// Why a clip wants the resource from its current owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Takeover {
    /// Activation or preview scrub at the cursor
    Cursor,
    /// Preparing ahead of the clip's start
    Preroll,
}

/// A controller and where its clip sits on the timeline.
#[derive(Debug)]
pub struct TrackClip {
    pub placement: TimelineClip,
    pub controller: ClipController,
}

pub struct TrackCoordinator {
    resource: Option<SharedResource>,
    context: Rc<SyncContext>,
    clips: Vec<TrackClip>,
}

impl TrackCoordinator {
    pub fn new(resource: Option<SharedResource>, context: Rc<SyncContext>) -> Self {
        Self {
            resource,
            context,
            clips: Vec::new(),
        }
    }

    pub fn context(&self) -> &Rc<SyncContext> {
        &self.context
    }

    pub fn resource(&self) -> Option<&SharedResource> {
        self.resource.as_ref()
    }

    /// Attach a clip driving this track's resource.
    pub fn add_clip(
        &mut self,
        name: impl Into<String>,
        config: ClipConfiguration,
        placement: TimelineClip,
    ) -> ClaimantId {
        let controller = ClipController::new(
            name,
            config,
            self.resource.clone(),
            Rc::clone(&self.context),
        );
        let id = controller.id();
        self.clips.push(TrackClip {
            placement,
            controller,
        });
        id
    }

    pub fn clips(&self) -> &[TrackClip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip(&self, id: ClaimantId) -> Option<&ClipController> {
        self.find(id).map(|clip| &clip.controller)
    }

    pub fn clip_mut(&mut self, id: ClaimantId) -> Option<&mut ClipController> {
        self.index_of(id).map(|index| &mut self.clips[index].controller)
    }

    pub fn placement(&self, id: ClaimantId) -> Option<TimelineClip> {
        self.find(id).map(|clip| clip.placement)
    }

    /// Latest end time across all clips (0 for an empty track).
    pub fn end(&self) -> f64 {
        self.clips
            .iter()
            .map(|clip| clip.placement.end())
            .fold(0.0, f64::max)
    }

    /// `Σ audio_volume × weight` over the blended clips that belong here.
    pub fn blended_volume(&self, active: &[ActiveClip]) -> f32 {
        active
            .iter()
            .filter_map(|entry| {
                self.find(entry.clip)
                    .map(|clip| clip.controller.config().audio_volume * entry.weight)
            })
            .sum()
    }

    /// Hand the resource to `id` and start it at clip-local `local_time`.
    pub fn activate(&mut self, id: ClaimantId, local_time: f64) -> SyncResult<SeekOutcome> {
        let index = self.require(id)?;
        let global = self.clips[index].placement.start + local_time;
        let evicted = if self.clips[index].controller.can_take_over(Some(local_time)) {
            self.hand_off(index, global, Takeover::Cursor)
        } else {
            None
        };
        let result = self.clips[index].controller.activate(local_time);
        if result.is_err() && evicted.is_some() {
            self.clips[index].controller.abandon_takeover();
        }
        result
    }

    pub fn pause(&mut self, id: ClaimantId) -> SyncResult<()> {
        let index = self.require(id)?;
        self.clips[index].controller.pause()
    }

    /// Tick `id` with its blend weight for this frame.
    pub fn tick(
        &mut self,
        id: ClaimantId,
        local_time: f64,
        weight: f32,
    ) -> SyncResult<Option<DriftCorrection>> {
        let index = self.require(id)?;
        let controller = &mut self.clips[index].controller;
        controller.set_blend_weight(weight);
        controller.tick(local_time)
    }

    pub fn destroy(&mut self, id: ClaimantId) -> SyncResult<()> {
        let index = self.require(id)?;
        self.clips[index].controller.destroy()
    }

    /// Tear down every clip, owner last so the resource ends restored.
    pub fn destroy_all(&mut self) {
        let mut order: Vec<usize> = (0..self.clips.len()).collect();
        order.sort_by_key(|index| self.clips[*index].controller.is_owner());
        for index in order {
            let controller = &mut self.clips[index].controller;
            let result = controller.destroy();
            report("destroy", controller.name(), result);
        }
    }

    /// Prepare the clip at `index`, taking the resource over if allowed.
    fn prepare_at(&mut self, index: usize, global_time: f64, reason: Takeover) {
        let evicted = if self.clips[index].controller.can_take_over(None) {
            self.hand_off(index, global_time, reason)
        } else {
            None
        };
        let controller = &mut self.clips[index].controller;
        let result = controller.prepare();
        if result.is_err() && evicted.is_some() {
            controller.abandon_takeover();
        }
        report("prepare", controller.name(), result);
    }

    /// Evict the current owner so the clip at `index` can claim.
    ///
    /// At the cursor, an owner still active inside its own interval at
    /// `global_time` keeps the resource. During pre-roll only an owner that
    /// is paused, stopped or past its interval gives way. Owners that are
    /// not on this track are never evicted.
    fn hand_off(
        &mut self,
        index: usize,
        global_time: f64,
        reason: Takeover,
    ) -> Option<ClaimantId> {
        let resource = self.resource.clone()?;
        let rid = resource.borrow().id();
        let claimant = self.clips[index].controller.id();
        let owner = self.context.registry().owner(rid).filter(|o| *o != claimant)?;

        let holder = self.find(owner)?;
        let state = holder.controller.state();
        let keeps = match reason {
            Takeover::Cursor => {
                state == ClipState::Active && holder.placement.contains(global_time)
            }
            Takeover::Preroll => {
                matches!(state, ClipState::Preparing | ClipState::Active)
                    && global_time < holder.placement.end()
            }
        };
        if keeps {
            return None;
        }

        let context = Rc::clone(&self.context);
        let clips = &mut self.clips;
        let mut restoration = None;
        let evicted = context.registry().force_stop(rid, claimant, |evicted| {
            if let Some(clip) = clips.iter_mut().find(|c| c.controller.id() == evicted) {
                restoration = Some(clip.controller.stop_media());
            }
        });
        if let Some(restoration) = restoration {
            self.clips[index].controller.inherit_restoration(restoration);
        }
        if let Some(evicted) = evicted {
            debug!(
                clip = self.clips[index].controller.name(),
                %evicted,
                "took over resource"
            );
        }
        evicted
    }

    fn find(&self, id: ClaimantId) -> Option<&TrackClip> {
        self.clips.iter().find(|clip| clip.controller.id() == id)
    }

    fn index_of(&self, id: ClaimantId) -> Option<usize> {
        self.clips.iter().position(|clip| clip.controller.id() == id)
    }

    fn require(&self, id: ClaimantId) -> SyncResult<usize> {
        self.index_of(id).ok_or(SyncError::MissingResource {
            reason: "clip is not on this track",
        })
    }
}

impl TrackLifecycle for TrackCoordinator {
    fn on_track_tick(&mut self, global_time: f64, active: &[ActiveClip]) {
        let Some(resource) = self.resource.clone() else {
            return;
        };
        let volume = self.blended_volume(active);
        resource.borrow_mut().set_audio_volume(volume);

        let authoritative = self.context.is_authoritative_playback();
        for index in 0..self.clips.len() {
            let placement = self.clips[index].placement;
            let config = self.clips[index].controller.config();
            let scrubbing = !authoritative && config.allow_preview_scrub;
            let lead = config.preload_window();

            if scrubbing {
                if placement.contains(global_time) {
                    self.prepare_at(index, global_time, Takeover::Cursor);
                } else if self.clips[index].controller.state().is_engaged() {
                    let controller = &mut self.clips[index].controller;
                    let result = controller.stop();
                    report("stop", controller.name(), result);
                }
            } else if placement.in_preroll(global_time, lead)
                && !resource.borrow().is_playing()
                && self.clips[index].controller.can_take_over(None)
            {
                self.prepare_at(index, global_time, Takeover::Preroll);
            }
        }
    }
}

impl std::fmt::Debug for TrackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackCoordinator")
            .field("resource", &self.resource.as_ref().map(|res| res.borrow().id()))
            .field("clips", &self.clips)
            .finish()
    }
}
