//! Per-clip controller.
//!
//! A `ClipController` drives a shared playback resource on behalf of one
//! timeline clip. It arbitrates ownership through the registry in its
//! `SyncContext`, issues transport commands, keeps the resource in sync
//! with the timeline, and restores the resource when it lets go.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::clip::config::{ActivationPolicy, ClipConfiguration};
use crate::clip::drift::{self, DriftCorrection};
use crate::clip::seek::{self, SeekOutcome, SeekPolicy};
use crate::clip::state::{ClipRuntimeState, ClipState, Restoration};
use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::registry::ClaimantId;
use crate::resource::{seekable_extent, PlaybackResource, ResourceId, SharedResource};

/// Controls one clip's claim on a playback resource.
pub struct ClipController {
    id: ClaimantId,
    name: String,
    config: ClipConfiguration,
    resource: Option<SharedResource>,
    context: Rc<SyncContext>,
    runtime: ClipRuntimeState,
}

impl ClipController {
    /// Create a controller and register it as a claimant.
    ///
    /// A controller without a resource accepts every call and does nothing.
    pub fn new(
        name: impl Into<String>,
        config: ClipConfiguration,
        resource: Option<SharedResource>,
        context: Rc<SyncContext>,
    ) -> Self {
        let id = context.registry().register_claimant();
        Self {
            id,
            name: name.into(),
            config,
            resource,
            context,
            runtime: ClipRuntimeState::default(),
        }
    }

    pub fn id(&self) -> ClaimantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ClipConfiguration {
        &self.config
    }

    pub fn state(&self) -> ClipState {
        self.runtime.state
    }

    pub fn runtime(&self) -> &ClipRuntimeState {
        &self.runtime
    }

    pub fn resource_id(&self) -> Option<ResourceId> {
        self.resource.as_ref().map(|res| res.borrow().id())
    }

    /// Whether this controller currently owns its resource.
    pub fn is_owner(&self) -> bool {
        self.resource_id()
            .map(|rid| self.context.registry().is_owner(rid, self.id))
            .unwrap_or(false)
    }

    /// Media length used for drift math: the authored length when set,
    /// otherwise the length observed from the resource (0 until known).
    pub fn effective_length(&self) -> f64 {
        if self.config.authored_length > 0.0 {
            self.config.authored_length
        } else {
            self.runtime.inferred_length
        }
    }

    /// Whether this clip could claim and drive its resource in the current
    /// mode, were the resource free.
    ///
    /// `local_time` is the activation point, or `None` for a prepare.
    pub(crate) fn can_take_over(&self, local_time: Option<f64>) -> bool {
        let Some(resource) = self.resource.as_ref() else {
            return false;
        };
        if !self.may_drive_in_current_mode() {
            return false;
        }
        let res = resource.borrow();
        let has_source = self.config.media().is_some()
            || res.media_reference().filter(|media| !media.is_empty()).is_some();
        if !has_source {
            return false;
        }
        match (local_time, self.config.activation_policy) {
            (Some(local_time), ActivationPolicy::ClipStartOnly) => {
                local_time <= 0.0
                    || self.runtime.state == ClipState::Preparing
                    || self.resource_holds_own_media(&*res)
            }
            _ => true,
        }
    }

    /// Apply restoration data inherited for a takeover that never claimed.
    ///
    /// Does nothing while the clip owns the resource or another claimant
    /// has picked it up.
    pub(crate) fn abandon_takeover(&mut self) {
        let Some(resource) = self.resource.clone() else {
            return;
        };
        let mut res = resource.borrow_mut();
        if self.context.registry().owner(res.id()).is_some() {
            return;
        }
        let restoration = self.runtime.take_restoration();
        if let Some(looping) = restoration.looping {
            res.set_loop(looping);
        }
        if let Some(media) = restoration.media {
            debug!(clip = %self.name, %media, "restoring media after abandoned takeover");
            res.open_media(&media, false);
        }
    }

    pub(crate) fn set_blend_weight(&mut self, weight: f32) {
        self.runtime.blend_weight = weight;
    }

    /// Claim the resource and get it ready to play this clip.
    ///
    /// Opens the clip's media if the resource holds something else, applies
    /// the clip's loop flag, and parks the resource on the clip's entry
    /// point. Prepare on a clip that is already preparing or active is a
    /// no-op.
    pub fn prepare(&mut self) -> SyncResult<()> {
        let resource = self.shared_resource()?;
        if !self.runtime.state.can_prepare() {
            return Ok(());
        }
        if !self.may_drive_in_current_mode() {
            return Err(SyncError::PreviewDisabled);
        }

        let mut res = resource.borrow_mut();
        let rid = res.id();
        let registry = self.context.registry();
        if !registry.is_free_for(rid, self.id) {
            return Err(self.conflict(rid));
        }

        let current = res.media_reference().filter(|media| !media.is_empty());
        let Some(source) = self.config.media().cloned().or_else(|| current.clone()) else {
            return Err(SyncError::MissingResource {
                reason: "no media source assigned",
            });
        };

        if !registry.try_claim(rid, self.id) {
            return Err(self.conflict(rid));
        }
        if self.runtime.saved_loop.is_none() {
            self.runtime.saved_loop = Some(res.is_looping());
        }

        if current.as_ref() != Some(&source) || !res.is_media_opened() {
            if let Some(previous) = current.filter(|media| *media != source) {
                self.runtime.saved_media.get_or_insert(previous);
            }
            debug!(clip = %self.name, media = %source, "opening media");
            res.open_media(&source, false);
        }
        res.set_loop(self.config.looping);
        res.seek_precise(self.config.start_offset);

        if self.config.frame_accurate_seek && res.cancel_background_render() {
            debug!(clip = %self.name, "cancelled background render loop");
        }

        self.runtime.active_source = Some(source);
        self.transition(ClipState::Preparing);
        Ok(())
    }

    /// Start playing at clip-local time `local_time`.
    ///
    /// Prepares first when activation arrives before preparation (subject to
    /// the clip's activation policy), then plays and seeks. Outside
    /// authoritative playback, or with frame-accurate seeking, the resource
    /// is paused again so it parks on the exact frame.
    pub fn activate(&mut self, local_time: f64) -> SyncResult<SeekOutcome> {
        let resource = self.shared_resource()?;
        if !self.may_drive_in_current_mode() {
            return Err(SyncError::PreviewDisabled);
        }

        let rid = resource.borrow().id();
        let fresh_claim = !self.context.registry().is_owner(rid, self.id);
        if !self.context.registry().try_claim(rid, self.id) {
            return Err(self.conflict(rid));
        }

        if self.runtime.state != ClipState::Preparing {
            let may_prepare = match self.config.activation_policy {
                ActivationPolicy::Permissive => true,
                ActivationPolicy::ClipStartOnly => local_time <= 0.0,
            };
            let skipped = if may_prepare {
                self.prepare().err()
            } else if !self.resource_holds_own_media(&*resource.borrow()) {
                Some(SyncError::NotPrepared { local_time })
            } else {
                None
            };
            if let Some(err) = skipped {
                if fresh_claim {
                    self.context.registry().release(rid, self.id);
                }
                return Err(err);
            }
        }

        let settings = self.context.settings();
        let clock = self.context.clock();
        let policy = SeekPolicy::for_clip(self.config.frame_accurate_seek);
        let target = self.config.start_offset + local_time;

        let mut res = resource.borrow_mut();
        res.play();
        let outcome = seek::seek(&mut *res, policy, target, clock, settings);
        if let SeekOutcome::TimedOut { waited } = outcome {
            warn!(clip = %self.name, target, ?waited, "seek watchdog expired on activation");
        }
        if !self.context.is_authoritative_playback() || self.config.frame_accurate_seek {
            res.pause();
        }
        drop(res);

        self.runtime.last_drift_check = None;
        self.transition(ClipState::Active);
        Ok(outcome)
    }

    /// The clip's interval ended.
    pub fn pause(&mut self) -> SyncResult<()> {
        let resource = self.shared_resource()?;
        let rid = resource.borrow().id();
        if !self.context.registry().is_owner(rid, self.id) {
            return Err(self.conflict(rid));
        }
        if self.config.pause_on_completion {
            resource.borrow_mut().pause();
        }
        self.transition(ClipState::Paused);
        Ok(())
    }

    /// Per-frame work while the clip is playing.
    ///
    /// Refreshes the inferred media length, re-seeks for frame-accurate or
    /// scrubbing clips, and corrects drift at most once per check interval.
    /// Returns the correction issued this frame, if any.
    pub fn tick(&mut self, local_time: f64) -> SyncResult<Option<DriftCorrection>> {
        let resource = self.shared_resource()?;
        let rid = resource.borrow().id();
        if !self.context.registry().is_owner(rid, self.id) {
            return Err(self.conflict(rid));
        }

        let context = Rc::clone(&self.context);
        let settings = context.settings();
        let clock = context.clock();
        let authoritative = context.is_authoritative_playback();
        let target = self.config.start_offset + local_time;

        let mut res = resource.borrow_mut();
        self.refresh_inferred_length(&*res);

        if self.config.frame_accurate_seek {
            let outcome = seek::seek(&mut *res, SeekPolicy::FrameAccurate, target, clock, settings);
            if outcome.timed_out() {
                warn!(clip = %self.name, target, "frame-accurate seek timed out");
            }
        } else if !authoritative && self.config.allow_preview_scrub {
            seek::scrub(&mut *res, target);
        }

        if !self.config.enforce_drift || !authoritative {
            return Ok(None);
        }

        let now = clock.now();
        if let Some(last) = self.runtime.last_drift_check {
            if now.saturating_sub(last) < settings.drift_check_interval() {
                return Ok(None);
            }
        }
        self.runtime.last_drift_check = Some(now);

        let length = self.effective_length();
        let expected = drift::expected_position(self.config.start_offset, local_time, length)
            .ok_or(SyncError::UnknownClipLength)?;
        let offset =
            drift::measure_offset(res.current_time(), expected, length, settings.loop_unwrap_ratio);
        if !drift::exceeds_tolerance(offset, self.config.drift_tolerance) {
            return Ok(None);
        }

        info!(
            clip = %self.name,
            offset,
            expected,
            weight = self.runtime.blend_weight,
            "correcting drift"
        );
        res.seek_precise(expected);
        let outcome = if self.config.wait_for_seek_completion {
            let outcome = seek::wait_for_seek(&mut *res, clock, settings);
            if outcome.timed_out() {
                warn!(clip = %self.name, expected, "drift correction seek timed out");
            }
            Some(outcome)
        } else {
            None
        };

        Ok(Some(DriftCorrection {
            expected,
            offset,
            outcome,
        }))
    }

    /// Stop this clip's media if it is the one playing.
    ///
    /// Called when another claimant evicts this one. The clip's restoration
    /// data is returned so the next owner can put the resource back the way
    /// it was before either of them touched it.
    pub fn stop_media(&mut self) -> Restoration {
        let Some(resource) = self.resource.clone() else {
            return Restoration::default();
        };
        let mut res = resource.borrow_mut();
        let rid = res.id();
        if self.context.registry().is_owner(rid, self.id)
            && self.resource_holds_own_media(&*res)
            && res.is_playing()
        {
            debug!(clip = %self.name, "stopping media");
            res.stop();
        }
        drop(res);

        if self.runtime.state.is_engaged() {
            self.transition(ClipState::Stopped);
        }
        self.runtime.take_restoration()
    }

    /// Take over restoration data from an evicted owner.
    pub fn inherit_restoration(&mut self, restoration: Restoration) {
        self.runtime.inherit(restoration);
    }

    /// Release the resource and put it back the way this clip found it.
    pub fn stop(&mut self) -> SyncResult<()> {
        let resource = self.shared_resource()?;
        let mut res = resource.borrow_mut();
        let rid = res.id();
        let registry = self.context.registry();
        let was_owner = registry.is_owner(rid, self.id);
        registry.release(rid, self.id);

        if was_owner {
            if res.is_playing() && self.resource_holds_own_media(&*res) {
                res.stop();
            }
            if let Some(looping) = self.runtime.saved_loop.take() {
                res.set_loop(looping);
            }
            if let Some(original) = self.runtime.saved_media.take() {
                debug!(clip = %self.name, media = %original, "reopening original media");
                res.open_media(&original, false);
            }
        } else {
            self.runtime.clear_saved();
        }
        drop(res);

        self.runtime.active_source = None;
        self.transition(ClipState::Stopped);
        Ok(())
    }

    /// Stop and return to `Idle`; the clip is leaving the timeline.
    pub fn destroy(&mut self) -> SyncResult<()> {
        let result = self.stop();
        self.runtime.last_drift_check = None;
        if result.is_ok() {
            self.transition(ClipState::Idle);
        }
        result
    }

    fn shared_resource(&self) -> SyncResult<SharedResource> {
        self.resource.clone().ok_or(SyncError::MissingResource {
            reason: "clip has no playback resource",
        })
    }

    fn may_drive_in_current_mode(&self) -> bool {
        self.context.is_authoritative_playback() || self.config.allow_preview_scrub
    }

    fn resource_holds_own_media(&self, res: &dyn PlaybackResource) -> bool {
        let own = self
            .runtime
            .active_source
            .as_ref()
            .or_else(|| self.config.media());
        match own {
            Some(own) => res.media_reference().as_ref() == Some(own),
            None => false,
        }
    }

    fn refresh_inferred_length(&mut self, res: &dyn PlaybackResource) {
        if self.config.authored_length > 0.0
            || self.runtime.state == ClipState::Preparing
            || !self.resource_holds_own_media(res)
        {
            return;
        }
        let observed = seekable_extent(&res.seekable_ranges());
        if self.runtime.observe_length(observed) {
            debug!(clip = %self.name, length = observed, "inferred clip length");
        }
    }

    fn conflict(&self, rid: ResourceId) -> SyncError {
        SyncError::OwnershipConflict {
            resource: rid,
            claimant: self.id,
            owner: self.context.registry().owner(rid),
        }
    }

    fn transition(&mut self, to: ClipState) {
        if self.runtime.state != to {
            debug!(clip = %self.name, from = %self.runtime.state, %to, "state change");
            self.runtime.state = to;
        }
    }
}

impl std::fmt::Debug for ClipController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipController")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.runtime.state)
            .finish_non_exhaustive()
    }
}
