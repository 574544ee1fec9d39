//! Minimal host sequencer.
//!
//! Moves a global cursor over one track and calls the lifecycle hooks the
//! way a timeline engine would: clips whose interval the cursor leaves are
//! paused, the track aggregates weights and pre-rolls, clips under the
//! cursor are activated and then ticked with their blend weight.

use std::collections::HashSet;

use crate::clip::ClipState;
use crate::lifecycle::{report, ActiveClip, TrackLifecycle};
use crate::registry::ClaimantId;
use crate::track::coordinator::TrackCoordinator;

#[derive(Debug)]
pub struct Sequencer {
    track: TrackCoordinator,
    cursor: Option<f64>,
    inside: HashSet<ClaimantId>,
}

impl Sequencer {
    pub fn new(track: TrackCoordinator) -> Self {
        Self {
            track,
            cursor: None,
            inside: HashSet::new(),
        }
    }

    pub fn track(&self) -> &TrackCoordinator {
        &self.track
    }

    pub fn track_mut(&mut self) -> &mut TrackCoordinator {
        &mut self.track
    }

    /// Global time of the last [`advance`](Self::advance).
    pub fn cursor(&self) -> Option<f64> {
        self.cursor
    }

    /// Move the cursor to `global_time` and run one update.
    ///
    /// Returns the clips blended into this frame.
    pub fn advance(&mut self, global_time: f64) -> Vec<ActiveClip> {
        let under_cursor: Vec<(ClaimantId, f64, f32)> = self
            .track
            .clips()
            .iter()
            .filter(|clip| clip.placement.contains(global_time))
            .map(|clip| {
                (
                    clip.controller.id(),
                    clip.placement.local_time(global_time),
                    clip.placement.weight_at(global_time),
                )
            })
            .collect();
        let now_inside: HashSet<ClaimantId> = under_cursor.iter().map(|(id, _, _)| *id).collect();

        let mut exited: Vec<ClaimantId> = self.inside.difference(&now_inside).copied().collect();
        exited.sort();
        for id in exited {
            let result = self.track.pause(id);
            report("pause", &self.name_of(id), result);
        }

        let active: Vec<ActiveClip> = under_cursor
            .iter()
            .map(|(id, _, weight)| ActiveClip::new(*id, *weight))
            .collect();
        self.track.on_track_tick(global_time, &active);

        for (id, local_time, weight) in &under_cursor {
            if self.state_of(*id) != Some(ClipState::Active) {
                let result = self.track.activate(*id, *local_time);
                report("activate", &self.name_of(*id), result);
            }
            if self.state_of(*id) == Some(ClipState::Active) {
                let result = self.track.tick(*id, *local_time, *weight);
                report("tick", &self.name_of(*id), result);
            }
        }

        self.inside = now_inside;
        self.cursor = Some(global_time);
        active
    }

    /// Tear down every clip, leaving the resource as it was found.
    pub fn finish(&mut self) {
        self.track.destroy_all();
        self.inside.clear();
    }

    fn state_of(&self, id: ClaimantId) -> Option<ClipState> {
        self.track.clip(id).map(|clip| clip.state())
    }

    fn name_of(&self, id: ClaimantId) -> String {
        self.track
            .clip(id)
            .map(|clip| clip.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }
}
