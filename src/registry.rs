//! Ownership table for shared playback resources.
//!
//! Each resource has at most one claimant at a time. Claims are idempotent
//! for the current owner, releases by anyone else are ignored, and entries
//! are never removed once created: a released resource maps to "free".

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::resource::ResourceId;

/// Identity of a clip controller competing for resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimantId(u64);

impl ClaimantId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClaimantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Maps each playback resource to its current claimant.
///
/// All calls come from the host's single update thread, so interior
/// mutability is plain `RefCell`/`Cell`.
#[derive(Debug, Default)]
pub struct PlaybackResourceRegistry {
    owners: RefCell<HashMap<ResourceId, Option<ClaimantId>>>,
    next_claimant: Cell<u64>,
}

impl PlaybackResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh claimant identity.
    pub fn register_claimant(&self) -> ClaimantId {
        let next = self.next_claimant.get() + 1;
        self.next_claimant.set(next);
        ClaimantId(next)
    }

    /// Current owner of `resource`, if any.
    pub fn owner(&self, resource: ResourceId) -> Option<ClaimantId> {
        self.owners.borrow().get(&resource).copied().flatten()
    }

    /// True when `resource` is unclaimed or already owned by `claimant`.
    pub fn is_free_for(&self, resource: ResourceId, claimant: ClaimantId) -> bool {
        match self.owner(resource) {
            None => true,
            Some(owner) => owner == claimant,
        }
    }

    /// Claim `resource` for `claimant`.
    ///
    /// Succeeds when the resource is free or already owned by `claimant`.
    pub fn try_claim(&self, resource: ResourceId, claimant: ClaimantId) -> bool {
        let mut owners = self.owners.borrow_mut();
        let slot = owners.entry(resource).or_insert(None);
        match *slot {
            Some(owner) if owner != claimant => false,
            Some(_) => true,
            None => {
                debug!(%resource, %claimant, "claimed");
                *slot = Some(claimant);
                true
            }
        }
    }

    pub fn is_owner(&self, resource: ResourceId, claimant: ClaimantId) -> bool {
        self.owner(resource) == Some(claimant)
    }

    /// Free `resource` if `claimant` owns it. No-op otherwise.
    pub fn release(&self, resource: ResourceId, claimant: ClaimantId) {
        let mut owners = self.owners.borrow_mut();
        if let Some(slot) = owners.get_mut(&resource) {
            if *slot == Some(claimant) {
                debug!(%resource, %claimant, "released");
                *slot = None;
            }
        }
    }

    /// Evict whoever else owns `resource` so `claimant` can take it.
    ///
    /// `stop_owner` is called with the evicted owner while it still holds the
    /// resource, so it can stop its media before the slot is freed. Returns
    /// the evicted owner, or `None` when the resource was free or already
    /// owned by `claimant`.
    pub fn force_stop<F>(
        &self,
        resource: ResourceId,
        claimant: ClaimantId,
        stop_owner: F,
    ) -> Option<ClaimantId>
    where
        F: FnOnce(ClaimantId),
    {
        let evicted = self.owner(resource).filter(|owner| *owner != claimant)?;
        stop_owner(evicted);
        if let Some(slot) = self.owners.borrow_mut().get_mut(&resource) {
            if *slot == Some(evicted) {
                *slot = None;
            }
        }
        debug!(%resource, %claimant, %evicted, "force-stopped previous owner");
        Some(evicted)
    }

    /// Number of resources that have ever been claimed.
    pub fn tracked_resources(&self) -> usize {
        self.owners.borrow().len()
    }
}
