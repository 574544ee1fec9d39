//! Errors reported by the synchronization engine.
//!
//! None of these are fatal. A lifecycle operation that returns one of them
//! has skipped its action for this frame and left the resource untouched
//! (or, for `SeekTimeout`, wherever the transport managed to land).

use std::time::Duration;

use crate::registry::ClaimantId;
use crate::resource::ResourceId;

/// Reasons a clip operation was skipped or degraded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error("{claimant} cannot drive {resource}: owned by {}", owner_label(.owner))]
    OwnershipConflict {
        resource: ResourceId,
        claimant: ClaimantId,
        owner: Option<ClaimantId>,
    },

    #[error("Seek to {target:.3}s did not complete within {}ms", .waited.as_millis())]
    SeekTimeout { target: f64, waited: Duration },

    #[error("Missing playback resource: {reason}")]
    MissingResource { reason: &'static str },

    #[error("Clip length not known yet, drift correction deferred")]
    UnknownClipLength,

    #[error("Clip does not scrub outside authoritative playback")]
    PreviewDisabled,

    #[error("Clip was not prepared and cannot start mid-interval (local time {local_time:.3}s)")]
    NotPrepared { local_time: f64 },

    #[error("Invalid clip configuration: {field} {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
}

fn owner_label(owner: &Option<ClaimantId>) -> String {
    match owner {
        Some(id) => id.to_string(),
        None => "nobody".to_string(),
    }
}

impl SyncError {
    /// Whether this is an ordinary skip that happens during normal
    /// sequencing (as opposed to something worth a warning).
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            Self::OwnershipConflict { .. }
                | Self::UnknownClipLength
                | Self::PreviewDisabled
                | Self::NotPrepared { .. }
        )
    }
}

/// Result alias for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;
