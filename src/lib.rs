//! Clipsync - ownership arbitration and clock sync for timeline-driven
//! media players.
//!
//! Timeline clips share playback resources. Each clip gets a
//! [`ClipController`] that claims its resource through the
//! [`PlaybackResourceRegistry`], prepares and starts the media, keeps it in
//! step with the timeline clock, and puts the resource back the way it was
//! found when the clip lets go. A [`TrackCoordinator`] groups the clips of
//! one track to blend their audio and pre-roll upcoming clips.
//!
//! Everything runs on the host's single update thread; resources are shared
//! as `Rc<RefCell<dyn PlaybackResource>>`.

pub mod clip;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod resource;
pub mod timeline_file;
pub mod track;

pub use clip::{ActivationPolicy, ClipConfiguration, ClipController, ClipState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, SyncSettings};
pub use context::{PlaybackMode, SyncContext};
pub use error::{SyncError, SyncResult};
pub use lifecycle::{ActiveClip, ClipLifecycle, TrackLifecycle};
pub use registry::{ClaimantId, PlaybackResourceRegistry};
pub use resource::{MediaReference, PlaybackResource, ResourceId, SharedResource};
pub use timeline_file::TimelineFile;
pub use track::{Sequencer, TimelineClip, TrackCoordinator};
