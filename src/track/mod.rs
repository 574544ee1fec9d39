//! Track-level coordination: clip placement, the per-track coordinator and
//! a minimal sequencer that drives it.

pub mod coordinator;
pub mod sequencer;
pub mod timeline;

pub use coordinator::{TrackClip, TrackCoordinator};
pub use sequencer::Sequencer;
pub use timeline::TimelineClip;
